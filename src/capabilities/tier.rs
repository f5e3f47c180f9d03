//! Host capability tiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// The API generation of the host, ordered oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Pre-RGB hosts: packet-level titles and action bars, no sound categories.
    Legacy,
    /// Hosts exposing native title, action bar, boss bar and categorised sound APIs.
    Modern,
}

impl Tier {
    pub const ALL: [Tier; 2] = [Tier::Legacy, Tier::Modern];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Legacy => "legacy",
            Tier::Modern => "modern",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(Tier::Legacy),
            "modern" => Ok(Tier::Modern),
            other => Err(ConfigError::Invalid(format!("unknown tier `{other}`"))),
        }
    }
}
