//! One-shot host capability detection.

use once_cell::sync::OnceCell;

use super::tier::Tier;
use crate::config::PlatformConfig;
use crate::host::Host;

/// Feature that only exists from the first modern host release onward.
pub const DEFAULT_MARKER_FEATURE: &str = "material:netherite_pickaxe";

/// Detects the host [`Tier`] on first use and memoizes it.
///
/// The probe is side-effect free apart from the memo cell, so concurrent
/// first callers all observe the same value. An instance describes one host:
/// build a new one for each host rather than sharing it.
#[derive(Debug)]
pub struct CapabilityProbe {
    marker: String,
    forced: Option<Tier>,
    tier: OnceCell<Tier>,
}

impl CapabilityProbe {
    /// Probe for the given marker feature.
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            forced: None,
            tier: OnceCell::new(),
        }
    }

    /// A probe that never queries the host.
    pub fn forced(tier: Tier) -> Self {
        Self {
            marker: DEFAULT_MARKER_FEATURE.to_string(),
            forced: Some(tier),
            tier: OnceCell::new(),
        }
    }

    pub fn from_config(config: &PlatformConfig) -> Self {
        match config.tier {
            Some(tier) => Self::forced(tier),
            None => Self::new(config.marker_feature.clone()),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// The host tier, detected on the first call.
    ///
    /// Only the first call queries `host`. Later calls return the memoized
    /// tier whatever host they pass.
    pub fn tier(&self, host: &dyn Host) -> Tier {
        *self.tier.get_or_init(|| self.detect(host))
    }

    /// The memoized tier, if detection already ran.
    pub fn detected(&self) -> Option<Tier> {
        self.tier.get().copied()
    }

    fn detect(&self, host: &dyn Host) -> Tier {
        if let Some(tier) = self.forced {
            return tier;
        }

        match host.has_feature(&self.marker) {
            Ok(true) => Tier::Modern,
            Ok(false) => Tier::Legacy,
            Err(e) => {
                log::debug!(
                    "Probing `{}` on {} failed, assuming legacy host: {}",
                    self.marker,
                    host.version(),
                    e
                );
                Tier::Legacy
            }
        }
    }
}

impl Default for CapabilityProbe {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_FEATURE)
    }
}
