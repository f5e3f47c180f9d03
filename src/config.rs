//! Platform configuration.
//!
//! Loaded from YAML; every field is optional.
//!
//! ```yaml
//! marker_feature: "material:netherite_pickaxe"
//! tier: legacy            # skip detection
//! cache_resolutions: true
//! ```
//!
//! The `AUDIENCE_TIER` environment variable overrides `tier`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::capabilities::{Tier, DEFAULT_MARKER_FEATURE};
use crate::errors::ConfigError;

/// Environment variable that forces the host tier.
pub const TIER_ENV_VAR: &str = "AUDIENCE_TIER";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Feature whose presence marks a modern host.
    pub marker_feature: String,
    /// Use this tier instead of probing the host.
    pub tier: Option<Tier>,
    /// Memoize chain resolutions per (kind, tier).
    pub cache_resolutions: bool,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            marker_feature: DEFAULT_MARKER_FEATURE.to_string(),
            tier: None,
            cache_resolutions: true,
        }
    }
}

impl PlatformConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Apply `AUDIENCE_TIER` if it is set.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        let value = std::env::var(TIER_ENV_VAR).ok();
        self.with_tier_override(value.as_deref())
    }

    /// Apply a tier override given as text. Blank values are ignored.
    pub fn with_tier_override(mut self, value: Option<&str>) -> Result<Self, ConfigError> {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            self.tier = Some(value.parse()?);
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.marker_feature.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "marker_feature must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PlatformConfig::from_yaml("{}").unwrap();
        assert_eq!(config, PlatformConfig::default());
        assert_eq!(config.marker_feature, DEFAULT_MARKER_FEATURE);
        assert!(config.cache_resolutions);
    }

    #[test]
    fn test_parse_fields() {
        let config = PlatformConfig::from_yaml(
            "marker_feature: \"material:copper_ingot\"\ntier: legacy\ncache_resolutions: false\n",
        )
        .unwrap();
        assert_eq!(config.marker_feature, "material:copper_ingot");
        assert_eq!(config.tier, Some(Tier::Legacy));
        assert!(!config.cache_resolutions);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            PlatformConfig::from_yaml("tier: ancient"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            PlatformConfig::from_yaml("marker_feature: \"\""),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_tier_override() {
        let config = PlatformConfig::default();
        assert_eq!(
            config.clone().with_tier_override(Some("Modern")).unwrap().tier,
            Some(Tier::Modern)
        );
        assert_eq!(config.clone().with_tier_override(Some("  ")).unwrap().tier, None);
        assert_eq!(config.clone().with_tier_override(None).unwrap().tier, None);
        assert!(config.with_tier_override(Some("1.8")).is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tier: modern").unwrap();

        let config = PlatformConfig::from_file(file.path()).unwrap();
        assert_eq!(config.tier, Some(Tier::Modern));

        let missing = PlatformConfig::from_file(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
