//! Engine configuration (beanshape.toml)

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::reflect::ExposurePolicy;

/// Engine configuration
///
/// ```toml
/// exposure = "annotated-only"
/// share-primitive-arrays = false
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct EngineConfig {
    /// Policy used when a request names none
    #[serde(default)]
    pub exposure: ExposurePolicy,

    /// Hand out native arrays of plain scalars by reference
    #[serde(default = "default_share_primitive_arrays")]
    pub share_primitive_arrays: bool,
}

fn default_share_primitive_arrays() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            exposure: ExposurePolicy::default(),
            share_primitive_arrays: default_share_primitive_arrays(),
        }
    }
}

impl EngineConfig {
    /// Parse from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.exposure, ExposurePolicy::AnnotatedPlusReadOnly);
        assert!(config.share_primitive_arrays);
    }

    #[test]
    fn test_parse() {
        let config = EngineConfig::from_toml_str(
            r#"
exposure = "annotated-only"
share-primitive-arrays = false
"#,
        )
        .unwrap();
        assert_eq!(config.exposure, ExposurePolicy::AnnotatedOnly);
        assert!(!config.share_primitive_arrays);
    }

    #[test]
    fn test_rejects_unknown() {
        assert!(matches!(
            EngineConfig::from_toml_str("exposure = \"everything\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(EngineConfig::from_toml_str("colour = 1").is_err());
    }

    #[test]
    fn test_round_trip() {
        let config = EngineConfig {
            exposure: ExposurePolicy::AllPublic,
            share_primitive_arrays: false,
        };
        let text = toml::to_string(&config).unwrap();
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
    }
}
