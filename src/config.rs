//! Application configuration
//!
//! Everything tunable lives in one JSON document; missing sections fall back
//! to their defaults.
//!
//! ```json
//! {
//!   "loader": { "delimiter": 59 },
//!   "training": { "n_estimators": 300, "test_fraction": 0.25 }
//! }
//! ```

use crate::error::Result;
use crate::schema::FeatureSchema;
use crate::training::TrainingConfig;
use crate::utils::LoaderConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub schema: FeatureSchema,
    pub loader: LoaderConfig,
    pub training: TrainingConfig,
}

impl AppConfig {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.schema.validate()?;
        self.training.validate()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RiskError;

    #[test]
    fn test_empty_document_is_default() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config.schema, FeatureSchema::default());
        assert_eq!(config.training, TrainingConfig::default());
        assert_eq!(config.loader.delimiter, b',');
    }

    #[test]
    fn test_sections_override_defaults() {
        let json = r#"{"loader": {"delimiter": 59}, "training": {"n_estimators": 300}}"#;
        let config = AppConfig::from_json(json).unwrap();
        assert_eq!(config.loader.delimiter, b';');
        assert!(config.loader.has_header);
        assert_eq!(config.training.n_estimators, 300);
        assert_eq!(config.training.test_fraction, 0.2);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = AppConfig::from_json(r#"{"training": {"test_fraction": 0.9}}"#).unwrap_err();
        assert!(matches!(err, RiskError::InvalidParameter { .. }));

        let err = AppConfig::from_json("not json").unwrap_err();
        assert!(matches!(err, RiskError::SerializationError(_)));
    }

    #[test]
    fn test_roundtrip() {
        let config = AppConfig::default();
        let parsed = AppConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed.training, config.training);
    }
}
