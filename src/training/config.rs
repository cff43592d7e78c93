//! Training configuration

use crate::error::{RiskError, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Accepted number of trees
pub const N_ESTIMATORS_RANGE: RangeInclusive<usize> = 50..=500;

/// Accepted held-out share
pub const TEST_FRACTION_RANGE: RangeInclusive<f64> = 0.1..=0.4;

/// How samples are weighted during tree fitting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassWeight {
    /// Every sample counts once
    Uniform,
    /// `n_samples / (n_classes * count_c)` per class
    Balanced,
}

/// Configuration for model training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of trees
    pub n_estimators: usize,

    /// Share of rows held out for evaluation
    pub test_fraction: f64,

    /// Seed for the split and for every tree
    pub random_state: u64,

    /// Maximum depth of trees (None = grow until pure)
    pub max_depth: Option<usize>,

    /// Minimum samples required to split a node
    pub min_samples_split: usize,

    /// Minimum samples per leaf
    pub min_samples_leaf: usize,

    pub class_weight: ClassWeight,

    /// Number of parallel jobs (None = rayon's global pool)
    pub n_jobs: Option<usize>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            test_fraction: 0.2,
            random_state: 42,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            class_weight: ClassWeight::Balanced,
            n_jobs: None,
        }
    }
}

impl TrainingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set number of estimators
    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    /// Builder method to set the held-out share
    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction;
        self
    }

    /// Builder method to set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Builder method to set max depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_class_weight(mut self, class_weight: ClassWeight) -> Self {
        self.class_weight = class_weight;
        self
    }

    pub fn with_n_jobs(mut self, n_jobs: usize) -> Self {
        self.n_jobs = Some(n_jobs);
        self
    }

    /// Check every hyperparameter against its accepted range
    pub fn validate(&self) -> Result<()> {
        if !N_ESTIMATORS_RANGE.contains(&self.n_estimators) {
            return Err(invalid(
                "n_estimators",
                self.n_estimators,
                format!(
                    "must be between {} and {}",
                    N_ESTIMATORS_RANGE.start(),
                    N_ESTIMATORS_RANGE.end()
                ),
            ));
        }
        if !TEST_FRACTION_RANGE.contains(&self.test_fraction) {
            return Err(invalid(
                "test_fraction",
                self.test_fraction,
                format!(
                    "must be between {} and {}",
                    TEST_FRACTION_RANGE.start(),
                    TEST_FRACTION_RANGE.end()
                ),
            ));
        }
        if self.max_depth == Some(0) {
            return Err(invalid("max_depth", 0, "must be at least 1"));
        }
        if self.min_samples_split < 2 {
            return Err(invalid(
                "min_samples_split",
                self.min_samples_split,
                "must be at least 2",
            ));
        }
        if self.min_samples_leaf < 1 {
            return Err(invalid("min_samples_leaf", 0, "must be at least 1"));
        }
        if self.n_jobs == Some(0) {
            return Err(invalid("n_jobs", 0, "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(name: &str, value: impl ToString, reason: impl Into<String>) -> RiskError {
    RiskError::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrainingConfig::default();
        assert_eq!(config.n_estimators, 200);
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.random_state, 42);
        assert_eq!(config.class_weight, ClassWeight::Balanced);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        assert!(TrainingConfig::new().with_n_estimators(50).validate().is_ok());
        assert!(TrainingConfig::new().with_n_estimators(500).validate().is_ok());
        assert!(TrainingConfig::new().with_test_fraction(0.1).validate().is_ok());
        assert!(TrainingConfig::new().with_test_fraction(0.4).validate().is_ok());
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = TrainingConfig::new().with_n_estimators(10).validate().unwrap_err();
        match err {
            RiskError::InvalidParameter { name, value, .. } => {
                assert_eq!(name, "n_estimators");
                assert_eq!(value, "10");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let err = TrainingConfig::new().with_test_fraction(0.5).validate().unwrap_err();
        assert!(matches!(err, RiskError::InvalidParameter { .. }));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TrainingConfig = serde_json::from_str(r#"{"n_estimators": 100}"#).unwrap();
        assert_eq!(config.n_estimators, 100);
        assert_eq!(config.test_fraction, 0.2);
    }
}
