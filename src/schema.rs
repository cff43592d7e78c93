//! Fixed feature schema of the heart-attack dataset

use crate::error::{RiskError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Name of the binary label column
pub const TARGET_COLUMN: &str = "heart_attack";

/// Feature columns, in the order the model consumes them
pub const FEATURE_COLUMNS: [&str; 15] = [
    "age",
    "hypertension",
    "blood_pressure_systolic",
    "blood_pressure_diastolic",
    "diabetes",
    "cholesterol_level",
    "cholesterol_hdl",
    "cholesterol_ldl",
    "triglycerides",
    "fasting_blood_sugar",
    "obesity",
    "waist_circumference",
    "previous_heart_disease",
    "smoking_status",
    "physical_activity",
];

/// Ordered feature names plus the target name.
///
/// The same schema drives preprocessing, training and prediction. Feature
/// order matters for the model: a record scored against a model must list
/// its features in exactly this order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub features: Vec<String>,
    pub target: String,
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::heart_attack()
    }
}

impl FeatureSchema {
    /// The 15-feature heart-attack schema
    pub fn heart_attack() -> Self {
        Self {
            features: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            target: TARGET_COLUMN.to_string(),
        }
    }

    /// Build a custom schema, rejecting empty or repeated names
    pub fn new<I, S>(features: I, target: impl Into<String>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let schema = Self {
            features: features.into_iter().map(Into::into).collect(),
            target: target.into(),
        };
        schema.validate()?;
        Ok(schema)
    }

    pub fn validate(&self) -> Result<()> {
        if self.features.is_empty() {
            return Err(RiskError::ValidationError(
                "schema needs at least one feature".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for name in self.features.iter().chain(std::iter::once(&self.target)) {
            if name.trim().is_empty() {
                return Err(RiskError::ValidationError("empty column name in schema".to_string()));
            }
            if !seen.insert(name.as_str()) {
                return Err(RiskError::ValidationError(format!(
                    "column '{}' appears more than once in schema",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Features followed by the target: the columns preprocessing keeps
    pub fn required_columns(&self) -> Vec<String> {
        let mut cols = self.features.clone();
        cols.push(self.target.clone());
        cols
    }

    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.features.iter().position(|f| f == name)
    }
}
