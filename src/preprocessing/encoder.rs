//! Categorical encoding
//!
//! Non-numeric columns are label-encoded: each distinct value gets an
//! integer code by its position in the sorted list of values seen during
//! preprocessing. The resulting [`CategoryCodebook`] travels with the trained
//! model so prediction encodes labels exactly the way training did.

use crate::error::{RiskError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Learned category-to-code mapping, per column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCodebook {
    // column name -> sorted categories; a category's code is its index
    columns: BTreeMap<String, Vec<String>>,
}

impl CategoryCodebook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorted distinct non-missing values of a column
    pub fn fit_categories(values: &[Option<String>]) -> Vec<String> {
        let mut categories: Vec<String> = values.iter().flatten().cloned().collect();
        categories.sort();
        categories.dedup();
        categories
    }

    /// Register the categories of a column, replacing any earlier entry
    pub fn insert(&mut self, column: impl Into<String>, categories: Vec<String>) {
        self.columns.insert(column.into(), categories);
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn is_categorical(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.columns.get(column).map(Vec::as_slice)
    }

    /// Names of the encoded columns
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Code of one label in a categorical column
    pub fn encode(&self, column: &str, label: &str) -> Result<f64> {
        let categories = self.columns.get(column).ok_or_else(|| {
            RiskError::InvalidInput(format!("column '{}' is not categorical", column))
        })?;

        categories
            .binary_search_by(|c| c.as_str().cmp(label))
            .map(|code| code as f64)
            .map_err(|_| {
                RiskError::InvalidInput(format!(
                    "unknown category '{}' for column '{}' (known: {})",
                    label,
                    column,
                    categories.join(", ")
                ))
            })
    }

    /// Encode a whole column; missing cells stay missing
    pub fn encode_column(&self, column: &str, values: &[Option<String>]) -> Result<Vec<Option<f64>>> {
        values
            .iter()
            .map(|v| match v {
                Some(label) => self.encode(column, label).map(Some),
                None => Ok(None),
            })
            .collect()
    }

    /// Whether a numeric value is a valid code for a categorical column
    pub fn is_valid_code(&self, column: &str, code: f64) -> bool {
        match self.columns.get(column) {
            Some(categories) => {
                code.fract() == 0.0 && code >= 0.0 && (code as usize) < categories.len()
            }
            None => false,
        }
    }

    /// Label behind a code, if any
    pub fn decode(&self, column: &str, code: f64) -> Option<&str> {
        if !self.is_valid_code(column, code) {
            return None;
        }
        self.columns
            .get(column)
            .and_then(|c| c.get(code as usize))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smoking() -> Vec<Option<String>> {
        ["Never", "Current", "Past", "Never"]
            .iter()
            .map(|s| Some(s.to_string()))
            .chain(std::iter::once(None))
            .collect()
    }

    #[test]
    fn test_codes_follow_sorted_order() {
        let cats = CategoryCodebook::fit_categories(&smoking());
        assert_eq!(cats, vec!["Current", "Never", "Past"]);

        let mut book = CategoryCodebook::new();
        book.insert("smoking_status", cats);
        assert_eq!(book.encode("smoking_status", "Current").unwrap(), 0.0);
        assert_eq!(book.encode("smoking_status", "Past").unwrap(), 2.0);
    }

    #[test]
    fn test_encode_column_keeps_missing() {
        let mut book = CategoryCodebook::new();
        book.insert("smoking_status", CategoryCodebook::fit_categories(&smoking()));
        let encoded = book.encode_column("smoking_status", &smoking()).unwrap();
        assert_eq!(encoded, vec![Some(1.0), Some(0.0), Some(2.0), Some(1.0), None]);
    }

    #[test]
    fn test_unknown_label_rejected() {
        let mut book = CategoryCodebook::new();
        book.insert("smoking_status", vec!["Never".to_string()]);
        let err = book.encode("smoking_status", "Sometimes").unwrap_err();
        assert!(matches!(err, RiskError::InvalidInput(_)));
    }

    #[test]
    fn test_decode_and_valid_codes() {
        let mut book = CategoryCodebook::new();
        book.insert("activity", vec!["High".to_string(), "Low".to_string()]);
        assert_eq!(book.decode("activity", 1.0), Some("Low"));
        assert!(!book.is_valid_code("activity", 2.0));
        assert!(!book.is_valid_code("activity", 0.5));
        assert!(!book.is_valid_code("age", 0.0));
    }
}
