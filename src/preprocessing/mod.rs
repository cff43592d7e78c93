//! Data preprocessing module
//!
//! Turns an uploaded table into a model-ready one:
//! - Projection onto the schema's columns
//! - Duplicate-row removal
//! - Dropping incomplete rows
//! - Label encoding of non-numeric columns
//! - Descriptive statistics of the result

mod encoder;
mod pipeline;

pub use encoder::CategoryCodebook;
pub use pipeline::{preprocess, CleanDataset, MissingCount, PreprocessSummary};

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Descriptive statistics of one cleaned column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureStats {
    pub name: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl FeatureStats {
    /// Create empty statistics
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            count: 0,
            mean: None,
            std: None,
            min: None,
            q25: None,
            median: None,
            q75: None,
            max: None,
        }
    }

    /// Compute statistics from a numeric column
    pub fn from_values(name: &str, values: ArrayView1<'_, f64>) -> Self {
        let mut stats = Self::new(name);
        stats.count = values.len();
        if values.is_empty() {
            return stats;
        }

        let n = values.len() as f64;
        let mean = values.sum() / n;
        stats.mean = Some(mean);

        // Sample standard deviation (ddof = 1)
        if values.len() > 1 {
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            stats.std = Some(var.sqrt());
        }

        let mut sorted: Vec<f64> = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        stats.min = sorted.first().copied();
        stats.max = sorted.last().copied();
        stats.q25 = Some(quantile(&sorted, 0.25));
        stats.median = Some(quantile(&sorted, 0.5));
        stats.q75 = Some(quantile(&sorted, 0.75));
        stats
    }
}

/// Linear-interpolated quantile of sorted, non-empty data
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_feature_stats_new() {
        let stats = FeatureStats::new("age");
        assert_eq!(stats.name, "age");
        assert_eq!(stats.count, 0);
        assert!(stats.mean.is_none());
    }

    #[test]
    fn test_feature_stats_from_values() {
        let values = array![1.0, 2.0, 3.0, 4.0];
        let stats = FeatureStats::from_values("x", values.view());
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, Some(2.5));
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.max, Some(4.0));
        assert_eq!(stats.median, Some(2.5));
        assert_eq!(stats.q25, Some(1.75));
        assert_eq!(stats.q75, Some(3.25));
        let std = stats.std.unwrap();
        assert!((std - 1.2909944).abs() < 1e-6, "std = {}", std);
    }

    #[test]
    fn test_single_value_has_no_std() {
        let values = array![7.0];
        let stats = FeatureStats::from_values("x", values.view());
        assert!(stats.std.is_none());
        assert_eq!(stats.median, Some(7.0));
    }
}
