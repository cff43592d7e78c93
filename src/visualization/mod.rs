//! Visualization module: the numbers behind the dataset charts.
//!
//! Nothing here renders; each function returns plain data a front end can
//! plot.

use crate::error::{RiskError, Result};
use crate::preprocessing::CleanDataset;
use crate::training::{FeatureImportance, TrainedModel};
use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// Bins of the age histogram
pub const AGE_BINS: usize = 20;

/// Equal-width histogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// `counts.len() + 1` bin edges, ascending
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Bin values into `bins` equal-width buckets spanning their range.
///
/// Every bucket is half-open except the last, which also takes the maximum.
/// A constant column spans `value ± 0.5`.
pub fn histogram(values: ArrayView1<'_, f64>, bins: usize) -> Result<Histogram> {
    if bins == 0 {
        return Err(RiskError::InvalidParameter {
            name: "bins".to_string(),
            value: "0".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let (mut lo, mut hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if values.is_empty() {
        lo = 0.0;
        hi = 1.0;
    } else if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
    let mut counts = vec![0usize; bins];
    for &v in values.iter() {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Ok(Histogram { edges, counts })
}

/// Age histogram with [`AGE_BINS`] bins
pub fn age_histogram(clean: &CleanDataset) -> Result<Histogram> {
    histogram(clean.column("age")?, AGE_BINS)
}

/// Row counts per target class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetDistribution {
    pub negative: usize,
    pub positive: usize,
    /// Positive cases per 100 negative ones (0 when there are no negatives)
    pub ratio_percent: f64,
}

pub fn target_distribution(clean: &CleanDataset, target: &str) -> Result<TargetDistribution> {
    let y = clean.column(target)?;
    let positive = y.iter().filter(|&&v| v == 1.0).count();
    let negative = y.iter().filter(|&&v| v == 0.0).count();
    let ratio_percent = if negative > 0 {
        positive as f64 / negative as f64 * 100.0
    } else {
        0.0
    };

    Ok(TargetDistribution {
        negative,
        positive,
        ratio_percent,
    })
}

/// Pairwise Pearson correlations of the cleaned columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Array2<f64>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[[i, j]])
    }

    /// Columns ranked by absolute correlation with `target`, strongest first
    pub fn strongest_with(&self, target: &str, n: usize) -> Result<Vec<(String, f64)>> {
        let t = self
            .columns
            .iter()
            .position(|c| c == target)
            .ok_or_else(|| RiskError::missing_columns([target]))?;

        let mut ranked: Vec<(String, f64)> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != t)
            .map(|(i, name)| (name.clone(), self.values[[i, t]].abs()))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(n);
        Ok(ranked)
    }
}

/// Pearson correlation of every column pair; a constant column correlates 0
pub fn correlation_matrix(clean: &CleanDataset) -> CorrelationMatrix {
    let data = clean.data();
    let n_cols = data.ncols();
    let n = data.nrows() as f64;

    let means: Vec<f64> = data
        .axis_iter(Axis(1))
        .map(|c| if n > 0.0 { c.sum() / n } else { 0.0 })
        .collect();
    let centered: Vec<Vec<f64>> = data
        .axis_iter(Axis(1))
        .zip(&means)
        .map(|(c, m)| c.iter().map(|v| v - m).collect())
        .collect();
    let norms: Vec<f64> = centered
        .iter()
        .map(|c| c.iter().map(|v| v * v).sum::<f64>().sqrt())
        .collect();

    let mut values = Array2::<f64>::zeros((n_cols, n_cols));
    for i in 0..n_cols {
        for j in i..n_cols {
            let r = if norms[i] > 0.0 && norms[j] > 0.0 {
                let dot: f64 = centered[i].iter().zip(&centered[j]).map(|(a, b)| a * b).sum();
                (dot / (norms[i] * norms[j])).clamp(-1.0, 1.0)
            } else {
                0.0
            };
            values[[i, j]] = r;
            values[[j, i]] = r;
        }
    }

    CorrelationMatrix {
        columns: clean.columns().to_vec(),
        values,
    }
}

/// The `n` most important features of a trained model
pub fn importance_ranking(model: &TrainedModel, n: usize) -> Vec<FeatureImportance> {
    model.top_features(n)
}
