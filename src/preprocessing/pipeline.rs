//! Cleaning pipeline: schema check, projection, dedup, drop-missing, encoding

use crate::dataset::{first_occurrence_mask, ColumnValues, RawDataset};
use crate::error::{RiskError, Result};
use super::{CategoryCodebook, FeatureStats};
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, error, info, warn};

// Encoded values plus the categories, for text columns
type EncodedColumn = (Vec<Option<f64>>, Option<Vec<String>>);

/// Missing cells of one column before cleaning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingCount {
    pub column: String,
    pub count: usize,
}

/// What the cleaning pass did
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessSummary {
    pub rows_before: usize,
    pub rows_after: usize,
    pub cols: usize,
    pub duplicates_removed: usize,
    /// Per required column, in schema order
    pub missing_values_before: Vec<MissingCount>,
    pub missing_total_after: usize,
    /// Columns that were label-encoded
    pub encoded_columns: Vec<String>,
    pub elapsed_secs: f64,
}

impl PreprocessSummary {
    pub fn rows_removed(&self) -> usize {
        self.rows_before - self.rows_after
    }

    pub fn missing_total_before(&self) -> usize {
        self.missing_values_before.iter().map(|m| m.count).sum()
    }
}

/// All-numeric table restricted to the schema columns.
///
/// No duplicate rows, no missing cells. Non-numeric source columns hold the
/// codes recorded in the attached [`CategoryCodebook`].
#[derive(Debug, Clone)]
pub struct CleanDataset {
    columns: Vec<String>,
    data: Array2<f64>,
    codebook: CategoryCodebook,
}

impl CleanDataset {
    pub fn new(columns: Vec<String>, data: Array2<f64>, codebook: CategoryCodebook) -> Result<Self> {
        if columns.len() != data.ncols() {
            return Err(RiskError::ShapeError {
                expected: format!("{} columns", columns.len()),
                actual: format!("{} columns", data.ncols()),
            });
        }
        Ok(Self { columns, data, codebook })
    }

    pub fn n_rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.data.ncols()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn codebook(&self) -> &CategoryCodebook {
        &self.codebook
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, name: &str) -> Result<ArrayView1<'_, f64>> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| RiskError::missing_columns([name]))?;
        Ok(self.data.column(idx))
    }

    /// Feature matrix and target vector, columns in the requested order
    pub fn features_and_target(
        &self,
        features: &[String],
        target: &str,
    ) -> Result<(Array2<f64>, Array1<f64>)> {
        let missing: Vec<&str> = features
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(target))
            .filter(|name| self.column_index(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(RiskError::missing_columns(missing));
        }

        let indices: Vec<usize> = features
            .iter()
            .filter_map(|f| self.column_index(f))
            .collect();
        let x = self.data.select(Axis(1), &indices);
        let y = self.column(target)?.to_owned();
        Ok((x, y))
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> ArrayView2<'_, f64> {
        let n = n.min(self.n_rows());
        self.data.slice(s![..n, ..])
    }

    /// Descriptive statistics of every column
    pub fn describe(&self) -> Vec<FeatureStats> {
        self.columns
            .iter()
            .zip(self.data.axis_iter(Axis(1)))
            .map(|(name, values)| FeatureStats::from_values(name, values))
            .collect()
    }

    /// Cleaned table as a Float64 dataframe, for export
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let columns: Vec<Column> = self
            .columns
            .iter()
            .zip(self.data.axis_iter(Axis(1)))
            .map(|(name, values)| Column::new(name.as_str().into(), values.to_vec()))
            .collect();
        Ok(DataFrame::new(columns)?)
    }

    /// Cleaned table viewed as a fresh upload
    pub fn to_raw(&self) -> Result<RawDataset> {
        RawDataset::from_dataframe(self.to_dataframe()?)
    }
}

/// Clean a raw upload against the required columns.
///
/// Fails with a schema error naming every absent column. On success the
/// result holds only `required_columns`, in that order, with duplicates and
/// incomplete rows dropped and text columns encoded. Running it again on its
/// own output changes nothing.
pub fn preprocess(
    raw: &RawDataset,
    required_columns: &[String],
) -> Result<(CleanDataset, PreprocessSummary)> {
    let start = Instant::now();

    if required_columns.is_empty() {
        return Err(RiskError::ValidationError(
            "no columns requested for preprocessing".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = required_columns.iter().find(|c| !seen.insert(c.as_str())) {
        return Err(RiskError::ValidationError(format!(
            "column '{}' requested twice",
            dup
        )));
    }

    let missing: Vec<&String> = required_columns
        .iter()
        .filter(|c| !raw.has_column(c))
        .collect();
    if !missing.is_empty() {
        warn!(missing = ?missing, "Uploaded dataset does not match the schema");
        return Err(RiskError::missing_columns(missing.into_iter().cloned()));
    }

    let columns: Vec<ColumnValues> = required_columns
        .iter()
        .map(|c| raw.column_values(c))
        .collect::<Result<_>>()?;

    let rows_before = raw.height();
    let missing_values_before: Vec<MissingCount> = required_columns
        .iter()
        .zip(&columns)
        .map(|(name, values)| MissingCount {
            column: name.clone(),
            count: values.null_count(),
        })
        .collect();

    // Dedup first, then drop incomplete rows
    let unique = first_occurrence_mask(&columns);
    let duplicates_removed = unique.iter().filter(|first| !**first).count();
    let keep: Vec<bool> = (0..rows_before)
        .map(|row| unique[row] && columns.iter().all(|c| !c.is_missing(row)))
        .collect();
    let rows_after = keep.iter().filter(|k| **k).count();
    debug!(rows_before, rows_after, duplicates_removed, "Filtered rows");

    // Encode each column independently
    let encoded: Vec<EncodedColumn> = required_columns
        .par_iter()
        .zip(columns.par_iter())
        .map(|(name, values)| -> Result<EncodedColumn> {
            match values.filter(&keep) {
                ColumnValues::Numeric(v) => Ok((v, None)),
                ColumnValues::Text(v) => {
                    let categories = CategoryCodebook::fit_categories(&v);
                    let mut single = CategoryCodebook::new();
                    single.insert(name.as_str(), categories.clone());
                    Ok((single.encode_column(name, &v)?, Some(categories)))
                }
            }
        })
        .collect::<Result<_>>()?;

    let mut codebook = CategoryCodebook::new();
    let mut encoded_columns = Vec::new();
    let mut data = Array2::<f64>::from_elem((rows_after, required_columns.len()), f64::NAN);
    let mut missing_total_after = 0usize;

    for (j, (name, (values, categories))) in required_columns.iter().zip(encoded).enumerate() {
        if let Some(categories) = categories {
            codebook.insert(name.as_str(), categories);
            encoded_columns.push(name.clone());
        }
        for (i, value) in values.into_iter().enumerate() {
            match value {
                Some(v) => data[[i, j]] = v,
                None => missing_total_after += 1,
            }
        }
    }

    if missing_total_after != 0 {
        error!(missing_total_after, "Missing values survived cleaning");
        return Err(RiskError::ValidationError(format!(
            "{} missing values remain after cleaning",
            missing_total_after
        )));
    }

    let summary = PreprocessSummary {
        rows_before,
        rows_after,
        cols: required_columns.len(),
        duplicates_removed,
        missing_values_before,
        missing_total_after,
        encoded_columns,
        elapsed_secs: start.elapsed().as_secs_f64(),
    };

    info!(
        rows_before,
        rows_after,
        duplicates_removed,
        encoded = summary.encoded_columns.len(),
        elapsed = ?start.elapsed(),
        "Preprocessing complete"
    );

    let clean = CleanDataset::new(required_columns.to_vec(), data, codebook)?;
    Ok((clean, summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| c.to_string()).collect()
    }

    fn raw() -> RawDataset {
        let df = df!(
            "age" => &[Some(40.0), Some(40.0), Some(61.0), None, Some(52.0)],
            "smoking_status" => &[Some("Never"), Some("Never"), Some("Current"), Some("Past"), Some("Past")],
            "extra" => &[1i64, 2, 3, 4, 5],
            "heart_attack" => &[0i64, 0, 1, 1, 0]
        )
        .unwrap();
        RawDataset::from_dataframe(df).unwrap()
    }

    #[test]
    fn test_preprocess_projects_dedups_and_encodes() {
        let required = names(&["age", "smoking_status", "heart_attack"]);
        let (clean, summary) = preprocess(&raw(), &required).unwrap();

        assert_eq!(clean.columns(), required.as_slice());
        assert_eq!(summary.rows_before, 5);
        assert_eq!(summary.duplicates_removed, 1);
        assert_eq!(summary.rows_after, 3);
        assert_eq!(summary.missing_total_after, 0);
        assert_eq!(summary.missing_values_before[0].count, 1);
        assert_eq!(summary.encoded_columns, vec!["smoking_status".to_string()]);

        // Current=0, Never=1, Past=2
        let smoking = clean.column("smoking_status").unwrap();
        assert_eq!(smoking.to_vec(), vec![1.0, 0.0, 2.0]);
    }

    #[test]
    fn test_missing_columns_listed_in_order() {
        let required = names(&["cholesterol", "age", "diabetes"]);
        let err = preprocess(&raw(), &required).unwrap_err();
        match err {
            RiskError::SchemaError { missing, .. } => {
                assert_eq!(missing, names(&["cholesterol", "diabetes"]))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_repeated_required_column_rejected() {
        let required = names(&["age", "age"]);
        let err = preprocess(&raw(), &required).unwrap_err();
        assert!(matches!(err, RiskError::ValidationError(_)));
    }

    #[test]
    fn test_describe_and_head() {
        let required = names(&["age", "heart_attack"]);
        let (clean, _) = preprocess(&raw(), &required).unwrap();
        let stats = clean.describe();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].count, clean.n_rows());
        assert_eq!(clean.head(2).nrows(), 2);
        assert_eq!(clean.head(100).nrows(), clean.n_rows());
    }

    #[test]
    fn test_features_and_target() {
        let required = names(&["age", "smoking_status", "heart_attack"]);
        let (clean, _) = preprocess(&raw(), &required).unwrap();
        let (x, y) = clean
            .features_and_target(&names(&["smoking_status", "age"]), "heart_attack")
            .unwrap();
        assert_eq!(x.ncols(), 2);
        assert_eq!(x[[0, 1]], 40.0);
        assert_eq!(y.len(), clean.n_rows());

        let err = clean
            .features_and_target(&names(&["bmi"]), "heart_attack")
            .unwrap_err();
        assert!(matches!(err, RiskError::SchemaError { .. }));
    }
}
