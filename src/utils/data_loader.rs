//! Data loading utilities

use crate::dataset::RawDataset;
use crate::error::{RiskError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Cell values read as missing, on top of empty cells
pub const DEFAULT_NULL_VALUES: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// How delimited text is parsed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Field separator
    pub delimiter: u8,
    /// First line holds column names
    pub has_header: bool,
    /// Rows scanned to infer column types (None = whole file)
    pub infer_schema_length: Option<usize>,
    /// Markers read as missing in every column
    pub null_values: Vec<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            infer_schema_length: None,
            null_values: DEFAULT_NULL_VALUES.iter().map(|v| v.to_string()).collect(),
        }
    }
}

impl LoaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Builder method to replace the missing-value markers
    pub fn with_null_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.null_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to limit schema inference
    pub fn with_infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_length = rows;
        self
    }
}

/// Reads uploaded tables into [`RawDataset`]s
#[derive(Debug, Clone, Default)]
pub struct DataLoader {
    config: LoaderConfig,
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Parse uploaded bytes as a delimited table
    pub fn load_bytes(&self, bytes: Vec<u8>) -> Result<RawDataset> {
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(RiskError::InputParseError("uploaded file is empty".to_string()));
        }

        let start = Instant::now();
        let n_bytes = bytes.len();
        let df = self.read_csv(Cursor::new(bytes))?;
        debug!(bytes = n_bytes, elapsed = ?start.elapsed(), "Parsed uploaded table");

        RawDataset::from_dataframe(df)
    }

    /// Load a delimited file from disk
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<RawDataset> {
        let path = path.as_ref();
        let start = Instant::now();

        let bytes = std::fs::read(path)?;
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(RiskError::InputParseError(format!(
                "{} is empty",
                path.display()
            )));
        }

        let df = self.read_csv(Cursor::new(bytes))?;
        info!(
            path = %path.display(),
            rows = df.height(),
            cols = df.width(),
            elapsed = ?start.elapsed(),
            "Loaded dataset"
        );

        RawDataset::from_dataframe(df)
    }

    fn read_csv(&self, reader: Cursor<Vec<u8>>) -> Result<DataFrame> {
        let null_values = (!self.config.null_values.is_empty()).then(|| {
            NullValues::AllColumns(
                self.config
                    .null_values
                    .iter()
                    .map(|v| PlSmallStr::from(v.as_str()))
                    .collect(),
            )
        });
        let parse_opts = CsvParseOptions::default()
            .with_separator(self.config.delimiter)
            .with_null_values(null_values);

        CsvReadOptions::default()
            .with_has_header(self.config.has_header)
            .with_infer_schema_length(self.config.infer_schema_length)
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(reader)
            .finish()
            .map_err(|e| RiskError::InputParseError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_bytes() {
        let csv = "age,heart_attack\n40,0\n55,1\n".as_bytes().to_vec();
        let raw = DataLoader::new().load_bytes(csv).unwrap();
        assert_eq!(raw.height(), 2);
        assert_eq!(raw.column_names(), vec!["age", "heart_attack"]);
    }

    #[test]
    fn test_custom_delimiter() {
        let csv = "age;heart_attack\n40;0\n".as_bytes().to_vec();
        let loader = DataLoader::with_config(LoaderConfig::new().with_delimiter(b';'));
        let raw = loader.load_bytes(csv).unwrap();
        assert_eq!(raw.width(), 2);
    }

    #[test]
    fn test_null_markers_keep_column_numeric() {
        let csv = "age,chol,heart_attack\n45,200,0\n61,NA,1\n52,180,0\n70,N/A,1\n38,nan,0\n"
            .as_bytes()
            .to_vec();
        let raw = DataLoader::new().load_bytes(csv).unwrap();
        let chol = raw.column_values("chol").unwrap();
        assert!(chol.is_numeric());
        assert_eq!(chol.null_count(), 3);
    }

    #[test]
    fn test_null_markers_configurable() {
        let csv = "age,heart_attack\n45,0\n?,1\n".as_bytes().to_vec();
        let loader = DataLoader::with_config(LoaderConfig::new().with_null_values(["?"]));
        let age = loader.load_bytes(csv).unwrap().column_values("age").unwrap();
        assert!(age.is_numeric());
        assert_eq!(age.null_count(), 1);
    }

    #[test]
    fn test_empty_upload_is_parse_error() {
        let err = DataLoader::new().load_bytes(Vec::new()).unwrap_err();
        assert!(matches!(err, RiskError::InputParseError(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = DataLoader::new()
            .load_path("/definitely/not/here.csv")
            .unwrap_err();
        assert!(matches!(err, RiskError::IoError(_)));
    }
}
