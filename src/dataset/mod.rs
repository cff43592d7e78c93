//! Raw dataset wrapper and column extraction
//!
//! A [`RawDataset`] is the table exactly as uploaded. It is never mutated:
//! a new upload produces a new value that supersedes the old one.

use crate::error::{RiskError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Values of one column pulled out of the dataframe.
///
/// Missing cells (nulls, and NaN in float columns) are `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnValues::Numeric(_))
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            ColumnValues::Numeric(v) => v[row].is_none(),
            ColumnValues::Text(v) => v[row].is_none(),
        }
    }

    pub fn null_count(&self) -> usize {
        (0..self.len()).filter(|&i| self.is_missing(i)).count()
    }

    /// Keep only the rows where `mask` is true
    pub fn filter(&self, mask: &[bool]) -> ColumnValues {
        match self {
            ColumnValues::Numeric(v) => ColumnValues::Numeric(
                v.iter().zip(mask).filter(|(_, keep)| **keep).map(|(x, _)| *x).collect(),
            ),
            ColumnValues::Text(v) => ColumnValues::Text(
                v.iter().zip(mask).filter(|(_, keep)| **keep).map(|(x, _)| x.clone()).collect(),
            ),
        }
    }

    fn key(&self, row: usize) -> CellKey<'_> {
        match self {
            ColumnValues::Numeric(v) => match v[row] {
                // -0.0 and 0.0 are the same value
                Some(x) if x == 0.0 => CellKey::Number(0.0f64.to_bits()),
                Some(x) => CellKey::Number(x.to_bits()),
                None => CellKey::Missing,
            },
            ColumnValues::Text(v) => match &v[row] {
                Some(s) => CellKey::Text(s.as_str()),
                None => CellKey::Missing,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CellKey<'a> {
    Missing,
    Number(u64),
    Text(&'a str),
}

/// Mask that is true for the first occurrence of each distinct row.
///
/// Rows compare equal when every column matches; two missing cells are equal.
pub fn first_occurrence_mask(columns: &[ColumnValues]) -> Vec<bool> {
    let n_rows = columns.first().map(ColumnValues::len).unwrap_or(0);
    let mut seen: HashSet<Vec<CellKey<'_>>> = HashSet::with_capacity(n_rows);

    (0..n_rows)
        .map(|row| {
            let key: Vec<CellKey<'_>> = columns.iter().map(|c| c.key(row)).collect();
            seen.insert(key)
        })
        .collect()
}

/// Number of rows that repeat an earlier row exactly
pub fn count_duplicate_rows(columns: &[ColumnValues]) -> usize {
    first_occurrence_mask(columns).iter().filter(|&&first| !first).count()
}

/// Pull one polars column out as plain values
pub fn extract_column(column: &Column) -> Result<ColumnValues> {
    let series = column.as_materialized_series();

    match series.dtype() {
        DataType::Boolean
        | DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64
        | DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64
        | DataType::Float32 | DataType::Float64 => {
            let casted = series.cast(&DataType::Float64)?;
            let values = casted
                .f64()?
                .into_iter()
                .map(|v| v.filter(|x| !x.is_nan()))
                .collect();
            Ok(ColumnValues::Numeric(values))
        }
        DataType::String => Ok(ColumnValues::Text(string_values(series)?)),
        _ => {
            let casted = series.cast(&DataType::String)?;
            Ok(ColumnValues::Text(string_values(&casted)?))
        }
    }
}

fn string_values(series: &Series) -> Result<Vec<Option<String>>> {
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Per-column information shown after upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
    pub non_null: usize,
    pub null: usize,
}

/// Shape and quality of a raw upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetOverview {
    pub rows: usize,
    pub columns: usize,
    pub estimated_size_bytes: usize,
    pub missing_total: usize,
    pub duplicate_rows: usize,
    pub column_info: Vec<ColumnInfo>,
}

/// Table as uploaded: arbitrary columns, types and missing values
#[derive(Debug, Clone)]
pub struct RawDataset {
    df: DataFrame,
}

impl RawDataset {
    /// Wrap a dataframe; a table without columns is not a valid upload
    pub fn from_dataframe(df: DataFrame) -> Result<Self> {
        if df.width() == 0 {
            return Err(RiskError::InputParseError("table has no columns".to_string()));
        }
        Ok(Self { df })
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn width(&self) -> usize {
        self.df.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.df.column(name).is_ok()
    }

    /// Values of one column; a missing column is a schema violation
    pub fn column_values(&self, name: &str) -> Result<ColumnValues> {
        let column = self
            .df
            .column(name)
            .map_err(|_| RiskError::missing_columns([name]))?;
        extract_column(column)
    }

    /// Row/column counts, missing and duplicate totals, per-column dtypes
    pub fn overview(&self) -> Result<DatasetOverview> {
        let columns: Vec<ColumnValues> = self
            .df
            .get_columns()
            .iter()
            .map(extract_column)
            .collect::<Result<_>>()?;

        let column_info: Vec<ColumnInfo> = self
            .df
            .get_columns()
            .iter()
            .zip(&columns)
            .map(|(col, values)| {
                let null = values.null_count();
                ColumnInfo {
                    name: col.name().to_string(),
                    dtype: col.dtype().to_string(),
                    non_null: values.len() - null,
                    null,
                }
            })
            .collect();

        Ok(DatasetOverview {
            rows: self.height(),
            columns: self.width(),
            estimated_size_bytes: self.df.estimated_size(),
            missing_total: column_info.iter().map(|c| c.null).sum(),
            duplicate_rows: count_duplicate_rows(&columns),
            column_info,
        })
    }
}
