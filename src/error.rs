//! Error types for the heart-risk pipeline

use thiserror::Error;

use crate::session::Stage;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, RiskError>;

/// Main error type for the pipeline.
///
/// Every variant is terminal for the operation that produced it. Nothing is
/// retried, and session state committed before the failure stays intact.
#[derive(Error, Debug)]
pub enum RiskError {
    #[error("{}", schema_message(.missing, .unexpected))]
    SchemaError {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("{} has not been completed yet; run '{}' first", .required.description(), .required.page())]
    PrerequisiteError { required: Stage },

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Model not fitted: train a model before predicting")]
    NotFittedError,

    #[error("Could not read the uploaded table: {0}")]
    InputParseError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl RiskError {
    /// Schema error for a list of missing names
    pub fn missing_columns<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RiskError::SchemaError {
            missing: names.into_iter().map(Into::into).collect(),
            unexpected: Vec::new(),
        }
    }

    /// Whether the error stems from the user's data or input rather than a defect
    pub fn is_user_error(&self) -> bool {
        !matches!(
            self,
            RiskError::ValidationError(_)
                | RiskError::ShapeError { .. }
                | RiskError::IoError(_)
                | RiskError::DataError(_)
        )
    }
}

/// Table reads map their errors to `InputParseError` explicitly; anything
/// else polars raises (casts, exports) lands here.
impl From<polars::error::PolarsError> for RiskError {
    fn from(err: polars::error::PolarsError) -> Self {
        RiskError::DataError(err.to_string())
    }
}

fn schema_message(missing: &[String], unexpected: &[String]) -> String {
    match (missing.is_empty(), unexpected.is_empty()) {
        (false, true) => format!("Required columns not found in dataset: {:?}", missing),
        (true, false) => format!("Unexpected columns: {:?}", unexpected),
        _ => format!(
            "Required columns not found in dataset: {:?}; unexpected columns: {:?}",
            missing, unexpected
        ),
    }
}

impl From<serde_json::Error> for RiskError {
    fn from(err: serde_json::Error) -> Self {
        RiskError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for RiskError {
    fn from(err: ndarray::ShapeError) -> Self {
        RiskError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
