//! Heartrisk - heart-attack risk explorer
//!
//! This crate takes a tabular heart-health dataset through a fixed pipeline:
//! - Upload and inspect a CSV table
//! - Clean it: project, deduplicate, drop missing rows, encode categories
//! - Train and evaluate a balanced random forest
//! - Score a single hand-entered record with a risk band
//!
//! # Modules
//!
//! ## Data
//! - [`schema`] - The fixed feature/target schema
//! - [`dataset`] - Raw uploaded tables and their overview
//! - [`preprocessing`] - Cleaning and category encoding
//!
//! ## Model
//! - [`training`] - Random forest, stratified split, evaluation
//! - [`inference`] - Single-record prediction and risk bands
//!
//! ## Application
//! - [`session`] - Per-user pipeline state
//! - [`visualization`] - Chart data for the dataset and model
//! - [`config`] - JSON configuration
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Data
pub mod schema;
pub mod dataset;
pub mod preprocessing;
pub mod utils;

// Model
pub mod training;
pub mod inference;

// Application
pub mod session;
pub mod visualization;
pub mod config;
pub mod cli;

pub use error::{RiskError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{RiskError, Result};

    // Data
    pub use crate::schema::{FeatureSchema, FEATURE_COLUMNS, TARGET_COLUMN};
    pub use crate::dataset::{DatasetOverview, RawDataset};
    pub use crate::utils::{DataLoader, LoaderConfig};

    // Preprocessing
    pub use crate::preprocessing::{preprocess, CategoryCodebook, CleanDataset, PreprocessSummary};

    // Training
    pub use crate::training::{train, EvaluationMetrics, TrainedModel, TrainingConfig};

    // Inference
    pub use crate::inference::{predict, Prediction, PredictionRecord, RecordValue, RiskLevel};

    // Session
    pub use crate::session::{Session, Stage};
    pub use crate::config::AppConfig;
}
