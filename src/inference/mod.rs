//! Inference module
//!
//! Scores hand-entered records with a trained model:
//! - Numbers or category labels per field
//! - Labels encoded with the model's own codebook
//! - Class, class-1 probability and risk band

mod predictor;

pub use predictor::{predict, Prediction, PredictionRecord, RecordValue, RiskLevel};
