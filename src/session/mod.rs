//! Session store
//!
//! One [`Session`] holds everything a user produced in a single sitting: the
//! uploaded table, its cleaned form, the trained model and its evaluation.
//! Stages run in order and each one checks its prerequisite before doing any
//! work. Results are computed in full before they are stored, so a failing
//! stage leaves the session exactly as it was.
//!
//! Replacing an upstream artifact discards everything derived from it: a new
//! upload drops the cleaned table and the model, a new cleaning pass drops
//! the model.

use crate::dataset::{DatasetOverview, RawDataset};
use crate::error::{RiskError, Result};
use crate::inference::{self, Prediction, PredictionRecord};
use crate::preprocessing::{self, CleanDataset, PreprocessSummary};
use crate::schema::FeatureSchema;
use crate::training::{self, EvaluationMetrics, TrainedModel, TrainingConfig};
use crate::utils::DataLoader;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};
use uuid::Uuid;

/// Progress of a session through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    Empty,
    RawLoaded,
    Cleaned,
    Trained,
}

impl Stage {
    /// What reaching this stage means
    pub fn description(&self) -> &'static str {
        match self {
            Stage::Empty => "Session start",
            Stage::RawLoaded => "Dataset upload",
            Stage::Cleaned => "Preprocessing",
            Stage::Trained => "Model training",
        }
    }

    /// Page that produces this stage
    pub fn page(&self) -> &'static str {
        match self {
            Stage::Empty => "Home",
            Stage::RawLoaded => "Upload Dataset",
            Stage::Cleaned => "Preprocessing Data",
            Stage::Trained => "Analysis / Training",
        }
    }
}

/// Per-user pipeline state
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    schema: FeatureSchema,
    loader: DataLoader,
    raw: Option<RawDataset>,
    clean: Option<CleanDataset>,
    summary: Option<PreprocessSummary>,
    model: Option<TrainedModel>,
    metrics: Option<EvaluationMetrics>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create an empty session with the heart-attack schema
    pub fn new() -> Self {
        Self::with_schema(FeatureSchema::default())
    }

    pub fn with_schema(schema: FeatureSchema) -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            schema,
            loader: DataLoader::new(),
            raw: None,
            clean: None,
            summary: None,
            model: None,
            metrics: None,
        };
        info!(session = %session.id, "Session created");
        session
    }

    /// Builder method to set how uploads are parsed
    pub fn with_loader(mut self, loader: DataLoader) -> Self {
        self.loader = loader;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Furthest stage reached
    pub fn stage(&self) -> Stage {
        if self.model.is_some() {
            Stage::Trained
        } else if self.clean.is_some() {
            Stage::Cleaned
        } else if self.raw.is_some() {
            Stage::RawLoaded
        } else {
            Stage::Empty
        }
    }

    pub fn raw(&self) -> Option<&RawDataset> {
        self.raw.as_ref()
    }

    pub fn clean(&self) -> Option<&CleanDataset> {
        self.clean.as_ref()
    }

    pub fn summary(&self) -> Option<&PreprocessSummary> {
        self.summary.as_ref()
    }

    pub fn model(&self) -> Option<&TrainedModel> {
        self.model.as_ref()
    }

    pub fn metrics(&self) -> Option<&EvaluationMetrics> {
        self.metrics.as_ref()
    }

    /// Uploaded table, or the step that is missing
    pub fn require_raw(&self) -> Result<&RawDataset> {
        self.raw.as_ref().ok_or(RiskError::PrerequisiteError {
            required: Stage::RawLoaded,
        })
    }

    /// Cleaned table, or the step that is missing
    pub fn require_clean(&self) -> Result<&CleanDataset> {
        self.clean.as_ref().ok_or(RiskError::PrerequisiteError {
            required: Stage::Cleaned,
        })
    }

    pub fn require_model(&self) -> Result<&TrainedModel> {
        self.model.as_ref().ok_or(RiskError::NotFittedError)
    }

    /// Store a parsed upload, discarding everything derived from an earlier one
    pub fn set_raw(&mut self, raw: RawDataset) -> &RawDataset {
        if self.clean.is_some() || self.model.is_some() {
            warn!(session = %self.id, "New upload discards cleaned data and model");
        }
        info!(session = %self.id, rows = raw.height(), cols = raw.width(), "Dataset uploaded");

        self.clean = None;
        self.summary = None;
        self.model = None;
        self.metrics = None;
        self.raw.insert(raw)
    }

    /// Parse uploaded bytes and store the table
    pub fn upload_bytes(&mut self, bytes: Vec<u8>) -> Result<&RawDataset> {
        let raw = self.loader.load_bytes(bytes)?;
        Ok(self.set_raw(raw))
    }

    /// Load a file from disk and store the table
    pub fn upload_path(&mut self, path: impl AsRef<Path>) -> Result<&RawDataset> {
        let raw = self.loader.load_path(path)?;
        Ok(self.set_raw(raw))
    }

    /// Overview of the uploaded table
    pub fn overview(&self) -> Result<DatasetOverview> {
        self.require_raw()?.overview()
    }

    /// Clean the uploaded table against the session schema
    pub fn preprocess(&mut self) -> Result<&PreprocessSummary> {
        let raw = self.require_raw()?;
        let (clean, summary) = preprocessing::preprocess(raw, &self.schema.required_columns())?;

        if self.model.is_some() {
            warn!(session = %self.id, "Re-running preprocessing discards the trained model");
        }
        self.model = None;
        self.metrics = None;
        self.clean = Some(clean);
        Ok(&*self.summary.insert(summary))
    }

    /// Train on the cleaned table and keep the model with its evaluation
    pub fn train(&mut self, config: &TrainingConfig) -> Result<&EvaluationMetrics> {
        let clean = self.require_clean()?;
        let (model, metrics) =
            training::train(clean, &self.schema.features, &self.schema.target, config)?;

        info!(
            session = %self.id,
            accuracy = metrics.accuracy,
            n_estimators = config.n_estimators,
            "Model stored in session"
        );
        self.model = Some(model);
        Ok(&*self.metrics.insert(metrics))
    }

    /// Score one record with the session's model
    pub fn predict(&self, record: &PredictionRecord) -> Result<Prediction> {
        let model = self.require_model()?;
        inference::predict(model, record, &self.schema.features)
    }

    /// Drop everything and start over
    pub fn reset(&mut self) {
        info!(session = %self.id, "Session reset");
        self.raw = None;
        self.clean = None;
        self.summary = None;
        self.model = None;
        self.metrics = None;
    }
}
