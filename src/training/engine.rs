//! Training engine: split, fit, evaluate

use crate::error::{RiskError, Result};
use crate::preprocessing::{CategoryCodebook, CleanDataset};
use super::config::TrainingConfig;
use super::metrics::EvaluationMetrics;
use super::random_forest::{MaxFeatures, RandomForest};
use super::split::stratified_split;
use chrono::{DateTime, Utc};
use ndarray::{ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Importance of one feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Fitted forest plus everything needed to score a record the way the
/// training rows were scored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    forest: RandomForest,
    feature_names: Vec<String>,
    target: String,
    codebook: CategoryCodebook,
    config: TrainingConfig,
    trained_at: DateTime<Utc>,
}

impl TrainedModel {
    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    /// Feature names in the order the forest expects them
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn codebook(&self) -> &CategoryCodebook {
        &self.codebook
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    pub fn is_fitted(&self) -> bool {
        self.forest.is_fitted()
    }

    /// Probability of class 1 for one encoded row
    pub fn positive_probability(&self, row: ArrayView1<'_, f64>) -> Result<f64> {
        if !self.is_fitted() {
            return Err(RiskError::NotFittedError);
        }
        let proba = self.forest.predict_proba_row(row)?;
        Ok(proba[1])
    }

    /// Features ranked by importance, most important first
    pub fn feature_importances(&self) -> Vec<FeatureImportance> {
        let Some(importances) = self.forest.feature_importances() else {
            return Vec::new();
        };

        let mut ranked: Vec<FeatureImportance> = self
            .feature_names
            .iter()
            .zip(importances.iter())
            .map(|(feature, &importance)| FeatureImportance {
                feature: feature.clone(),
                importance,
            })
            .collect();
        ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        ranked
    }

    /// The `n` most important features
    pub fn top_features(&self, n: usize) -> Vec<FeatureImportance> {
        let mut ranked = self.feature_importances();
        ranked.truncate(n);
        ranked
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Train and evaluate a forest on a cleaned dataset.
///
/// Rows are split per class with a fixed seed, the forest is fitted on the
/// training partition and scored on the held-out one. Nothing outside the
/// returned values is touched, so a failure leaves the caller's state as it
/// was.
pub fn train(
    clean: &CleanDataset,
    features: &[String],
    target: &str,
    config: &TrainingConfig,
) -> Result<(TrainedModel, EvaluationMetrics)> {
    let start = Instant::now();
    config.validate()?;

    let (x, y) = clean.features_and_target(features, target)?;

    if let Some(bad) = y.iter().find(|&&v| v != 0.0 && v != 1.0) {
        warn!(column = target, value = *bad, "Target is not binary");
        return Err(RiskError::TrainingError(format!(
            "target '{}' must only hold 0 and 1, found {}",
            target, bad
        )));
    }

    let labels: Vec<usize> = y.iter().map(|&v| v as usize).collect();
    let split = stratified_split(&labels, config.test_fraction, config.random_state)?;
    debug!(
        n_train = split.train_indices.len(),
        n_test = split.test_indices.len(),
        "Stratified split"
    );

    let x_train = x.select(Axis(0), &split.train_indices);
    let y_train = y.select(Axis(0), &split.train_indices);
    let x_test = x.select(Axis(0), &split.test_indices);
    let y_test = y.select(Axis(0), &split.test_indices);

    let mut forest = RandomForest::new(config.n_estimators)
        .with_max_depth(config.max_depth)
        .with_min_samples_split(config.min_samples_split)
        .with_min_samples_leaf(config.min_samples_leaf)
        .with_max_features(MaxFeatures::Sqrt)
        .with_class_weight(config.class_weight)
        .with_random_state(config.random_state)
        .with_n_jobs(config.n_jobs);
    forest.fit(&x_train, &y_train)?;

    let y_pred = forest.predict(&x_test)?;
    let mut metrics = EvaluationMetrics::compute(&y_test, &y_pred, split.train_indices.len(), config)?;
    metrics.training_time_secs = start.elapsed().as_secs_f64();

    info!(
        n_estimators = config.n_estimators,
        n_train = metrics.n_train,
        n_test = metrics.n_test,
        accuracy = metrics.accuracy,
        elapsed = ?start.elapsed(),
        "Training complete"
    );

    let model = TrainedModel {
        forest,
        feature_names: features.to_vec(),
        target: target.to_string(),
        codebook: clean.codebook().clone(),
        config: config.clone(),
        trained_at: Utc::now(),
    };

    Ok((model, metrics))
}
