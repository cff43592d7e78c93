//! Random Forest classifier

use crate::error::{RiskError, Result};
use super::config::ClassWeight;
use super::decision_tree::{class_labels, DecisionTree};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Strategy for max features
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MaxFeatures {
    /// Floor of the square root of n_features
    Sqrt,
    /// Fixed number
    Fixed(usize),
    /// All features
    All,
}

/// Random Forest model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    /// Individual trees
    trees: Vec<DecisionTree>,
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum depth per tree
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features examined per split
    pub max_features: MaxFeatures,
    /// Bootstrap sampling
    pub bootstrap: bool,
    pub class_weight: ClassWeight,
    /// Base seed; tree `i` uses `random_state + i`
    pub random_state: u64,
    /// Threads used while fitting (None = global pool)
    pub n_jobs: Option<usize>,
    /// Feature importances
    feature_importances: Option<Array1<f64>>,
    /// Number of features
    n_features: usize,
    /// Number of classes
    n_classes: usize,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RandomForest {
    /// Create a new classifier forest
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            class_weight: ClassWeight::Uniform,
            random_state: 42,
            n_jobs: None,
            feature_importances: None,
            n_features: 0,
            n_classes: 0,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    /// Set max features strategy
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn with_class_weight(mut self, class_weight: ClassWeight) -> Self {
        self.class_weight = class_weight;
        self
    }

    /// Set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn with_n_jobs(mut self, n_jobs: Option<usize>) -> Self {
        self.n_jobs = n_jobs;
        self
    }

    fn compute_max_features(&self, n_features: usize) -> usize {
        match self.max_features {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().floor() as usize,
            MaxFeatures::Fixed(n) => n.min(n_features),
            MaxFeatures::All => n_features,
        }
        .max(1)
    }

    /// Per-class weights over the training labels
    fn class_weights(&self, labels: &[usize], n_classes: usize) -> Vec<f64> {
        match self.class_weight {
            ClassWeight::Uniform => vec![1.0; n_classes],
            ClassWeight::Balanced => {
                let mut counts = vec![0usize; n_classes];
                for &c in labels {
                    counts[c] += 1;
                }
                let n = labels.len() as f64;
                counts
                    .iter()
                    .map(|&c| if c > 0 { n / (n_classes as f64 * c as f64) } else { 0.0 })
                    .collect()
            }
        }
    }

    /// Fit the forest to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(RiskError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(RiskError::TrainingError("no training samples".to_string()));
        }
        if self.n_estimators == 0 {
            return Err(RiskError::InvalidParameter {
                name: "n_estimators".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let labels = class_labels(y)?;
        let n_classes = labels.iter().max().map_or(0, |m| m + 1).max(2);
        let class_weights = self.class_weights(&labels, n_classes);
        let max_features = self.compute_max_features(n_features);

        let fit_trees = || -> Result<Vec<DecisionTree>> {
            (0..self.n_estimators)
                .into_par_iter()
                .map(|tree_idx| -> Result<DecisionTree> {
                    let seed = self.random_state.wrapping_add(tree_idx as u64);
                    let mut rng = ChaCha8Rng::seed_from_u64(seed);

                    // Bootstrap sample
                    let sample_indices: Vec<usize> = if self.bootstrap {
                        (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                    } else {
                        (0..n_samples).collect()
                    };

                    let x_boot = x.select(Axis(0), &sample_indices);
                    let y_boot: Array1<f64> = sample_indices.iter().map(|&i| y[i]).collect();
                    let w_boot: Array1<f64> = sample_indices
                        .iter()
                        .map(|&i| class_weights[labels[i]])
                        .collect();

                    let mut tree = DecisionTree::new()
                        .with_max_depth(self.max_depth)
                        .with_min_samples_split(self.min_samples_split)
                        .with_min_samples_leaf(self.min_samples_leaf)
                        .with_max_features(max_features)
                        .with_n_classes(n_classes);
                    tree.fit_weighted(&x_boot, &y_boot, &w_boot, &mut rng)?;
                    Ok(tree)
                })
                .collect()
        };

        let trees = match self.n_jobs {
            Some(n_jobs) => rayon::ThreadPoolBuilder::new()
                .num_threads(n_jobs)
                .build()
                .map_err(|e| RiskError::TrainingError(e.to_string()))?
                .install(fit_trees)?,
            None => fit_trees()?,
        };

        self.trees = trees;
        self.n_features = n_features;
        self.n_classes = n_classes;
        self.compute_feature_importances();

        debug!(
            n_trees = self.trees.len(),
            n_samples,
            n_features,
            max_features,
            "Fitted random forest"
        );
        Ok(self)
    }

    fn compute_feature_importances(&mut self) {
        if self.trees.is_empty() {
            return;
        }

        let mut total_importances = vec![0.0; self.n_features];

        for tree in &self.trees {
            if let Some(imp) = tree.feature_importances() {
                for (i, &val) in imp.iter().enumerate() {
                    if i < self.n_features {
                        total_importances[i] += val;
                    }
                }
            }
        }

        let n_trees = self.trees.len() as f64;
        for imp in &mut total_importances {
            *imp /= n_trees;
        }

        // Normalize
        let total: f64 = total_importances.iter().sum();
        if total > 0.0 {
            for imp in &mut total_importances {
                *imp /= total;
            }
        }

        self.feature_importances = Some(Array1::from_vec(total_importances));
    }

    /// Mean of the trees' leaf probabilities for one sample
    pub fn predict_proba_row(&self, sample: ArrayView1<'_, f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(RiskError::NotFittedError);
        }

        let mut proba = Array1::<f64>::zeros(self.n_classes);
        for tree in &self.trees {
            for (c, p) in tree.predict_proba_row(sample)?.iter().enumerate() {
                proba[c] += p;
            }
        }
        proba /= self.trees.len() as f64;
        Ok(proba)
    }

    /// Class probabilities, one row per sample
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if self.trees.is_empty() {
            return Err(RiskError::NotFittedError);
        }

        let rows: Vec<Array1<f64>> = x
            .axis_iter(Axis(0))
            .into_par_iter()
            .map(|row| self.predict_proba_row(row))
            .collect::<Result<_>>()?;

        let mut proba = Array2::<f64>::zeros((x.nrows(), self.n_classes));
        for (i, row) in rows.into_iter().enumerate() {
            proba.row_mut(i).assign(&row);
        }
        Ok(proba)
    }

    /// Predicted class per sample: class 1 iff its probability is at least 0.5
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba
            .rows()
            .into_iter()
            .map(|row| if row[1] >= 0.5 { 1.0 } else { 0.0 })
            .collect())
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }
}
