//! Decision tree classifier
//!
//! Gini-impurity CART tree with per-sample weights. Each split looks at a
//! random subset of features; leaves store class probabilities rather than
//! a single label, so a forest can average them.

use crate::error::{RiskError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with weighted class proportions
    Leaf {
        value: Vec<f64>,
        n_samples: usize,
    },
    /// Internal node; samples with `x[feature_idx] <= threshold` go left
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
        impurity: f64,
    },
}

/// Decision tree model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Tree root
    root: Option<TreeNode>,
    /// Maximum depth
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features examined per split (None = all)
    pub max_features: Option<usize>,
    /// Number of features
    n_features: usize,
    /// Number of classes; labels are 0..n_classes
    n_classes: usize,
    /// Feature importances
    feature_importances: Option<Array1<f64>>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

// Borrowed training data plus the state that changes while growing
struct FitContext<'a, R> {
    x: &'a Array2<f64>,
    y: Vec<usize>,
    weights: ArrayView1<'a, f64>,
    rng: &'a mut R,
    importances: Vec<f64>,
}

struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
}

impl DecisionTree {
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            n_features: 0,
            n_classes: 0,
            feature_importances: None,
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

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    /// Reserve room for at least `n` classes, even if the training sample lacks some
    pub fn with_n_classes(mut self, n: usize) -> Self {
        self.n_classes = n;
        self
    }

    /// Fit with unit sample weights
    pub fn fit<R: Rng>(&mut self, x: &Array2<f64>, y: &Array1<f64>, rng: &mut R) -> Result<&mut Self> {
        let weights = Array1::ones(y.len());
        self.fit_weighted(x, y, &weights, rng)
    }

    /// Fit the tree to weighted training data
    pub fn fit_weighted<R: Rng>(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        sample_weight: &Array1<f64>,
        rng: &mut R,
    ) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() || n_samples != sample_weight.len() {
            return Err(RiskError::ShapeError {
                expected: format!("y and weights of length {}", n_samples),
                actual: format!("y = {}, weights = {}", y.len(), sample_weight.len()),
            });
        }
        if n_samples == 0 || n_features == 0 {
            return Err(RiskError::TrainingError(
                "cannot fit a tree on an empty matrix".to_string(),
            ));
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(RiskError::TrainingError(
                "feature matrix contains non-finite values".to_string(),
            ));
        }

        let labels = class_labels(y)?;
        self.n_features = n_features;
        self.n_classes = self
            .n_classes
            .max(labels.iter().max().map_or(0, |m| m + 1));

        let mut ctx = FitContext {
            x,
            y: labels,
            weights: sample_weight.view(),
            rng,
            importances: vec![0.0; n_features],
        };

        let indices: Vec<usize> = (0..n_samples).collect();
        let root = self.build_tree(&mut ctx, &indices, 0);

        // Normalize feature importances
        let mut importances = ctx.importances;
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }

        self.root = Some(root);
        self.feature_importances = Some(Array1::from_vec(importances));
        Ok(self)
    }

    fn build_tree<R: Rng>(&self, ctx: &mut FitContext<'_, R>, indices: &[usize], depth: usize) -> TreeNode {
        let n_samples = indices.len();
        let counts = self.class_weights(ctx, indices);
        let total: f64 = counts.iter().sum();
        let impurity = gini(&counts, total);

        let should_stop = n_samples < self.min_samples_split
            || n_samples < 2 * self.min_samples_leaf
            || self.max_depth.map_or(false, |d| depth >= d)
            || impurity <= f64::EPSILON;

        if should_stop {
            return leaf(counts, total, n_samples);
        }

        let Some(best) = self.find_best_split(ctx, indices, &counts, total, impurity) else {
            return leaf(counts, total, n_samples);
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| ctx.x[[i, best.feature_idx]] <= best.threshold);

        ctx.importances[best.feature_idx] += total * best.gain;

        let left = Box::new(self.build_tree(ctx, &left_indices, depth + 1));
        let right = Box::new(self.build_tree(ctx, &right_indices, depth + 1));

        TreeNode::Split {
            feature_idx: best.feature_idx,
            threshold: best.threshold,
            left,
            right,
            n_samples,
            impurity,
        }
    }

    fn find_best_split<R: Rng>(
        &self,
        ctx: &mut FitContext<'_, R>,
        indices: &[usize],
        parent_counts: &[f64],
        parent_total: f64,
        parent_impurity: f64,
    ) -> Option<SplitCandidate> {
        let n_features = ctx.x.ncols();
        let budget = self.max_features.unwrap_or(n_features).clamp(1, n_features);

        let mut features: Vec<usize> = (0..n_features).collect();
        features.shuffle(&mut *ctx.rng);

        let mut best: Option<SplitCandidate> = None;
        let mut visited = 0usize;

        // Constant features do not count against the budget
        for feature_idx in features {
            if visited >= budget {
                break;
            }

            let mut order = indices.to_vec();
            order.sort_by(|&a, &b| ctx.x[[a, feature_idx]].total_cmp(&ctx.x[[b, feature_idx]]));

            let first = ctx.x[[order[0], feature_idx]];
            let last = ctx.x[[order[order.len() - 1], feature_idx]];
            if first == last {
                continue;
            }
            visited += 1;

            let mut left = vec![0.0; parent_counts.len()];
            let mut left_total = 0.0;

            for pos in 0..order.len() - 1 {
                let i = order[pos];
                left[ctx.y[i]] += ctx.weights[i];
                left_total += ctx.weights[i];

                let value = ctx.x[[i, feature_idx]];
                let next = ctx.x[[order[pos + 1], feature_idx]];
                if next <= value {
                    continue;
                }

                let n_left = pos + 1;
                if n_left < self.min_samples_leaf || order.len() - n_left < self.min_samples_leaf {
                    continue;
                }

                let right: Vec<f64> = parent_counts.iter().zip(&left).map(|(p, l)| p - l).collect();
                let right_total = parent_total - left_total;
                let child_impurity = (left_total * gini(&left, left_total)
                    + right_total * gini(&right, right_total))
                    / parent_total;
                let gain = parent_impurity - child_impurity;

                if best.as_ref().map_or(gain > 0.0, |b| gain > b.gain) {
                    let mut threshold = value + (next - value) / 2.0;
                    if threshold >= next {
                        threshold = value;
                    }
                    best = Some(SplitCandidate { feature_idx, threshold, gain });
                }
            }
        }

        best
    }

    fn class_weights<R>(&self, ctx: &FitContext<'_, R>, indices: &[usize]) -> Vec<f64> {
        let mut counts = vec![0.0; self.n_classes];
        for &i in indices {
            counts[ctx.y[i]] += ctx.weights[i];
        }
        counts
    }

    /// Class probabilities for one sample
    pub fn predict_proba_row(&self, sample: ArrayView1<'_, f64>) -> Result<&[f64]> {
        let mut node = self.root.as_ref().ok_or(RiskError::NotFittedError)?;
        if sample.len() != self.n_features {
            return Err(RiskError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", sample.len()),
            });
        }

        loop {
            match node {
                TreeNode::Leaf { value, .. } => return Ok(value.as_slice()),
                TreeNode::Split { feature_idx, threshold, left, right, .. } => {
                    node = if sample[*feature_idx] <= *threshold { &**left } else { &**right };
                }
            }
        }
    }

    /// Class probabilities, one row per sample
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let mut proba = Array2::zeros((x.nrows(), self.n_classes));
        for (i, row) in x.rows().into_iter().enumerate() {
            for (c, p) in self.predict_proba_row(row)?.iter().enumerate() {
                proba[[i, c]] = *p;
            }
        }
        Ok(proba)
    }

    /// Most probable class per sample
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba
            .rows()
            .into_iter()
            .map(|row| argmax(&row.to_vec()) as f64)
            .collect())
    }

    pub fn is_fitted(&self) -> bool {
        self.root.is_some()
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Get tree depth (a lone leaf has depth 0)
    pub fn get_depth(&self) -> usize {
        match &self.root {
            None => 0,
            Some(node) => node_depth(node),
        }
    }

    /// Get number of leaves
    pub fn get_n_leaves(&self) -> usize {
        match &self.root {
            None => 0,
            Some(node) => count_leaves(node),
        }
    }
}

fn leaf(counts: Vec<f64>, total: f64, n_samples: usize) -> TreeNode {
    let value = if total > 0.0 {
        counts.iter().map(|c| c / total).collect()
    } else {
        counts
    };
    TreeNode::Leaf { value, n_samples }
}

fn gini(counts: &[f64], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - counts.iter().map(|c| (c / total).powi(2)).sum::<f64>()
}

fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
        .0
}

fn node_depth(node: &TreeNode) -> usize {
    match node {
        TreeNode::Leaf { .. } => 0,
        TreeNode::Split { left, right, .. } => 1 + node_depth(left).max(node_depth(right)),
    }
}

fn count_leaves(node: &TreeNode) -> usize {
    match node {
        TreeNode::Leaf { .. } => 1,
        TreeNode::Split { left, right, .. } => count_leaves(left) + count_leaves(right),
    }
}

/// Labels as class indices; they must be non-negative integers
pub(crate) fn class_labels(y: &Array1<f64>) -> Result<Vec<usize>> {
    y.iter()
        .map(|&v| {
            if v.is_finite() && v >= 0.0 && v.fract() == 0.0 {
                Ok(v as usize)
            } else {
                Err(RiskError::TrainingError(format!(
                    "class labels must be non-negative integers, found {}",
                    v
                )))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_classifier_separable() {
        let x = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y, &mut rng()).unwrap();

        let predictions = tree.predict(&x).unwrap();
        assert_eq!(predictions, y);
    }

    #[test]
    fn test_leaf_probabilities_sum_to_one() {
        let x = array![[1.0], [1.0], [1.0], [2.0]];
        let y = array![0.0, 1.0, 1.0, 0.0];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y, &mut rng()).unwrap();

        let proba = tree.predict_proba(&x).unwrap();
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-12);
        }
        // x = 1.0 cannot be separated further: 1/3 class 0, 2/3 class 1
        assert!((proba[[0, 1]] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_sample_weights_shift_probabilities() {
        let x = array![[1.0], [1.0]];
        let y = array![0.0, 1.0];
        let w = array![1.0, 3.0];

        let mut tree = DecisionTree::new();
        tree.fit_weighted(&x, &y, &w, &mut rng()).unwrap();
        let proba = tree.predict_proba(&x).unwrap();
        assert!((proba[[0, 1]] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_max_depth() {
        let x = array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0], [4.0, 4.0]];
        let y = array![0.0, 1.0, 0.0, 1.0];

        let mut tree = DecisionTree::new().with_max_depth(Some(2));
        tree.fit(&x, &y, &mut rng()).unwrap();

        assert!(tree.get_depth() <= 2);
        assert!(tree.get_n_leaves() >= 2);
    }

    #[test]
    fn test_feature_importances() {
        let x = array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [4.0, 0.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut tree = DecisionTree::new().with_max_features(1);
        tree.fit(&x, &y, &mut rng()).unwrap();

        // Second feature is constant and never chosen
        let importances = tree.feature_importances().unwrap();
        assert_eq!(importances[0], 1.0);
        assert_eq!(importances[1], 0.0);
    }

    #[test]
    fn test_reserved_classes() {
        let x = array![[1.0], [2.0]];
        let y = array![0.0, 0.0];

        let mut tree = DecisionTree::new().with_n_classes(2);
        tree.fit(&x, &y, &mut rng()).unwrap();
        let proba = tree.predict_proba(&x).unwrap();
        assert_eq!(proba.ncols(), 2);
        assert_eq!(proba[[0, 1]], 0.0);
    }

    #[test]
    fn test_unfitted_and_bad_labels() {
        let tree = DecisionTree::new();
        assert!(matches!(
            tree.predict(&array![[1.0]]).unwrap_err(),
            RiskError::NotFittedError
        ));

        let mut tree = DecisionTree::new();
        let err = tree.fit(&array![[1.0]], &array![0.5], &mut rng()).unwrap_err();
        assert!(matches!(err, RiskError::TrainingError(_)));
    }
}
