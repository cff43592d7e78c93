//! Model training module
//!
//! Provides the heart-risk classifier and its evaluation:
//! - Decision trees with weighted Gini impurity
//! - Class-balanced Random Forest with probability averaging
//! - Seeded stratified train/test split
//! - Accuracy, confusion matrix and classification report

mod config;
mod engine;
pub mod decision_tree;
pub mod metrics;
pub mod random_forest;
pub mod split;

pub use config::{ClassWeight, TrainingConfig, N_ESTIMATORS_RANGE, TEST_FRACTION_RANGE};
pub use engine::{train, FeatureImportance, TrainedModel};
pub use decision_tree::{DecisionTree, TreeNode};
pub use metrics::{AverageReport, ClassReport, ConfusionMatrix, EvaluationMetrics};
pub use random_forest::{MaxFeatures, RandomForest};
pub use split::{stratified_split, TrainTestSplit};
