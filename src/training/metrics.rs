//! Evaluation metrics for the binary classifier

use crate::error::{RiskError, Result};
use super::config::TrainingConfig;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Class labels in report order
pub const CLASSES: [usize; 2] = [0, 1];

/// 2x2 confusion matrix: rows are actual classes, columns predicted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub matrix: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    pub fn from_predictions(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(RiskError::ShapeError {
                expected: format!("{} predictions", y_true.len()),
                actual: format!("{} predictions", y_pred.len()),
            });
        }

        let mut matrix = [[0usize; 2]; 2];
        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            matrix[binary_label(t)?][binary_label(p)?] += 1;
        }
        Ok(Self { matrix })
    }

    /// Count of rows with this actual and predicted class
    pub fn get(&self, actual: usize, predicted: usize) -> usize {
        self.matrix[actual][predicted]
    }

    pub fn true_negatives(&self) -> usize {
        self.matrix[0][0]
    }

    pub fn false_positives(&self) -> usize {
        self.matrix[0][1]
    }

    pub fn false_negatives(&self) -> usize {
        self.matrix[1][0]
    }

    pub fn true_positives(&self) -> usize {
        self.matrix[1][1]
    }

    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    /// Rows whose actual class is `class`
    pub fn support(&self, class: usize) -> usize {
        self.matrix[class].iter().sum()
    }

    /// Rows predicted as `class`
    pub fn predicted(&self, class: usize) -> usize {
        self.matrix.iter().map(|row| row[class]).sum()
    }

    pub fn correct(&self) -> usize {
        self.matrix[0][0] + self.matrix[1][1]
    }
}

fn binary_label(v: f64) -> Result<usize> {
    if v == 0.0 {
        Ok(0)
    } else if v == 1.0 {
        Ok(1)
    } else {
        Err(RiskError::TrainingError(format!(
            "expected class 0 or 1, found {}",
            v
        )))
    }
}

/// Precision, recall and F1 of one class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassReport {
    pub class: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Averages across classes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageReport {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Held-out evaluation of a trained model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub accuracy: f64,
    pub confusion_matrix: ConfusionMatrix,
    /// One entry per class, in class order
    pub class_reports: Vec<ClassReport>,
    pub macro_avg: AverageReport,
    /// Averages weighted by support
    pub weighted_avg: AverageReport,
    pub n_train: usize,
    pub n_test: usize,
    /// Hyperparameters the model was trained with
    pub config: TrainingConfig,
    /// Training time in seconds
    pub training_time_secs: f64,
}

impl EvaluationMetrics {
    /// Metrics of predictions on the held-out partition
    pub fn compute(
        y_true: &Array1<f64>,
        y_pred: &Array1<f64>,
        n_train: usize,
        config: &TrainingConfig,
    ) -> Result<Self> {
        let confusion_matrix = ConfusionMatrix::from_predictions(y_true, y_pred)?;
        let n_test = confusion_matrix.total();

        let accuracy = if n_test > 0 {
            confusion_matrix.correct() as f64 / n_test as f64
        } else {
            0.0
        };

        let class_reports: Vec<ClassReport> = CLASSES
            .iter()
            .map(|&class| {
                let tp = confusion_matrix.get(class, class) as f64;
                let precision = safe_div(tp, confusion_matrix.predicted(class) as f64);
                let recall = safe_div(tp, confusion_matrix.support(class) as f64);
                ClassReport {
                    class,
                    precision,
                    recall,
                    f1_score: safe_div(2.0 * precision * recall, precision + recall),
                    support: confusion_matrix.support(class),
                }
            })
            .collect();

        let n_classes = class_reports.len() as f64;
        let macro_avg = AverageReport {
            precision: class_reports.iter().map(|r| r.precision).sum::<f64>() / n_classes,
            recall: class_reports.iter().map(|r| r.recall).sum::<f64>() / n_classes,
            f1_score: class_reports.iter().map(|r| r.f1_score).sum::<f64>() / n_classes,
            support: n_test,
        };

        let weighted = |f: fn(&ClassReport) -> f64| {
            safe_div(
                class_reports.iter().map(|r| f(r) * r.support as f64).sum(),
                n_test as f64,
            )
        };
        let weighted_avg = AverageReport {
            precision: weighted(|r| r.precision),
            recall: weighted(|r| r.recall),
            f1_score: weighted(|r| r.f1_score),
            support: n_test,
        };

        Ok(Self {
            accuracy,
            confusion_matrix,
            class_reports,
            macro_avg,
            weighted_avg,
            n_train,
            n_test,
            config: config.clone(),
            training_time_secs: 0.0,
        })
    }

    pub fn report(&self, class: usize) -> Option<&ClassReport> {
        self.class_reports.iter().find(|r| r.class == class)
    }
}

// Zero when the denominator is zero
fn safe_div(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}
