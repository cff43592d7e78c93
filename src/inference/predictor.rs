//! Single-record prediction

use crate::error::{RiskError, Result};
use crate::preprocessing::CategoryCodebook;
use crate::training::TrainedModel;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// One field of a hand-entered record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    Number(f64),
    Category(String),
}

impl RecordValue {
    /// Read a value typed by a user: numbers stay numbers, anything else is a label
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed.parse::<f64>() {
            Ok(v) => RecordValue::Number(v),
            Err(_) => RecordValue::Category(trimmed.to_string()),
        }
    }
}

impl From<f64> for RecordValue {
    fn from(v: f64) -> Self {
        RecordValue::Number(v)
    }
}

impl From<i32> for RecordValue {
    fn from(v: i32) -> Self {
        RecordValue::Number(v as f64)
    }
}

impl From<&str> for RecordValue {
    fn from(v: &str) -> Self {
        RecordValue::Category(v.to_string())
    }
}

impl From<String> for RecordValue {
    fn from(v: String) -> Self {
        RecordValue::Category(v)
    }
}

impl fmt::Display for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordValue::Number(v) => write!(f, "{}", v),
            RecordValue::Category(s) => write!(f, "{}", s),
        }
    }
}

/// Feature values of one person, keyed by feature name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    values: BTreeMap<String, RecordValue>,
}

impl PredictionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set one field
    pub fn with(mut self, name: impl Into<String>, value: impl Into<RecordValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<RecordValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&RecordValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse `name=value` pairs
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut record = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (name, value) = pair.split_once('=').ok_or_else(|| {
                RiskError::InvalidInput(format!("expected name=value, got '{}'", pair))
            })?;
            let name = name.trim();
            if name.is_empty() {
                return Err(RiskError::InvalidInput(format!("empty field name in '{}'", pair)));
            }
            record.insert(name, RecordValue::parse(value));
        }
        Ok(record)
    }
}

/// Risk band shown with a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// `High` from 0.6, `Moderate` from 0.3, otherwise `Low`
    pub fn from_probability(p: f64) -> Self {
        if p >= 0.6 {
            RiskLevel::High
        } else if p >= 0.3 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            RiskLevel::High => "Serious attention needed",
            RiskLevel::Moderate => "Needs attention",
            RiskLevel::Low => "Good condition",
        }
    }

    /// General, non-medical lifestyle advice for the band
    pub fn advice(&self) -> &'static [&'static str] {
        match self {
            RiskLevel::High => &[
                "Consult a cardiologist as soon as possible",
                "Get a complete laboratory check-up",
                "Stop smoking immediately",
                "Cut down on food high in saturated fat and sugar",
                "Increase physical activity gradually",
                "Follow any prescribed medical therapy",
            ],
            RiskLevel::Moderate => &[
                "See a doctor for a follow-up examination",
                "Improve your diet with more vegetables and fruit",
                "Exercise lightly and regularly, at least 30 minutes a day",
                "Check blood pressure and blood sugar periodically",
                "Keep a sufficient and regular sleep pattern",
                "Avoid smoking and alcohol",
            ],
            RiskLevel::Low => &[
                "Keep up your healthy lifestyle",
                "Stay active with regular exercise",
                "Keep a balanced diet",
                "Have a routine medical check-up every 6 to 12 months",
                "Manage stress well",
                "Drink enough water",
            ],
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
        };
        write!(f, "{}", label)
    }
}

/// Outcome of scoring one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// 1 = at risk, 0 = not at risk
    pub predicted_class: u8,
    /// Probability of class 1
    pub probability: f64,
    pub risk_level: RiskLevel,
}

impl Prediction {
    pub fn from_probability(probability: f64) -> Self {
        Self {
            predicted_class: u8::from(probability >= 0.5),
            probability,
            risk_level: RiskLevel::from_probability(probability),
        }
    }
}

/// Score one record with a trained model.
///
/// `feature_order` must be the model's own feature list and the record must
/// hold exactly those fields. Category labels go through the model's
/// codebook, so they are encoded the way the training rows were.
pub fn predict(
    model: &TrainedModel,
    record: &PredictionRecord,
    feature_order: &[String],
) -> Result<Prediction> {
    if !model.is_fitted() {
        return Err(RiskError::NotFittedError);
    }

    if feature_order != model.feature_names() {
        let missing: Vec<String> = model
            .feature_names()
            .iter()
            .enumerate()
            .filter(|(i, name)| feature_order.get(*i) != Some(*name))
            .map(|(_, name)| name.clone())
            .collect();
        let unexpected: Vec<String> = feature_order
            .iter()
            .filter(|name| !model.feature_names().contains(*name))
            .cloned()
            .collect();
        return Err(RiskError::SchemaError { missing, unexpected });
    }

    let missing: Vec<String> = feature_order
        .iter()
        .filter(|name| record.get(name).is_none())
        .cloned()
        .collect();
    let unexpected: Vec<String> = record
        .values
        .keys()
        .filter(|name| !feature_order.contains(*name))
        .cloned()
        .collect();
    if !missing.is_empty() || !unexpected.is_empty() {
        return Err(RiskError::SchemaError { missing, unexpected });
    }

    let codebook = model.codebook();
    let row: Array1<f64> = feature_order
        .iter()
        .map(|name| {
            let value = record
                .get(name)
                .ok_or_else(|| RiskError::missing_columns([name.as_str()]))?;
            encode_value(codebook, name, value)
        })
        .collect::<Result<Vec<f64>>>()?
        .into();

    let probability = model.positive_probability(row.view())?;
    let prediction = Prediction::from_probability(probability);
    debug!(
        probability,
        predicted_class = prediction.predicted_class,
        risk = %prediction.risk_level,
        "Scored record"
    );
    Ok(prediction)
}

fn encode_value(
    codebook: &CategoryCodebook,
    name: &str,
    value: &RecordValue,
) -> Result<f64> {
    match value {
        RecordValue::Number(v) if !v.is_finite() => Err(RiskError::InvalidInput(format!(
            "'{}' must be a finite number, got {}",
            name, v
        ))),
        RecordValue::Number(v) if codebook.is_categorical(name) => {
            if codebook.is_valid_code(name, *v) {
                Ok(*v)
            } else {
                Err(RiskError::InvalidInput(format!(
                    "{} is not a valid code for '{}' (known: {})",
                    v,
                    name,
                    codebook.categories(name).unwrap_or_default().join(", ")
                )))
            }
        }
        RecordValue::Number(v) => Ok(*v),
        RecordValue::Category(label) if codebook.is_categorical(name) => codebook.encode(name, label),
        RecordValue::Category(label) => Err(RiskError::InvalidInput(format!(
            "'{}' is numeric, got '{}'",
            name, label
        ))),
    }
}
