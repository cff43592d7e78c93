//! Synthetic heart-attack data shared by the integration tests

#![allow(dead_code)]

use heartrisk::dataset::RawDataset;
use heartrisk::inference::PredictionRecord;
use heartrisk::schema::{FEATURE_COLUMNS, TARGET_COLUMN};
use heartrisk::utils::DataLoader;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

pub const SMOKING_LABELS: [&str; 3] = ["Current", "Former", "Never"];

/// Header of the generated table: features then target
pub fn header() -> Vec<String> {
    FEATURE_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(std::iter::once(TARGET_COLUMN.to_string()))
        .collect()
}

/// `n` rows of cells in [`header`] order.
///
/// The target is 1 for the upper half of a risk score driven by age,
/// systolic pressure, heart history and smoking, so both classes are
/// present and learnable.
pub fn heart_rows(n: usize, seed: u64) -> Vec<Vec<String>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(n);
    let mut scores = Vec::with_capacity(n);

    for _ in 0..n {
        let age: i64 = rng.gen_range(30..=80);
        let hypertension: i64 = rng.gen_range(0..=1);
        let systolic: i64 = rng.gen_range(100..=180);
        let diastolic: i64 = rng.gen_range(60..=110);
        let diabetes: i64 = rng.gen_range(0..=1);
        let cholesterol: i64 = rng.gen_range(150..=300);
        let hdl: i64 = rng.gen_range(30..=80);
        let ldl: i64 = rng.gen_range(70..=200);
        let triglycerides: i64 = rng.gen_range(80..=300);
        let sugar: i64 = rng.gen_range(70..=200);
        let obesity: i64 = rng.gen_range(0..=1);
        let waist: i64 = rng.gen_range(70..=130);
        let previous: i64 = rng.gen_range(0..=1);
        let smoking = SMOKING_LABELS[rng.gen_range(0..SMOKING_LABELS.len())];
        let activity: i64 = rng.gen_range(0..=2);

        let score = (age - 30) as f64 / 50.0
            + (systolic - 100) as f64 / 80.0
            + previous as f64 * 0.8
            + hypertension as f64 * 0.3
            + if smoking == "Current" { 0.4 } else { 0.0 }
            + rng.gen_range(-0.2..0.2);
        scores.push(score);

        rows.push(vec![
            age.to_string(),
            hypertension.to_string(),
            systolic.to_string(),
            diastolic.to_string(),
            diabetes.to_string(),
            cholesterol.to_string(),
            hdl.to_string(),
            ldl.to_string(),
            triglycerides.to_string(),
            sugar.to_string(),
            obesity.to_string(),
            waist.to_string(),
            previous.to_string(),
            smoking.to_string(),
            activity.to_string(),
        ]);
    }

    let mut sorted = scores.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let median = sorted[n / 2];
    for (row, score) in rows.iter_mut().zip(&scores) {
        row.push(if *score >= median { "1" } else { "0" }.to_string());
    }
    rows
}

pub fn to_csv(header: &[String], rows: &[Vec<String>]) -> String {
    let mut out = header.join(",");
    out.push('\n');
    for row in rows {
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

pub fn heart_csv(n: usize, seed: u64) -> String {
    to_csv(&header(), &heart_rows(n, seed))
}

pub fn load(csv: &str) -> RawDataset {
    DataLoader::new().load_bytes(csv.as_bytes().to_vec()).unwrap()
}

pub fn heart_raw(n: usize, seed: u64) -> RawDataset {
    load(&heart_csv(n, seed))
}

/// 95 distinct rows plus 5 copies of the first five, with one blank
/// cholesterol cell in each of rows 10..20
pub fn dirty_csv() -> String {
    dirty_csv_with("")
}

/// [`dirty_csv`] with `marker` written into the missing cholesterol cells
pub fn dirty_csv_with(marker: &str) -> String {
    let mut rows = heart_rows(95, 7);
    let copies: Vec<Vec<String>> = rows[..5].to_vec();
    rows.extend(copies);

    let cholesterol = header().iter().position(|c| c == "cholesterol_level").unwrap();
    for row in &mut rows[10..20] {
        row[cholesterol] = marker.to_string();
    }
    to_csv(&header(), &rows)
}

const SAMPLE: [(&str, &str); 15] = [
    ("age", "62"),
    ("hypertension", "1"),
    ("blood_pressure_systolic", "165"),
    ("blood_pressure_diastolic", "95"),
    ("diabetes", "0"),
    ("cholesterol_level", "240"),
    ("cholesterol_hdl", "38"),
    ("cholesterol_ldl", "160"),
    ("triglycerides", "210"),
    ("fasting_blood_sugar", "110"),
    ("obesity", "1"),
    ("waist_circumference", "102"),
    ("previous_heart_disease", "1"),
    ("smoking_status", "Current"),
    ("physical_activity", "0"),
];

/// A typical record with every feature set
pub fn sample_record() -> PredictionRecord {
    sample_record_without("")
}

/// [`sample_record`] minus one field
pub fn sample_record_without(skip: &str) -> PredictionRecord {
    PredictionRecord::from_pairs(
        SAMPLE
            .iter()
            .filter(|(name, _)| *name != skip)
            .map(|(name, value)| format!("{}={}", name, value)),
    )
    .unwrap()
}
