//! Integration test: cleaning uploaded tables

mod common;

use common::{dirty_csv, dirty_csv_with, heart_raw, load, SMOKING_LABELS};
use heartrisk::dataset::count_duplicate_rows;
use heartrisk::error::RiskError;
use heartrisk::preprocessing::preprocess;
use heartrisk::schema::FeatureSchema;

fn required() -> Vec<String> {
    FeatureSchema::default().required_columns()
}

#[test]
fn test_missing_age_column_is_schema_error() {
    let csv = "hypertension,heart_attack\n0,1\n1,0\n";
    let mut cols = required();
    cols.retain(|c| c == "age" || c == "hypertension" || c == "heart_attack");

    let err = preprocess(&load(csv), &cols).unwrap_err();
    match err {
        RiskError::SchemaError { missing, unexpected } => {
            assert_eq!(missing, vec!["age".to_string()]);
            assert!(unexpected.is_empty());
        }
        other => panic!("expected schema error, got {:?}", other),
    }
}

#[test]
fn test_missing_columns_listed_in_schema_order() {
    let raw = heart_raw(20, 1);
    let df = raw
        .dataframe()
        .drop("smoking_status")
        .unwrap()
        .drop("age")
        .unwrap();
    let raw = heartrisk::dataset::RawDataset::from_dataframe(df).unwrap();

    let err = preprocess(&raw, &required()).unwrap_err();
    match err {
        RiskError::SchemaError { missing, .. } => {
            assert_eq!(missing, vec!["age".to_string(), "smoking_status".to_string()]);
        }
        other => panic!("expected schema error, got {:?}", other),
    }
}

#[test]
fn test_duplicates_and_missing_rows_removed() {
    let raw = load(&dirty_csv());
    assert_eq!(raw.height(), 100);

    let (clean, summary) = preprocess(&raw, &required()).unwrap();

    assert_eq!(summary.rows_before, 100);
    assert_eq!(summary.duplicates_removed, 5);
    assert_eq!(summary.missing_total_after, 0);
    assert_eq!(summary.missing_total_before(), 10);
    assert!(summary.rows_after <= 85);
    assert_eq!(summary.rows_after, clean.n_rows());
    assert_eq!(summary.cols, 16);

    let cholesterol = summary
        .missing_values_before
        .iter()
        .find(|m| m.column == "cholesterol_level")
        .unwrap();
    assert_eq!(cholesterol.count, 10);
}

#[test]
fn test_missing_markers_dropped_not_encoded() {
    for marker in ["NA", "N/A", "NaN", "null"] {
        let (clean, summary) = preprocess(&load(&dirty_csv_with(marker)), &required()).unwrap();

        let cholesterol = summary
            .missing_values_before
            .iter()
            .find(|m| m.column == "cholesterol_level")
            .unwrap();
        assert_eq!(cholesterol.count, 10, "marker {}", marker);
        assert_eq!(summary.duplicates_removed, 5);
        assert_eq!(summary.rows_after, 85);
        assert_eq!(summary.encoded_columns, vec!["smoking_status".to_string()]);
        assert!(!clean.codebook().is_categorical("cholesterol_level"));
    }
}

#[test]
fn test_numeric_order_survives_missing_markers() {
    let csv = "age,chol,heart_attack\n45,200,0\n61,NA,1\n52,180,0\n70,N/A,1\n38,95,0\n";
    let cols: Vec<String> = ["age", "chol", "heart_attack"].iter().map(|c| c.to_string()).collect();

    let (clean, summary) = preprocess(&load(csv), &cols).unwrap();
    assert_eq!(summary.rows_after, 3);
    assert!(summary.encoded_columns.is_empty());
    assert_eq!(summary.missing_values_before[1].count, 2);
    assert_eq!(clean.column("chol").unwrap().to_vec(), vec![200.0, 180.0, 95.0]);
}

#[test]
fn test_output_has_no_missing_or_duplicates() {
    let (clean, _) = preprocess(&load(&dirty_csv()), &required()).unwrap();

    assert!(clean.data().iter().all(|v| v.is_finite()));
    let reloaded = clean.to_raw().unwrap();
    let columns: Vec<_> = required()
        .iter()
        .map(|c| reloaded.column_values(c).unwrap())
        .collect();
    assert_eq!(count_duplicate_rows(&columns), 0);
}

#[test]
fn test_projection_keeps_schema_order() {
    let csv = common::heart_csv(30, 2);
    // Reverse the column order and add an unrelated column
    let lines: Vec<Vec<&str>> = csv.lines().map(|l| l.split(',').rev().collect()).collect();
    let mut shuffled = String::new();
    for (i, line) in lines.iter().enumerate() {
        let extra = if i == 0 { "patient_id".to_string() } else { i.to_string() };
        shuffled.push_str(&format!("{},{}\n", line.join(","), extra));
    }

    let (clean, _) = preprocess(&load(&shuffled), &required()).unwrap();
    assert_eq!(clean.columns(), required().as_slice());
}

#[test]
fn test_text_column_encoded_in_sorted_order() {
    let (clean, summary) = preprocess(&heart_raw(60, 3), &required()).unwrap();

    assert_eq!(summary.encoded_columns, vec!["smoking_status".to_string()]);
    let categories = clean.codebook().categories("smoking_status").unwrap();
    assert_eq!(categories, SMOKING_LABELS.map(String::from).as_slice());
    assert_eq!(clean.codebook().encode("smoking_status", "Never").unwrap(), 2.0);

    let codes = clean.column("smoking_status").unwrap();
    assert!(codes.iter().all(|&c| c == 0.0 || c == 1.0 || c == 2.0));
}

#[test]
fn test_preprocess_is_idempotent() {
    let (first, _) = preprocess(&load(&dirty_csv()), &required()).unwrap();
    let (second, summary) = preprocess(&first.to_raw().unwrap(), &required()).unwrap();

    assert_eq!(summary.duplicates_removed, 0);
    assert_eq!(summary.rows_removed(), 0);
    assert_eq!(first.columns(), second.columns());
    assert_eq!(first.data(), second.data());
}

#[test]
fn test_describe_covers_every_column() {
    let (clean, _) = preprocess(&heart_raw(40, 4), &required()).unwrap();
    let stats = clean.describe();

    assert_eq!(stats.len(), 16);
    let age = &stats[0];
    assert_eq!(age.name, "age");
    assert_eq!(age.count, 40);
    let (min, max) = (age.min.unwrap(), age.max.unwrap());
    assert!(min >= 30.0 && max <= 80.0);
    assert!(age.q25.unwrap() <= age.median.unwrap());
    assert!(age.median.unwrap() <= age.q75.unwrap());
}

#[test]
fn test_boolean_column_is_numeric() {
    let csv = "flag,heart_attack\ntrue,1\nfalse,0\ntrue,0\n";
    let cols = vec!["flag".to_string(), "heart_attack".to_string()];
    let (clean, summary) = preprocess(&load(csv), &cols).unwrap();

    assert!(summary.encoded_columns.is_empty());
    assert_eq!(clean.column("flag").unwrap().to_vec(), vec![1.0, 0.0, 1.0]);
}
