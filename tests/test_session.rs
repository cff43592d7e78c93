//! Integration test: session stage guards and invalidation

mod common;

use common::{heart_csv, sample_record};
use heartrisk::error::RiskError;
use heartrisk::session::{Session, Stage};
use heartrisk::training::TrainingConfig;

fn fast_config() -> TrainingConfig {
    TrainingConfig::default().with_n_estimators(50)
}

fn trained_session() -> Session {
    let mut session = Session::new();
    session.upload_bytes(heart_csv(120, 21).into_bytes()).unwrap();
    session.preprocess().unwrap();
    session.train(&fast_config()).unwrap();
    session
}

#[test]
fn test_stages_advance_in_order() {
    let mut session = Session::new();
    assert_eq!(session.stage(), Stage::Empty);

    session.upload_bytes(heart_csv(80, 22).into_bytes()).unwrap();
    assert_eq!(session.stage(), Stage::RawLoaded);
    assert_eq!(session.overview().unwrap().rows, 80);

    session.preprocess().unwrap();
    assert_eq!(session.stage(), Stage::Cleaned);
    assert!(session.summary().is_some());

    session.train(&fast_config()).unwrap();
    assert_eq!(session.stage(), Stage::Trained);
    assert!(session.metrics().is_some());
}

#[test]
fn test_prerequisites_name_the_missing_step() {
    let mut session = Session::new();
    let err = session.preprocess().unwrap_err();
    assert!(err.to_string().contains("Upload Dataset"), "{}", err);

    session.upload_bytes(heart_csv(40, 23).into_bytes()).unwrap();
    let err = session.train(&fast_config()).unwrap_err();
    assert!(matches!(err, RiskError::PrerequisiteError { required: Stage::Cleaned }));
    assert!(err.to_string().contains("Preprocessing Data"), "{}", err);
}

#[test]
fn test_predict_before_train_is_not_fitted() {
    let mut session = Session::new();
    session.upload_bytes(heart_csv(40, 24).into_bytes()).unwrap();
    session.preprocess().unwrap();

    let err = session.predict(&sample_record()).unwrap_err();
    assert!(matches!(err, RiskError::NotFittedError));
}

#[test]
fn test_new_upload_invalidates_downstream() {
    let mut session = trained_session();

    session.upload_bytes(heart_csv(60, 25).into_bytes()).unwrap();
    assert_eq!(session.stage(), Stage::RawLoaded);
    assert!(session.clean().is_none());
    assert!(session.summary().is_none());
    assert!(session.model().is_none());
    assert!(session.metrics().is_none());
    assert!(matches!(
        session.predict(&sample_record()).unwrap_err(),
        RiskError::NotFittedError
    ));
}

#[test]
fn test_new_preprocess_invalidates_model() {
    let mut session = trained_session();

    session.preprocess().unwrap();
    assert_eq!(session.stage(), Stage::Cleaned);
    assert!(session.model().is_none());
    assert!(session.metrics().is_none());
}

#[test]
fn test_failed_retrain_keeps_previous_model() {
    let mut session = trained_session();
    let before = session.metrics().unwrap().accuracy;
    let trained_at = session.model().unwrap().trained_at();

    let bad = TrainingConfig::default().with_n_estimators(10);
    let err = session.train(&bad).unwrap_err();
    assert!(matches!(err, RiskError::InvalidParameter { .. }));

    assert_eq!(session.stage(), Stage::Trained);
    assert_eq!(session.metrics().unwrap().accuracy, before);
    assert_eq!(session.model().unwrap().trained_at(), trained_at);
    assert!(session.predict(&sample_record()).is_ok());
}

#[test]
fn test_failed_upload_keeps_previous_state() {
    let mut session = trained_session();

    let err = session.upload_bytes(b"   \n".to_vec()).unwrap_err();
    assert!(matches!(err, RiskError::InputParseError(_)));
    assert_eq!(session.stage(), Stage::Trained);
}

#[test]
fn test_failed_preprocess_keeps_raw() {
    let mut session = Session::new();
    session
        .upload_bytes(b"age,heart_attack\n50,1\n60,0\n".to_vec())
        .unwrap();

    let err = session.preprocess().unwrap_err();
    assert!(matches!(err, RiskError::SchemaError { .. }));
    assert_eq!(session.stage(), Stage::RawLoaded);
    assert!(session.raw().is_some());
}

#[test]
fn test_reset_returns_to_empty() {
    let mut session = trained_session();
    let id = session.id();

    session.reset();
    assert_eq!(session.stage(), Stage::Empty);
    assert!(session.raw().is_none());
    assert_eq!(session.id(), id);
}
