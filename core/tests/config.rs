//! Settings resolution from environment-style key lookups.

use abtest_core::{
    config::{Environment, Settings, DEFAULT_LOCATION},
    error::PipelineError,
};
use std::collections::HashMap;

fn settings(vars: &[(&str, &str)]) -> Result<Settings, PipelineError> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Settings::from_lookup(|key| map.get(key).cloned())
}

#[test]
fn env_specific_keys_win_over_generic_ones() {
    let s = settings(&[
        ("ENV", "prod"),
        ("GCP_PROJECT_ID_PROD", "proj-prod"),
        ("GCP_PROJECT_ID", "proj-generic"),
        ("BQ_DATASET_NAME_PROD", "ds_prod"),
        ("BQ_DATASET_NAME_DEV", "ds_dev"),
    ])
    .unwrap();
    assert_eq!(s.env, Environment::Prod);
    assert_eq!(s.project_id, "proj-prod");
    assert_eq!(s.dataset, "ds_prod");
}

#[test]
fn generic_keys_are_the_fallback_and_env_defaults_to_dev() {
    let s = settings(&[
        ("GCP_PROJECT_ID_PROD", "ignored"),
        ("GCP_PROJECT_ID", "proj"),
        ("BQ_DATASET_NAME", "ds"),
    ])
    .unwrap();
    assert_eq!(s.env, Environment::Dev);
    assert_eq!(s.project_id, "proj");
    assert_eq!(s.dataset, "ds");
    assert_eq!(s.location, DEFAULT_LOCATION);
    assert_eq!(s.qualified_table("orders"), "proj.ds.orders");
}

#[test]
fn empty_values_count_as_unset() {
    let err = settings(&[("GCP_PROJECT_ID_DEV", ""), ("BQ_DATASET_NAME", "ds")]).unwrap_err();
    assert_eq!(err.to_string(), "GCP_PROJECT_ID not set for environment: dev");
}

#[test]
fn missing_dataset_is_rejected() {
    let err = settings(&[("ENV", "prod"), ("GCP_PROJECT_ID", "proj")]).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::MissingSetting {
            key: "BQ_DATASET_NAME",
            ..
        }
    ));
}

#[test]
fn unknown_environment_is_rejected() {
    let err = settings(&[
        ("ENV", "staging"),
        ("GCP_PROJECT_ID", "p"),
        ("BQ_DATASET_NAME", "d"),
    ])
    .unwrap_err();
    assert!(matches!(err, PipelineError::UnknownEnvironment(ref e) if e == "staging"));
}

#[test]
fn paths_and_location_can_be_overridden() {
    let s = settings(&[
        ("GCP_PROJECT_ID", "p"),
        ("BQ_DATASET_NAME", "d"),
        ("BQ_LOCATION", "EU"),
        ("AB_DATA_DIR", "/srv/data"),
        ("AB_SQL_DIR", "/srv/sql"),
    ])
    .unwrap();
    assert_eq!(s.location, "EU");
    assert_eq!(s.data_dir, std::path::PathBuf::from("/srv/data"));
    assert_eq!(s.schema_dir(), std::path::PathBuf::from("/srv/sql/schema"));
    assert_eq!(s.analysis_dir(), std::path::PathBuf::from("/srv/sql/analysis"));
}

#[test]
fn test_defaults_are_usable() {
    let s = Settings::default_test();
    assert_eq!(s.dataset, "marketplace_ab_test");
    assert_eq!(s.env.to_string(), "dev");
}
