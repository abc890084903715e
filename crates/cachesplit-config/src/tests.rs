//! Tests for sweep configuration.

use super::*;

#[test]
fn test_toml_parsing() {
    let toml = r#"
        sequence_length = 40
        max_splits = 3
        thread_count = "none"
        bounder = "none"

        [tracker]
        pi_values = [0.72]
        iterations = 10
        seed = 42
        min_tokens = 50
        max_tokens = 60
    "#;

    let config = SweepConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.sequence_length, 40);
    assert_eq!(config.max_splits, 3);
    assert_eq!(config.thread_count, ThreadCountConfig::None);
    assert_eq!(config.bounder, BounderType::None);
    let tracker = config.tracker.unwrap();
    assert_eq!(tracker.seed, Some(42));
    assert_eq!(tracker.min_tokens, 50);
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        sequence_length: 30
        max_splits: 2
        thread_count: none
        tracker:
          iterations: 20
    "#;

    let config = SweepConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.sequence_length, 30);
    assert_eq!(config.thread_count, ThreadCountConfig::None);
    assert_eq!(config.bounder, BounderType::Structural);
    let tracker = config.tracker.unwrap();
    assert_eq!(tracker.iterations, 20);
    assert_eq!(tracker.pi_values, vec![0.5, 0.72, 1.5, 2.0, 0.5]);
}

#[test]
fn test_toml_thread_count_table() {
    let config = SweepConfig::from_toml_str("thread_count = { count = 4 }").unwrap();
    assert_eq!(config.thread_count, ThreadCountConfig::Count(4));
}

#[test]
fn test_empty_toml_uses_defaults() {
    let config = SweepConfig::from_toml_str("").unwrap();
    assert_eq!(config, SweepConfig::default());
    assert_eq!(config.sequence_length, DEFAULT_SEQUENCE_LENGTH);
    assert_eq!(config.max_splits, DEFAULT_MAX_SPLITS);
    assert!(config.tracker.is_none());
}

#[test]
fn test_builder() {
    let config = SweepConfig::new()
        .with_sequence_length(12)
        .with_max_splits(3)
        .with_thread_count(ThreadCountConfig::Count(2))
        .with_bounder(BounderType::None)
        .with_tracker(TrackerConfig::default().with_seed(5));

    assert_eq!(config.sequence_length, 12);
    assert_eq!(config.max_splits, 3);
    assert_eq!(config.tracker.unwrap().seed, Some(5));
}

#[test]
fn test_validate_rejects_zero_length() {
    let config = SweepConfig::new().with_sequence_length(0);
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_validate_rejects_zero_splits() {
    let config = SweepConfig::new().with_max_splits(0);
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_zero_threads() {
    let config = SweepConfig::new().with_thread_count(ThreadCountConfig::Count(0));
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_allows_splits_beyond_length() {
    let config = SweepConfig::new().with_sequence_length(3).with_max_splits(5);
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_tracker_range() {
    let tracker = TrackerConfig {
        min_tokens: 10,
        max_tokens: 5,
        ..TrackerConfig::default()
    };
    let config = SweepConfig::new().with_tracker(tracker);
    assert!(config.validate().is_err());
}

#[test]
fn test_load_missing_file() {
    let result = SweepConfig::load("/nonexistent/sweep.toml");
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_invalid_toml() {
    let result = SweepConfig::from_toml_str("sequence_length = \"many\"");
    assert!(matches!(result, Err(ConfigError::Toml(_))));
}

#[test]
fn test_bounder_display() {
    assert_eq!(format!("{}", BounderType::Structural), "Structural");
    assert_eq!(format!("{}", BounderType::None), "None");
}
