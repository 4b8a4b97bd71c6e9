use std::io::Write;
use tempfile::NamedTempFile;
use tracewise::config::{Config, ExecutionForm, MatcherKind};
use tracewise::error::TraceError;

#[test]
fn test_defaults_match_documented_values() {
    let config = Config::default();
    assert_eq!(config.matching.logical_size, 300.0);
    assert_eq!(config.matching.on_path_threshold, 15.0);
    assert_eq!(config.matching.coverage_threshold, 0.70);
    assert_eq!(config.matching.min_stroke_points, 10);
    assert_eq!(config.matching.min_stroke_length, 40.0);
    assert_eq!(config.matching.alignment_samples, 16);
    assert_eq!(config.feedback.deviation_cooldown_ms, 150);
    assert_eq!(config.feedback.speech_delay_ms, 100);
    assert!(config.feedback.enable_speech);
    assert_eq!(config.session.transition_ms, 2000);
    assert_eq!(config.session.template_weight, 0.4);
    assert_eq!(config.session.guided_weight, 0.6);
    assert_eq!(config.session.execution, ExecutionForm::Auto);
    assert_eq!(config.session.background_matcher, MatcherKind::Alignment);
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_json_fills_in_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "matching": {{ "on_path_threshold": 20.0 }},
            "session": {{ "execution": "background", "background_matcher": "coverage" }}
        }}"#
    )
    .unwrap();

    let config = Config::load_from_file(file.path()).unwrap();
    assert_eq!(config.matching.on_path_threshold, 20.0);
    assert_eq!(config.matching.coverage_threshold, 0.70);
    assert_eq!(config.session.execution, ExecutionForm::Background);
    assert_eq!(config.session.background_matcher, MatcherKind::Coverage);
    assert_eq!(config.feedback.deviation_cooldown_ms, 150);
}

#[test]
fn test_invalid_values_are_rejected() {
    let mut config = Config::default();
    config.matching.coverage_threshold = 1.5;
    assert!(matches!(config.validate(), Err(TraceError::Config(_))));

    let mut config = Config::default();
    config.session.surface_size = 0.0;
    assert!(matches!(config.validate(), Err(TraceError::Config(_))));

    let mut config = Config::default();
    config.matching.alignment_samples = 1;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.matching.alignment_divisor = 0.0;
    assert!(config.validate().is_err());
}

#[test]
fn test_load_rejects_bad_files() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();
    assert!(matches!(
        Config::load_from_file(file.path()),
        Err(TraceError::Json(_))
    ));

    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{ "matching": {{ "coverage_threshold": -0.1 }} }}"#).unwrap();
    assert!(matches!(
        Config::load_from_file(file.path()),
        Err(TraceError::Config(_))
    ));
}

#[test]
fn test_durations() {
    let config = Config::default();
    assert_eq!(config.feedback.cooldown().as_millis(), 150);
    assert_eq!(config.feedback.speech_delay().as_millis(), 100);
    assert_eq!(config.session.transition_window().as_millis(), 2000);
}
