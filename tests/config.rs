use aurora::{
    ErrorKind,
    config::Config,
    diagnostics::Disposition,
    logging::{LogLevels, escape, format_record},
    runtime::{DEFAULT_MAX_EXPRESSION_DEPTH, DEFAULT_MAX_STRING_LENGTH},
};
use log::Level;
use std::fs;
use tempfile::tempdir;

#[test]
fn reads_pascal_case_keys() {
    let config = Config::from_json(
        r#"{
            "MaxExpressionDepth": 12,
            "Errors": ["Aurora.VarNotDefined"],
            "Ignore": ["Aurora.ArgumentSurplus"],
            "ClearLogFile": false,
            "Debug": true,
            "MaxStringLength": 64,
            "ShowTimestamp": true
        }"#,
    )
    .expect("valid config");
    assert_eq!(config.max_expression_depth, 12);
    assert!(!config.clear_log_file);
    assert!(config.debug);
    assert_eq!(config.max_string_length, 64);
    assert!(config.show_timestamp);

    let policy = config.policy();
    assert_eq!(policy.disposition(ErrorKind::VarNotDefined), Disposition::Fatal);
    assert_eq!(policy.disposition(ErrorKind::ArgumentSurplus), Disposition::Ignored);
    assert_eq!(policy.disposition(ErrorKind::TypeMismatch), Disposition::Warning);
    assert_eq!(policy.disposition(ErrorKind::DivisionByZero), Disposition::Fatal);
}

#[test]
fn missing_keys_use_defaults() {
    let config = Config::from_json("{}").expect("empty object is valid");
    assert_eq!(config, Config::default());
    assert_eq!(config.max_expression_depth, DEFAULT_MAX_EXPRESSION_DEPTH);
    assert!(config.clear_log_file);
    assert!(!config.show_timestamp);
    assert_eq!(config.max_string_length, DEFAULT_MAX_STRING_LENGTH);
}

#[test]
fn malformed_config_is_a_configuration_error() {
    let err = Config::from_json(r#"{"Debug": "yes"}"#).expect_err("wrong type");
    assert_eq!(err.kind(), Some(ErrorKind::Configuration));
}

#[test]
fn load_respects_whether_the_file_is_required() {
    let dir = tempdir().expect("create temp dir");
    let missing = dir.path().join("auroraConfig.json");
    assert_eq!(
        Config::load(&missing, false).expect("optional"),
        Config::default()
    );
    assert_eq!(
        Config::load(&missing, true).expect_err("required").kind(),
        Some(ErrorKind::FileNotFound)
    );

    fs::write(&missing, r#"{"Strict": true}"#).expect("write config");
    assert!(Config::load(&missing, true).expect("present").strict);
}

#[test]
fn strict_policy_escalates_everything() {
    let config = Config::from_json(r#"{"Strict": true, "Ignore": ["Aurora.TypeMismatch"]}"#)
        .expect("valid config");
    assert_eq!(
        config.policy().disposition(ErrorKind::TypeMismatch),
        Disposition::Fatal
    );
}

#[test]
fn log_levels_imply_lower_levels_unless_strict() {
    let relaxed = LogLevels::resolve(true, false, false, false);
    assert!(relaxed.debug && relaxed.verbose && relaxed.warning);

    let strict = LogLevels::resolve(true, false, false, true);
    assert!(strict.debug);
    assert!(!strict.verbose && !strict.warning);

    assert_eq!(LogLevels::resolve(false, false, false, false), LogLevels::default());
}

#[test]
fn log_records_stay_on_one_line() {
    assert_eq!(escape("a\nb\tc\\"), "a\\nb\\tc\\\\");
}

#[test]
fn log_records_carry_an_optional_timestamp() {
    assert_eq!(format_record(Level::Warn, "careful", None), "[WARNING] careful");
    assert_eq!(
        format_record(Level::Debug, "a\nb", Some("2024-01-02 03:04:05".to_string())),
        "[DEBUG] 2024-01-02 03:04:05: a\\nb"
    );
}
