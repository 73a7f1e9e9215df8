use std::fs;

use step_framework_core::{CommandVariant, CompletedStepConfig, ConfigError, ExecInContainer};

#[test]
fn loads_step_config_from_yaml_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("step.yaml");
    fs::write(
        &path,
        "variant:\n  option: exec\n  service: web\n  command: echo hi\n  containerIndex: 1\n",
    )
    .expect("write config");

    let config = CompletedStepConfig::load_from_file(&path).expect("load config");
    assert_eq!(
        config.variant,
        CommandVariant::ExecInContainer(ExecInContainer::new("web", "echo hi"))
    );
    config.validate().expect("valid config");
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("absent.yaml");

    let err = CompletedStepConfig::load_from_file(&path).expect_err("missing file");
    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains("absent.yaml"));
}

#[test]
fn malformed_file_is_a_parse_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bad.yaml");
    fs::write(&path, "variant: [not, a, variant]\n").expect("write config");

    let err = CompletedStepConfig::load_from_file(&path).expect_err("bad yaml");
    assert!(matches!(err, ConfigError::Parse { .. }));
}
