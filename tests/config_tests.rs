use std::io::Write;
use std::time::Duration;

use shutdown_signaller::StopConfig;

#[test]
fn parse_kebab_case_humantime_durations() {
    let yaml = r#"
soft-stop-timeout: 1m 30s
hard-stop-timeout: 250ms
"#;
    let cfg = StopConfig::from_yaml_str(yaml).unwrap().validated().unwrap();
    assert_eq!(cfg.soft_stop_timeout, Duration::from_secs(90));
    assert_eq!(cfg.hard_stop_timeout, Duration::from_millis(250));
}

#[test]
fn missing_keys_fall_back_to_defaults() {
    let cfg = StopConfig::from_yaml_str("hard-stop-timeout: 2s").unwrap();
    assert_eq!(cfg.soft_stop_timeout, StopConfig::default().soft_stop_timeout);
    assert_eq!(cfg.hard_stop_timeout, Duration::from_secs(2));
}

#[test]
fn unknown_keys_are_rejected() {
    let err = StopConfig::from_yaml_str("grace: 5s").unwrap_err();
    assert!(err.to_string().contains("unknown field"), "{err}");
}

#[test]
fn zero_hard_stop_timeout_fails_validation() {
    let cfg = StopConfig::from_yaml_str("hard-stop-timeout: 0s").unwrap();
    let err = cfg.validated().unwrap_err();
    assert!(err.to_string().contains("hard-stop-timeout"), "{err}");
}

#[test]
fn load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "soft-stop-timeout: 3s").unwrap();

    let cfg = StopConfig::from_yaml_file(file.path()).unwrap();
    assert_eq!(cfg.soft_stop_timeout, Duration::from_secs(3));
    assert_eq!(cfg.hard_stop_timeout, StopConfig::default().hard_stop_timeout);
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");
    let err = StopConfig::from_yaml_file(&path).unwrap_err();
    assert!(format!("{err:#}").contains("absent.yaml"), "{err:#}");
}
