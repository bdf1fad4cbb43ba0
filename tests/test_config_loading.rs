//! Settings file loading from disk.

use std::io::Write;
use std::time::Duration;

use breathpacer::config::{CONFIG_ENV, PATTERN_ENV, Settings, load_file, load_settings_with};
use breathpacer::error::ConfigError;
use breathpacer::indicator::Indicator;
use breathpacer::phase::Pattern;

fn write_settings(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn loads_partial_file_with_defaults() {
    let file = write_settings("pattern: box\n");
    let settings = load_file(file.path()).unwrap();

    assert_eq!(settings.pattern, Pattern::Box);
    assert_eq!(settings.frame_interval, Duration::from_millis(16));
    assert_eq!(settings.indicator, Indicator::default());
}

#[test]
fn loads_file_with_bom() {
    let file = write_settings("\u{feff}frame_interval: 40ms\n");
    let settings = load_file(file.path()).unwrap();
    assert_eq!(settings.frame_interval, Duration::from_millis(40));
}

#[test]
fn config_env_points_at_file() {
    let file = write_settings("pattern: box\nindicator:\n  max_size: 200\n");
    let path = file.path().to_string_lossy().into_owned();

    let settings = load_settings_with(None, |key| (key == CONFIG_ENV).then(|| path.clone()))
        .unwrap();
    assert_eq!(settings.pattern, Pattern::Box);
    assert_eq!(settings.indicator.max_size(), 200);
}

#[test]
fn pattern_env_beats_file() {
    let file = write_settings("pattern: box\n");
    let settings = load_settings_with(Some(file.path()), |key| {
        (key == PATTERN_ENV).then(|| "normal".to_string())
    })
    .unwrap();
    assert_eq!(settings.pattern, Pattern::Normal);
}

#[test]
fn explicit_path_beats_config_env() {
    let chosen = write_settings("pattern: box\n");
    let settings = load_settings_with(Some(chosen.path()), |key| {
        (key == CONFIG_ENV).then(|| "/nonexistent/other.yaml".to_string())
    })
    .unwrap();
    assert_eq!(settings.pattern, Pattern::Box);
}

#[test]
fn duration_overrides_in_file_rejected() {
    let file = write_settings("pattern: box\npatterns:\n  box:\n    exhale_ms: 6000\n");
    let err = load_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }), "got: {err}");
    assert!(err.to_string().contains("patterns"), "got: {err}");
}

#[test]
fn parse_error_names_file() {
    let file = write_settings("indicator: [1, 2\n");
    let err = load_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
    assert!(err.to_string().contains(&file.path().display().to_string()));
}

#[test]
fn empty_file_is_defaults() {
    let file = write_settings("");
    assert_eq!(load_file(file.path()).unwrap(), Settings::default());
}
