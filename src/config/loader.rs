//! Settings loader
//!
//! Pipeline:
//! 1. Resolve the file path (explicit path, else `BREATHPACER_CONFIG`)
//! 2. Read and strip a UTF-8 BOM
//! 3. YAML parsing into [`RawSettings`]
//! 4. Validation into [`Settings`]
//! 5. Environment overrides (`BREATHPACER_PATTERN`)
//!
//! Environment access goes through a lookup closure so callers and tests
//! can supply their own environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::config::schema::{RawSettings, Settings};
use crate::error::ConfigError;
use crate::indicator::{DEFAULT_MAX_SIZE, DEFAULT_MIN_SIZE, Indicator};
use crate::phase::{DEFAULT_FRAME_INTERVAL, Pattern};

/// Environment variable naming the settings file.
pub const CONFIG_ENV: &str = "BREATHPACER_CONFIG";

/// Environment variable overriding the startup pattern.
pub const PATTERN_ENV: &str = "BREATHPACER_PATTERN";

/// Longest accepted frame interval.
pub const MAX_FRAME_INTERVAL: Duration = Duration::from_secs(1);

// ============================================================================
// Public API
// ============================================================================

/// Loads settings from the process environment.
///
/// # Errors
///
/// See [`load_settings_with`].
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    load_settings_with(path, |key| std::env::var(key).ok())
}

/// Loads settings, reading environment variables through `env`.
///
/// Without an explicit `path` or `BREATHPACER_CONFIG`, defaults are used.
///
/// # Errors
///
/// Returns an error if the file is missing or malformed, a value fails
/// validation, or `BREATHPACER_PATTERN` names an unknown pattern.
pub fn load_settings_with<F>(path: Option<&Path>, env: F) -> Result<Settings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let path = path
        .map(Path::to_path_buf)
        .or_else(|| env(CONFIG_ENV).filter(|p| !p.is_empty()).map(PathBuf::from));

    let settings = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading settings file");
            load_file(&path)?
        }
        None => Settings::default(),
    };

    apply_env_overrides(settings, env)
}

/// Reads and validates a settings file.
///
/// # Errors
///
/// Returns `MissingFile` if the file cannot be read, `ParseError` for
/// malformed YAML, or a validation error.
pub fn load_file(path: &Path) -> Result<Settings, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
        path: path.to_path_buf(),
    })?;
    parse_settings(&content, path)
}

/// Parses and validates settings text. `path` is only used in errors.
///
/// An empty document yields the defaults.
///
/// # Errors
///
/// Returns `ParseError` for malformed YAML or unknown keys, or a
/// validation error.
pub fn parse_settings(content: &str, path: &Path) -> Result<Settings, ConfigError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let raw: RawSettings = if content.trim().is_empty() {
        RawSettings::default()
    } else {
        serde_yaml::from_str::<Option<RawSettings>>(content)
            .map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
            .unwrap_or_default()
    };

    validate(raw)
}

/// Validates raw settings, filling in defaults.
///
/// # Errors
///
/// Returns the first validation failure.
pub fn validate(raw: RawSettings) -> Result<Settings, ConfigError> {
    let pattern = raw
        .pattern
        .as_deref()
        .map_or(Ok(Pattern::default()), str::parse)?;

    let frame_interval = raw
        .frame_interval
        .as_deref()
        .map_or(Ok(DEFAULT_FRAME_INTERVAL), parse_frame_interval)?;

    let indicator = raw.indicator.unwrap_or_default();
    let indicator = Indicator::new(
        indicator.min_size.unwrap_or(DEFAULT_MIN_SIZE),
        indicator.max_size.unwrap_or(DEFAULT_MAX_SIZE),
    )?;

    Ok(Settings {
        pattern,
        frame_interval,
        indicator,
    })
}

/// Parses a humantime frame interval in `(0, 1s]`.
///
/// # Errors
///
/// Returns `InvalidValue` if the text does not parse or is out of range.
pub fn parse_frame_interval(value: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        field: "frame_interval".into(),
        value: value.to_string(),
        expected: format!(
            "a duration between 1ms and {}",
            humantime::format_duration(MAX_FRAME_INTERVAL)
        ),
    };

    let interval = humantime::parse_duration(value.trim()).map_err(|_| invalid())?;
    if interval.is_zero() || interval > MAX_FRAME_INTERVAL {
        return Err(invalid());
    }
    Ok(interval)
}

/// Applies environment overrides on top of file settings.
///
/// # Errors
///
/// Returns `UnknownPattern` if `BREATHPACER_PATTERN` does not name a preset.
pub fn apply_env_overrides<F>(mut settings: Settings, env: F) -> Result<Settings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = env(PATTERN_ENV).filter(|v| !v.trim().is_empty()) {
        settings.pattern = value.parse()?;
        debug!(pattern = %settings.pattern, "pattern overridden from environment");
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn parse(yaml: &str) -> Result<Settings, ConfigError> {
        parse_settings(yaml, Path::new("test.yaml"))
    }

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(parse("").unwrap(), Settings::default());
        assert_eq!(parse("  \n").unwrap(), Settings::default());
        assert_eq!(parse("\u{feff}").unwrap(), Settings::default());
    }

    #[test]
    fn full_document_parses() {
        let settings = parse(
            "pattern: box\n\
             frame_interval: 33ms\n\
             indicator:\n  min_size: 50\n  max_size: 300\n",
        )
        .unwrap();

        assert_eq!(settings.pattern, Pattern::Box);
        assert_eq!(settings.frame_interval, Duration::from_millis(33));
        assert_eq!(settings.indicator, Indicator::new(50, 300).unwrap());
    }

    #[test]
    fn phase_durations_are_not_configurable() {
        for yaml in [
            "patterns:\n  normal:\n    exhale_ms: 7000\n",
            "inhale_ms: 5000\n",
            "durations:\n  hold2: 2s\n",
        ] {
            let err = parse(yaml).unwrap_err();
            assert!(matches!(err, ConfigError::ParseError { .. }), "{yaml}: {err}");
        }
    }

    #[test]
    fn unknown_pattern_suggests() {
        let err = parse("pattern: boxx\n").unwrap_err();
        match err {
            ConfigError::UnknownPattern { name, suggestion } => {
                assert_eq!(name, "boxx");
                assert_eq!(suggestion.as_deref(), Some("box"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_key_is_parse_error() {
        let err = parse("patern: box\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        let err = parse("pattern: [box\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn frame_interval_bounds() {
        assert_eq!(
            parse_frame_interval("16ms").unwrap(),
            Duration::from_millis(16)
        );
        assert_eq!(parse_frame_interval(" 1s ").unwrap(), Duration::from_secs(1));
        assert!(parse_frame_interval("0ms").is_err());
        assert!(parse_frame_interval("2s").is_err());
        assert!(parse_frame_interval("fast").is_err());
    }

    #[test]
    fn bad_indicator_rejected() {
        let err = parse("indicator:\n  min_size: 300\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn env_pattern_overrides_file() {
        let settings = apply_env_overrides(Settings::default(), |key| {
            (key == PATTERN_ENV).then(|| "Box".to_string())
        })
        .unwrap();
        assert_eq!(settings.pattern, Pattern::Box);
    }

    #[test]
    fn env_bad_pattern_is_error() {
        let result = apply_env_overrides(Settings::default(), |key| {
            (key == PATTERN_ENV).then(|| "square".to_string())
        });
        assert!(matches!(result, Err(ConfigError::UnknownPattern { .. })));
    }

    #[test]
    fn no_path_and_no_env_uses_defaults() {
        assert_eq!(load_settings_with(None, no_env).unwrap(), Settings::default());
    }

    #[test]
    fn missing_file_reported() {
        let err = load_settings_with(Some(Path::new("/nonexistent/breathpacer.yaml")), no_env)
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }
}
