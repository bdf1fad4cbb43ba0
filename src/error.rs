//! Error types for `breathpacer`
//!
//! Configuration problems are the only real failure class: the engine
//! itself is total, and misuse (changing the pattern mid-session) is
//! reported by rejecting the call.

use std::path::PathBuf;
use thiserror::Error;

use crate::phase::Phase;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `breathpacer` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Cycle engine error (rejected command, missing runtime)
    pub const ENGINE_ERROR: i32 = 5;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `breathpacer` operations.
///
/// Aggregates the domain errors and maps each one to an exit code.
#[derive(Debug, Error)]
pub enum PacerError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Cycle engine error
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Invalid command-line usage
    #[error("usage error: {0}")]
    Usage(String),
}

impl PacerError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Json(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Engine(_) => ExitCode::ENGINE_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
            Self::Usage(_) => ExitCode::USAGE_ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the settings file
        path: PathBuf,
        /// Error message from the parser
        message: String,
    },

    /// Referenced settings file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// A phase duration is zero or negative
    #[error("invalid duration for {phase}: {value_ms}ms (must be a positive number of milliseconds)")]
    InvalidDuration {
        /// Phase the duration belongs to
        phase: Phase,
        /// The rejected value in milliseconds
        value_ms: i64,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },

    /// Pattern name does not match a built-in preset
    #[error("unknown pattern '{name}'{hint}", hint = suggestion_hint(.suggestion.as_deref()))]
    UnknownPattern {
        /// The name that was given
        name: String,
        /// Closest known pattern name, if any is close enough
        suggestion: Option<String>,
    },
}

fn suggestion_hint(suggestion: Option<&str>) -> String {
    suggestion.map_or_else(String::new, |s| format!(" (did you mean '{s}'?)"))
}

// ============================================================================
// Cycle Engine Errors
// ============================================================================

/// Errors reported by [`CycleEngine`](crate::phase::CycleEngine) commands.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// Command is only accepted while the engine is idle
    #[error("cannot {operation} while a session is running")]
    Busy {
        /// Name of the rejected operation
        operation: &'static str,
    },

    /// `start` was called outside a Tokio runtime
    #[error("no Tokio runtime available to drive the session")]
    NoRuntime,
}
