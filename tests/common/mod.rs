//! Shared integration-test harness for running the `breathpacer` binary.

#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};

/// Helpers for invoking the compiled binary.
pub struct Breathpacer;

impl Breathpacer {
    /// Builds a command with a clean breathpacer environment.
    pub fn command(args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_breathpacer"));
        cmd.args(args)
            .env_remove("BREATHPACER_CONFIG")
            .env_remove("BREATHPACER_PATTERN")
            .env_remove("BREATHPACER_LOG_LEVEL")
            .env_remove("BREATHPACER_METRICS_PORT")
            .env("NO_COLOR", "1");
        cmd
    }

    /// Runs the binary to completion and captures its output.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn_command(args: &[&str]) -> Output {
        Self::command(args)
            .output()
            .expect("failed to run breathpacer binary")
    }

    /// Runs the binary with one extra environment variable.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn_with_env(args: &[&str], key: &str, value: &str) -> Output {
        Self::command(args)
            .env(key, value)
            .output()
            .expect("failed to run breathpacer binary")
    }

    /// Runs the binary with a settings file.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn_with_config(config: &Path, args: &[&str]) -> Output {
        Self::command(args)
            .env("BREATHPACER_CONFIG", config)
            .output()
            .expect("failed to run breathpacer binary")
    }
}

/// Parses stdout as newline-delimited JSON.
#[allow(clippy::missing_panics_doc)]
pub fn json_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).expect("stdout line should be JSON"))
        .collect()
}
