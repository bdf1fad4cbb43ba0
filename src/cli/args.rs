//! CLI argument definitions
//!
//! All Clap derive structs for `breathpacer` command-line parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::config::parse_frame_interval;
use crate::observability::LogFormat;
use crate::phase::Pattern;

// ============================================================================
// Root CLI
// ============================================================================

/// Guided breathing pacer.
#[derive(Parser, Debug)]
#[command(name = "breathpacer", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "BREATHPACER_COLOR")]
    pub color: ColorChoice,

    /// Log output format.
    #[arg(long, default_value = "human", global = true)]
    pub log_format: LogFormat,
}

// ============================================================================
// Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a guided breathing session.
    Run(RunArgs),

    /// List the breathing patterns and their timing.
    Patterns(PatternsArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

/// Arguments for `run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Breathing pattern (overrides settings and `BREATHPACER_PATTERN`).
    #[arg(short, long)]
    pub pattern: Option<Pattern>,

    /// Stop after this many completed cycles.
    #[arg(short = 'n', long)]
    pub cycles: Option<u64>,

    /// Stop after this much time, e.g. `5m` or `90s`.
    #[arg(short, long, value_parser = humantime::parse_duration)]
    pub duration: Option<Duration>,

    /// Path to YAML settings file.
    #[arg(short, long, env = "BREATHPACER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Progress frame cadence, e.g. `16ms` (overrides settings).
    #[arg(long, value_parser = parse_frame_interval)]
    pub frame_interval: Option<Duration>,

    /// Write JSONL session events to this file.
    #[arg(long)]
    pub events_file: Option<PathBuf>,

    /// Serve Prometheus metrics on `127.0.0.1:<port>`.
    #[arg(long, env = "BREATHPACER_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Output format for session frames.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `patterns`.
#[derive(Args, Debug)]
pub struct PatternsArgs {
    /// Path to YAML settings file.
    #[arg(short, long, env = "BREATHPACER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output (one object per line for `run`).
    Json,
}

/// Target shell for completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash
    Bash,
    /// Zsh
    Zsh,
    /// Fish
    Fish,
    /// `PowerShell`
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish
    Elvish,
}

impl From<Shell> for clap_complete::Shell {
    fn from(shell: Shell) -> Self {
        match shell {
            Shell::Bash => Self::Bash,
            Shell::Zsh => Self::Zsh,
            Shell::Fish => Self::Fish,
            Shell::PowerShell => Self::PowerShell,
            Shell::Elvish => Self::Elvish,
        }
    }
}
