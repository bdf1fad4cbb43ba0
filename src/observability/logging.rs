//! Tracing subscriber setup.
//!
//! [`LogSettings::resolve`] turns the CLI flags and the environment into
//! a plain value; [`LogSettings::install`] hands it to
//! `tracing-subscriber`. Logs always go to stderr so the session display
//! on stdout stays readable.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

use crate::cli::args::ColorChoice;

/// Environment variable that overrides the verbosity flags.
pub const LOG_LEVEL_ENV: &str = "BREATHPACER_LOG_LEVEL";

/// Disables colour in `auto` mode when set to a non-empty value.
pub const NO_COLOR_ENV: &str = "NO_COLOR";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact text, coloured on a terminal.
    #[default]
    Human,
    /// One JSON object per line.
    Json,
}

/// Default filter for a `-v` count; saturates at `trace`.
#[must_use]
pub const fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Subscriber configuration after flags and environment are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Output format.
    pub format: LogFormat,
    /// `EnvFilter` directive, e.g. `info` or `breathpacer::phase=trace`.
    pub directive: String,
    /// Whether ANSI escapes are written. Always `false` for JSON.
    pub ansi: bool,
    /// Whether event targets (module paths) are shown.
    pub targets: bool,
}

impl LogSettings {
    /// Merges flags with environment values read through `env`.
    ///
    /// A `BREATHPACER_LOG_LEVEL` that `EnvFilter` cannot parse is ignored
    /// in favour of the verbosity default. JSON lines never carry colour
    /// escapes, whatever `color` says.
    pub fn resolve<F>(
        format: LogFormat,
        verbosity: u8,
        color: ColorChoice,
        stderr_is_terminal: bool,
        env: F,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let directive = env(LOG_LEVEL_ENV)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty() && EnvFilter::try_new(value).is_ok())
            .unwrap_or_else(|| verbosity_to_directive(verbosity).to_string());

        let wants_color = match color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                stderr_is_terminal && env(NO_COLOR_ENV).is_none_or(|v| v.is_empty())
            }
        };

        Self {
            format,
            directive,
            ansi: wants_color && format == LogFormat::Human,
            targets: verbosity >= 2,
        }
    }

    /// Builds the filter for [`Self::directive`].
    #[must_use]
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.directive)
            .unwrap_or_else(|_| EnvFilter::new(verbosity_to_directive(0)))
    }

    /// Installs the global subscriber. Returns `false` if one was already
    /// set, which makes repeated calls harmless.
    pub fn install(&self) -> bool {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(self.filter())
            .with_ansi(self.ansi)
            .with_target(self.targets)
            .with_writer(std::io::stderr);

        let installed = match self.format {
            LogFormat::Human => builder.try_init(),
            LogFormat::Json => builder.json().try_init(),
        };
        installed.is_ok()
    }
}

/// Installs logging from CLI flags and the process environment.
pub fn init_logging(format: LogFormat, verbosity: u8, color: ColorChoice) {
    let settings = LogSettings::resolve(
        format,
        verbosity,
        color,
        std::io::stderr().is_terminal(),
        |key| std::env::var(key).ok(),
    );
    settings.install();
}
