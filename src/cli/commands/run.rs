//! `breathpacer run`
//!
//! Drives one breathing session and renders every published snapshot
//! until the cycle limit, the time limit or a shutdown signal.

use std::io::{IsTerminal, Write};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::{self, Instant};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cli::args::{OutputFormat, RunArgs};
use crate::config::{Settings, load_settings};
use crate::error::PacerError;
use crate::indicator::{Indicator, IndicatorFrame};
use crate::observability::{EventEmitter, init_metrics};
use crate::phase::{CycleEngine, CycleSnapshot, EngineOptions, Phase};

const BAR_WIDTH: usize = 20;

/// Why the session loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Finish {
    Cycles,
    Duration,
    Interrupted,
}

/// One JSON output line.
#[derive(Serialize)]
struct FrameLine<'a> {
    #[serde(flatten)]
    snapshot: &'a CycleSnapshot,
    size: u32,
    next_label: Option<&'static str>,
}

/// Runs a breathing session.
///
/// # Errors
///
/// Returns an error if settings cannot be loaded, the events file cannot
/// be created, the metrics listener cannot bind, or the arguments are
/// inconsistent.
pub async fn run(args: &RunArgs, quiet: bool, cancel: CancellationToken) -> Result<(), PacerError> {
    if args.cycles == Some(0) {
        return Err(PacerError::Usage("--cycles must be at least 1".into()));
    }

    let settings = resolve_settings(args)?;

    if let Some(port) = args.metrics_port {
        init_metrics(Some(port))?;
        info!(port, "metrics endpoint listening");
    }

    let events = args
        .events_file
        .as_deref()
        .map(EventEmitter::from_file)
        .transpose()?
        .map(Arc::new);

    let engine = CycleEngine::new(EngineOptions {
        pattern: settings.pattern,
        frame_interval: settings.frame_interval,
        events,
        ..EngineOptions::default()
    });

    let mut renderer = Renderer::new(args.format, quiet, settings.indicator);
    let mut snapshots = WatchStream::new(engine.subscribe());

    let description = engine.sequencer().cycle_description(settings.pattern);
    if !quiet && args.format == OutputFormat::Human {
        println!(
            "{} ({}, {})",
            description.name,
            description.notation(),
            humantime::format_duration(Duration::from_millis(description.total_ms)),
        );
    }

    engine.start()?;
    let started = Instant::now();

    let time_limit = async {
        match args.duration {
            Some(limit) => time::sleep(limit).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(time_limit);

    let mut last = engine.snapshot();
    let finish = loop {
        tokio::select! {
            () = cancel.cancelled() => break Finish::Interrupted,
            () = &mut time_limit => break Finish::Duration,
            next = snapshots.next() => {
                let Some(snapshot) = next else {
                    break Finish::Interrupted;
                };
                renderer.render(&snapshot)?;
                if args.cycles.is_some_and(|n| snapshot.cycle >= n) {
                    break Finish::Cycles;
                }
                last = snapshot;
            }
        }
    };

    engine.stop();
    debug!(?finish, "session loop finished");
    renderer.finish(&last, started.elapsed(), finish)?;
    Ok(())
}

/// Layers CLI overrides on top of the settings file and environment.
fn resolve_settings(args: &RunArgs) -> Result<Settings, PacerError> {
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(pattern) = args.pattern {
        settings.pattern = pattern;
    }
    if let Some(interval) = args.frame_interval {
        settings.frame_interval = interval;
    }
    Ok(settings)
}

// ============================================================================
// Rendering
// ============================================================================

struct Renderer {
    format: OutputFormat,
    quiet: bool,
    indicator: Indicator,
    redraw: bool,
    last_phase: Option<Phase>,
}

impl Renderer {
    fn new(format: OutputFormat, quiet: bool, indicator: Indicator) -> Self {
        Self {
            format,
            quiet,
            indicator,
            redraw: std::io::stdout().is_terminal(),
            last_phase: None,
        }
    }

    fn render(&mut self, snapshot: &CycleSnapshot) -> Result<(), PacerError> {
        if self.quiet {
            return Ok(());
        }
        let frame = self.indicator.frame(snapshot);
        let mut out = std::io::stdout().lock();

        match self.format {
            OutputFormat::Json => {
                let line = FrameLine {
                    snapshot,
                    size: frame.size,
                    next_label: frame.next_label,
                };
                writeln!(out, "{}", serde_json::to_string(&line)?)?;
            }
            OutputFormat::Human if self.redraw => {
                write!(out, "\r{}", human_line(&frame))?;
                out.flush()?;
            }
            OutputFormat::Human => {
                // Piped output: one line per phase instead of per frame.
                if snapshot.phase != self.last_phase {
                    writeln!(out, "{}", human_line(&frame))?;
                }
            }
        }

        self.last_phase = snapshot.phase;
        Ok(())
    }

    fn finish(
        &self,
        last: &CycleSnapshot,
        elapsed: Duration,
        finish: Finish,
    ) -> Result<(), PacerError> {
        if self.quiet || self.format == OutputFormat::Json {
            return Ok(());
        }
        let mut out = std::io::stdout().lock();
        if self.redraw {
            writeln!(out)?;
        }
        let elapsed = Duration::from_millis(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));
        let reason = match finish {
            Finish::Cycles => "cycle limit reached",
            Finish::Duration => "time limit reached",
            Finish::Interrupted => "interrupted",
        };
        writeln!(
            out,
            "Session ended ({reason}) after {} cycle(s), {}",
            last.cycle,
            humantime::format_duration(elapsed)
        )?;
        Ok(())
    }
}

fn human_line(frame: &IndicatorFrame) -> String {
    let label = frame.label.unwrap_or("Ready");
    let next = frame.next_label.unwrap_or("-");
    format!(
        "{label:<7} {} {:>3}%  size {:>3}  next: {next:<7}",
        progress_bar(frame.progress),
        percent(frame.progress),
        frame.size,
    )
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn progress_bar(progress: f64) -> String {
    let filled = (progress.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percent(progress: f64) -> u8 {
    (progress.clamp(0.0, 1.0) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_bar_fills() {
        assert_eq!(progress_bar(0.0), format!("[{}]", "-".repeat(BAR_WIDTH)));
        assert_eq!(progress_bar(1.0), format!("[{}]", "#".repeat(BAR_WIDTH)));
        assert_eq!(progress_bar(0.5).matches('#').count(), BAR_WIDTH / 2);
        assert_eq!(progress_bar(7.0), progress_bar(1.0));
    }

    #[test]
    fn percent_rounds() {
        assert_eq!(percent(0.0), 0);
        assert_eq!(percent(0.499), 50);
        assert_eq!(percent(1.0), 100);
    }

    #[test]
    fn human_line_shows_label_size_and_next() {
        let frame = IndicatorFrame {
            size: 160,
            label: Some("Inhale"),
            next_label: Some("Hold"),
            progress: 0.5,
        };
        let line = human_line(&frame);
        assert!(line.starts_with("Inhale "));
        assert!(line.contains(" 50%"));
        assert!(line.contains("size 160"));
        assert!(line.contains("next: Hold"));
    }

    #[test]
    fn idle_line_reads_ready() {
        let frame = Indicator::default().frame(&CycleSnapshot::idle(crate::phase::Pattern::Box));
        assert!(human_line(&frame).starts_with("Ready"));
    }

    #[test]
    fn json_line_flattens_snapshot() {
        let snapshot = CycleSnapshot::idle(crate::phase::Pattern::Normal);
        let line = FrameLine {
            snapshot: &snapshot,
            size: 80,
            next_label: Some("Inhale"),
        };
        let value = serde_json::to_value(&line).unwrap();
        assert_eq!(value["running"], false);
        assert_eq!(value["size"], 80);
        assert_eq!(value["next_label"], "Inhale");
    }
}
