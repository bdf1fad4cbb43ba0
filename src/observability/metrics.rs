//! Metrics collection for `breathpacer`.
//!
//! Prometheus-compatible counters, gauges and histograms for breathing
//! sessions. Every label value comes from a closed enum, so label
//! cardinality is bounded by construction.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::PacerError;
use crate::phase::{Pattern, Phase};

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`. When `None`, the recorder is installed without
/// an HTTP endpoint.
///
/// # Errors
///
/// Returns `PacerError::Io` if the recorder or HTTP listener cannot be
/// installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), PacerError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| PacerError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

/// Registers metric descriptions with the global recorder.
fn describe_metrics() {
    describe_counter!(
        "breathpacer_sessions_total",
        "Total number of breathing sessions started"
    );
    describe_counter!(
        "breathpacer_phase_transitions_total",
        "Total number of phases entered"
    );
    describe_counter!(
        "breathpacer_cycles_completed_total",
        "Total number of full breathing cycles completed"
    );
    describe_counter!(
        "breathpacer_rejected_commands_total",
        "Commands rejected because a session was running"
    );
    describe_gauge!("breathpacer_running", "1 while a session is running");
    describe_histogram!(
        "breathpacer_session_duration_ms",
        "Session length in milliseconds"
    );
}

/// Records a session start.
pub fn record_session_started(pattern: Pattern) {
    counter!("breathpacer_sessions_total", "pattern" => pattern.as_str()).increment(1);
    gauge!("breathpacer_running").set(1.0);
}

/// Records a session stop and its length.
pub fn record_session_stopped(elapsed: Duration) {
    gauge!("breathpacer_running").set(0.0);
    histogram!("breathpacer_session_duration_ms").record(elapsed.as_secs_f64() * 1000.0);
}

/// Records a phase entry.
pub fn record_phase_entered(phase: Phase) {
    counter!("breathpacer_phase_transitions_total", "phase" => phase.as_str()).increment(1);
}

/// Records a completed Hold2 → Inhale wrap.
pub fn record_cycle_completed(pattern: Pattern) {
    counter!("breathpacer_cycles_completed_total", "pattern" => pattern.as_str()).increment(1);
}

/// Records a command rejected because a session was running.
pub fn record_rejected_command(operation: &'static str) {
    counter!("breathpacer_rejected_commands_total", "operation" => operation).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_functions_do_not_panic_without_recorder() {
        // metrics macros silently no-op when no global recorder is installed
        record_session_started(Pattern::Box);
        record_phase_entered(Phase::Inhale);
        record_cycle_completed(Pattern::Normal);
        record_rejected_command("set_pattern");
        record_session_stopped(Duration::from_secs(18));
    }
}
