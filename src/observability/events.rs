//! Structured event stream for `breathpacer`.
//!
//! Discrete, typed session events serialized as newline-delimited JSON
//! (JSONL), each carrying a monotonically increasing sequence number.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::phase::{Pattern, Phase};

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event emitted by the cycle engine.
///
/// Tagged with `"type"` when serialized so consumers can dispatch on the
/// event kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A breathing session has started.
    SessionStarted {
        /// When the session started.
        timestamp: DateTime<Utc>,
        /// Session identifier.
        session_id: Uuid,
        /// Pattern the session runs.
        pattern: Pattern,
    },

    /// A phase has been entered.
    PhaseEntered {
        /// When the phase began.
        timestamp: DateTime<Utc>,
        /// Session identifier.
        session_id: Uuid,
        /// The phase entered.
        phase: Phase,
        /// Completed cycles so far.
        cycle: u64,
        /// Phase length in milliseconds.
        duration_ms: u64,
    },

    /// A breathing session has stopped.
    SessionStopped {
        /// When the session stopped.
        timestamp: DateTime<Utc>,
        /// Session identifier.
        session_id: Uuid,
        /// Why it stopped.
        reason: StopReason,
        /// Completed cycles.
        cycles: u64,
        /// Session length in milliseconds.
        elapsed_ms: u64,
    },

    /// The selected pattern changed while idle.
    PatternChanged {
        /// When the change happened.
        timestamp: DateTime<Utc>,
        /// Previous pattern.
        from: Pattern,
        /// New pattern.
        to: Pattern,
    },
}

/// Reason a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// `stop()` was called.
    Requested,
    /// The engine was dropped with a session still running.
    Dropped,
}

// ---------------------------------------------------------------------------
// Envelope (adds sequence number via serde flatten)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct EventEnvelope {
    sequence: u64,
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Each call to [`emit`](Self::emit) increments the sequence counter,
/// writes the event as one JSON line and flushes. Serialization or I/O
/// failures are dropped; event output never interrupts a session.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: Event) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence: seq,
            event,
        };

        if let Ok(mut w) = self.writer.lock() {
            if let Ok(line) = serde_json::to_string(&envelope) {
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
        }
    }

    /// Returns the number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
