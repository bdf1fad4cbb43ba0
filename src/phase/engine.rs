//! Cycle engine orchestration
//!
//! The `CycleEngine` owns the single [`CycleState`] of a breathing session
//! and drives it with one background task per session. The task
//! multiplexes two independent deferred callbacks:
//!
//! - a one-shot completion timer armed at the phase's hard deadline, which
//!   is the only thing that advances the phase;
//! - a recurring frame tick that publishes eased progress while the phase
//!   is still animating.
//!
//! Every wake-up re-reads the authoritative state under the engine lock
//! and compares the session generation it was spawned with. `stop()` bumps
//! the generation, so a wake-up that raced a stop observes a stale
//! generation and leaves the state alone.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::observability::events::{Event, EventEmitter, StopReason};
use crate::observability::metrics;

use super::model::{Pattern, Phase};
use super::sequencer::PhaseSequencer;
use super::state::{ActiveRun, CycleSnapshot, CycleState};

/// Default frame cadence (roughly 60 Hz).
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Options for constructing a [`CycleEngine`].
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Phase order and duration tables.
    pub sequencer: PhaseSequencer,
    /// Initially selected pattern.
    pub pattern: Pattern,
    /// Cadence of progress frames while a phase animates.
    pub frame_interval: Duration,
    /// Optional JSONL event sink.
    pub events: Option<Arc<EventEmitter>>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            sequencer: PhaseSequencer::default(),
            pattern: Pattern::default(),
            frame_interval: DEFAULT_FRAME_INTERVAL,
            events: None,
        }
    }
}

/// State shared between the engine handle and its driver task.
struct Shared {
    sequencer: PhaseSequencer,
    frame_interval: Duration,
    state: Mutex<CycleState>,
    snapshots: watch::Sender<CycleSnapshot>,
    events: Option<Arc<EventEmitter>>,
}

/// What the driver waits for next.
struct Wait {
    phase: Phase,
    deadline: Instant,
    animating: bool,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, CycleState> {
        // CycleState has no invariants that a panicking holder could break
        // halfway, so a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, snapshot: CycleSnapshot) {
        self.snapshots.send_replace(snapshot);
    }

    fn emit(&self, event: Event) {
        if let Some(events) = &self.events {
            events.emit(event);
        }
    }

    fn emit_phase_entered(&self, run: &ActiveRun) {
        self.emit(Event::PhaseEntered {
            timestamp: Utc::now(),
            session_id: run.id,
            phase: run.phase,
            cycle: run.cycle,
            duration_ms: millis(run.phase_duration),
        });
    }

    /// Reads what the driver of `generation` should wait for, or `None`
    /// if that session is gone.
    fn next_wait(&self, generation: u64) -> Option<Wait> {
        let mut state = self.lock();
        let run = state.run_for(generation)?;
        Some(Wait {
            phase: run.phase,
            deadline: run.deadline(),
            animating: run.raw_progress_at(Instant::now()) < 1.0,
        })
    }

    /// Publishes a progress frame. Returns `false` if the session is gone.
    fn publish_frame(&self, generation: u64) -> bool {
        let state = self.lock();
        if state.generation != generation || !state.is_running() {
            return false;
        }
        self.publish(state.snapshot_at(Instant::now()));
        true
    }

    /// Publishes the outgoing `phase` at exactly 1.0 once its deadline has
    /// passed. Returns `false` if the session is gone.
    fn finish_phase(&self, generation: u64, phase: Phase) -> bool {
        let mut state = self.lock();
        let Some(run) = state.run_for(generation) else {
            debug!(generation, "stale completion timer ignored");
            return false;
        };
        if run.phase == phase && Instant::now() >= run.deadline() {
            self.publish(state.snapshot_with_progress(1.0));
        }
        true
    }

    /// Enters the phase after `phase`. Returns `false` if the session is
    /// gone.
    fn complete_phase(&self, generation: u64, phase: Phase) -> bool {
        let mut state = self.lock();
        let pattern = state.pattern;
        let Some(run) = state.run_for(generation) else {
            debug!(generation, "stale completion timer ignored");
            return false;
        };
        let deadline = run.deadline();
        if run.phase != phase || Instant::now() < deadline {
            return true;
        }

        let next = PhaseSequencer::next(phase);
        let duration = self.sequencer.duration_of(next, pattern);

        // The next phase starts at the previous deadline, not at the
        // wake-up instant, so timer latency never accumulates.
        run.enter(next, deadline, duration);
        let wrapped = phase == Phase::Hold2;
        let cycle = run.cycle;
        self.emit_phase_entered(run);

        info!(from = %phase, to = %next, cycle, "phase transition");
        metrics::record_phase_entered(next);
        if wrapped {
            metrics::record_cycle_completed(pattern);
        }

        self.publish(state.snapshot_with_progress(0.0));
        true
    }
}

/// Runs one session until its token is cancelled or its generation is
/// retired.
async fn drive(shared: Arc<Shared>, generation: u64, cancel: CancellationToken) {
    let mut frames = time::interval(shared.frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    while let Some(wait) = shared.next_wait(generation) {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = time::sleep_until(wait.deadline) => {
                if !shared.finish_phase(generation, wait.phase) {
                    break;
                }
                // Subscribers only keep the latest value; give them a turn
                // to read the 1.0 frame before the boundary replaces it.
                tokio::task::yield_now().await;
                if !shared.complete_phase(generation, wait.phase) {
                    break;
                }
                frames.reset();
            }
            _ = frames.tick(), if wait.animating => {
                if !shared.publish_frame(generation) {
                    break;
                }
            }
        }
    }

    debug!(generation, "session driver exited");
}

/// Runtime driver for guided breathing sessions.
///
/// Commands (`start`, `stop`, `set_pattern`) never block. Observers
/// either query on demand ([`snapshot`](Self::snapshot) derives progress
/// from elapsed time) or [`subscribe`](Self::subscribe) to frames and
/// phase boundaries.
///
/// Dropping the engine stops a running session.
pub struct CycleEngine {
    shared: Arc<Shared>,
}

impl CycleEngine {
    /// Creates an idle engine.
    #[must_use]
    pub fn new(options: EngineOptions) -> Self {
        let (snapshots, _) = watch::channel(CycleSnapshot::idle(options.pattern));
        // tokio's interval panics on a zero period.
        let frame_interval = options.frame_interval.max(Duration::from_millis(1));

        Self {
            shared: Arc::new(Shared {
                sequencer: options.sequencer,
                frame_interval,
                state: Mutex::new(CycleState::new(options.pattern)),
                snapshots,
                events: options.events,
            }),
        }
    }

    /// Starts a session at [`Phase::Inhale`].
    ///
    /// Returns `Ok(false)` without side effects if a session is already
    /// running.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoRuntime`] when called outside a Tokio
    /// runtime.
    pub fn start(&self) -> Result<bool, EngineError> {
        let runtime = Handle::try_current().map_err(|_| EngineError::NoRuntime)?;

        let mut state = self.shared.lock();
        if state.is_running() {
            debug!("start ignored: session already running");
            return Ok(false);
        }

        let pattern = state.pattern;
        let duration = self.shared.sequencer.duration_of(Phase::Inhale, pattern);
        state.generation = state.generation.wrapping_add(1);
        let generation = state.generation;

        let mut run = ActiveRun::new(Phase::Inhale, Instant::now(), duration);
        let cancel = run.cancel.clone();
        run.driver = Some(runtime.spawn(drive(
            Arc::clone(&self.shared),
            generation,
            cancel,
        )));

        info!(session_id = %run.id, %pattern, "breathing session started");
        metrics::record_session_started(pattern);
        metrics::record_phase_entered(Phase::Inhale);
        self.shared.emit(Event::SessionStarted {
            timestamp: Utc::now(),
            session_id: run.id,
            pattern,
        });
        self.shared.emit_phase_entered(&run);

        state.run = Some(run);
        self.shared.publish(state.snapshot_with_progress(0.0));
        Ok(true)
    }

    /// Stops the running session and returns to idle.
    ///
    /// Pending frame and completion callbacks are cancelled before the
    /// state changes; nothing mutates the state after this returns.
    /// Returns `false` if the engine was already idle.
    pub fn stop(&self) -> bool {
        self.stop_with(StopReason::Requested)
    }

    fn stop_with(&self, reason: StopReason) -> bool {
        let mut state = self.shared.lock();
        let Some(run) = state.run.as_mut() else {
            debug!("stop ignored: engine idle");
            return false;
        };
        run.cancel();

        let elapsed = run.started_at.elapsed();
        let session_id = run.id;
        let cycles = run.cycle;

        state.run = None;
        state.generation = state.generation.wrapping_add(1);

        info!(%session_id, cycles, ?reason, "breathing session stopped");
        metrics::record_session_stopped(elapsed);
        self.shared.emit(Event::SessionStopped {
            timestamp: Utc::now(),
            session_id,
            reason,
            cycles,
            elapsed_ms: millis(elapsed),
        });

        self.shared.publish(state.snapshot_at(Instant::now()));
        true
    }

    /// Selects the pattern used by the next session.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Busy`] while a session is running; the
    /// selection is left unchanged.
    pub fn set_pattern(&self, pattern: Pattern) -> Result<(), EngineError> {
        let mut state = self.shared.lock();
        if state.is_running() {
            warn!(requested = %pattern, "pattern change rejected: session running");
            metrics::record_rejected_command("set_pattern");
            return Err(EngineError::Busy {
                operation: "set_pattern",
            });
        }

        let previous = state.pattern;
        if previous == pattern {
            return Ok(());
        }
        state.pattern = pattern;

        info!(from = %previous, to = %pattern, "pattern changed");
        self.shared.emit(Event::PatternChanged {
            timestamp: Utc::now(),
            from: previous,
            to: pattern,
        });
        self.shared.publish(state.snapshot_at(Instant::now()));
        Ok(())
    }

    /// Switches between the two presets and returns the new selection.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Busy`] while a session is running.
    pub fn toggle_pattern(&self) -> Result<Pattern, EngineError> {
        let next = self.pattern().toggled();
        self.set_pattern(next).map(|()| next)
    }

    /// Current observable state, with progress computed from elapsed time.
    #[must_use]
    pub fn snapshot(&self) -> CycleSnapshot {
        self.shared.lock().snapshot_at(Instant::now())
    }

    /// Subscribes to published snapshots.
    ///
    /// The receiver sees every phase boundary and, while a phase animates,
    /// one snapshot per frame. Intermediate values may be coalesced.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CycleSnapshot> {
        self.shared.snapshots.subscribe()
    }

    /// Active phase, `None` when idle.
    #[must_use]
    pub fn current_phase(&self) -> Option<Phase> {
        self.shared.lock().run.as_ref().map(|run| run.phase)
    }

    /// Eased progress of the active phase, `0.0` when idle.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.shared
            .lock()
            .run
            .as_ref()
            .map_or(0.0, |run| run.progress_at(Instant::now()))
    }

    /// Whether a session is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.lock().is_running()
    }

    /// Selected pattern.
    #[must_use]
    pub fn pattern(&self) -> Pattern {
        self.shared.lock().pattern
    }

    /// Whether the box pattern is selected.
    #[must_use]
    pub fn is_box_mode(&self) -> bool {
        self.pattern() == Pattern::Box
    }

    /// The sequencer this engine consults.
    #[must_use]
    pub fn sequencer(&self) -> &PhaseSequencer {
        &self.shared.sequencer
    }

    /// Cadence of progress frames.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        self.shared.frame_interval
    }
}

impl Default for CycleEngine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

impl Drop for CycleEngine {
    fn drop(&mut self) {
        self.stop_with(StopReason::Dropped);
    }
}

impl std::fmt::Debug for CycleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("CycleEngine")
            .field("pattern", &state.pattern)
            .field("running", &state.is_running())
            .field("phase", &state.run.as_ref().map(|run| run.phase))
            .finish_non_exhaustive()
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
