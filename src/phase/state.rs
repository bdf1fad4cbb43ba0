//! Cycle state representation.
//!
//! [`CycleState`] is owned by exactly one engine and only touched while
//! holding the engine lock. "Running" is modelled structurally: the phase,
//! phase timing and task handles exist only inside [`ActiveRun`], so an
//! idle state cannot carry a stale phase or progress value.

use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::easing::{eased_progress, raw_progress};
use super::model::{Pattern, Phase};
use super::sequencer::PhaseSequencer;

/// Observable state published to consumers on every frame and boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleSnapshot {
    /// Active phase, `None` when idle.
    pub phase: Option<Phase>,
    /// Display label of the active phase.
    pub label: Option<&'static str>,
    /// Phase that follows the active one.
    pub next_phase: Option<Phase>,
    /// Eased fraction of the active phase, `0.0` when idle.
    pub progress: f64,
    /// Whether a session is running.
    pub running: bool,
    /// Selected pattern.
    pub pattern: Pattern,
    /// Whether the selected pattern is `Box`.
    pub is_box_mode: bool,
    /// Completed cycles in the current session.
    pub cycle: u64,
}

impl CycleSnapshot {
    /// Snapshot of an idle engine.
    #[must_use]
    pub const fn idle(pattern: Pattern) -> Self {
        Self {
            phase: None,
            label: None,
            next_phase: None,
            progress: 0.0,
            running: false,
            pattern,
            is_box_mode: matches!(pattern, Pattern::Box),
            cycle: 0,
        }
    }
}

/// Bookkeeping for one running session.
#[derive(Debug)]
pub(crate) struct ActiveRun {
    /// Session identifier for events.
    pub id: Uuid,
    /// When the session started.
    pub started_at: Instant,
    /// Active phase.
    pub phase: Phase,
    /// Instant the active phase was entered (its deadline base).
    pub phase_started_at: Instant,
    /// Length of the active phase.
    pub phase_duration: Duration,
    /// Completed Hold2 → Inhale wraps.
    pub cycle: u64,
    /// Cancels the session's driver task.
    pub cancel: CancellationToken,
    /// Driver task handle, set right after spawning.
    pub driver: Option<JoinHandle<()>>,
}

impl ActiveRun {
    pub fn new(phase: Phase, now: Instant, phase_duration: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: now,
            phase,
            phase_started_at: now,
            phase_duration,
            cycle: 0,
            cancel: CancellationToken::new(),
            driver: None,
        }
    }

    /// Hard deadline of the active phase.
    pub fn deadline(&self) -> Instant {
        self.phase_started_at + self.phase_duration
    }

    /// Linear progress of the active phase at `now`.
    pub fn raw_progress_at(&self, now: Instant) -> f64 {
        raw_progress(now.saturating_duration_since(self.phase_started_at), self.phase_duration)
    }

    /// Eased progress of the active phase at `now`.
    pub fn progress_at(&self, now: Instant) -> f64 {
        eased_progress(now.saturating_duration_since(self.phase_started_at), self.phase_duration)
    }

    /// Enters `phase` at `at`, which becomes the base of its deadline.
    pub fn enter(&mut self, phase: Phase, at: Instant, duration: Duration) {
        if self.phase == Phase::Hold2 && phase == Phase::Inhale {
            self.cycle += 1;
        }
        self.phase = phase;
        self.phase_started_at = at;
        self.phase_duration = duration;
    }

    /// Cancels the token and aborts the driver task.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
    }
}

/// Engine-owned mutable state.
#[derive(Debug)]
pub(crate) struct CycleState {
    /// Selected pattern; only changes while idle.
    pub pattern: Pattern,
    /// Bumped on every start and stop. A driver whose generation no
    /// longer matches must not touch the state.
    pub generation: u64,
    /// `Some` while running.
    pub run: Option<ActiveRun>,
}

impl CycleState {
    pub const fn new(pattern: Pattern) -> Self {
        Self {
            pattern,
            generation: 0,
            run: None,
        }
    }

    pub const fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Returns the active run if it belongs to `generation`.
    pub fn run_for(&mut self, generation: u64) -> Option<&mut ActiveRun> {
        if self.generation == generation {
            self.run.as_mut()
        } else {
            None
        }
    }

    /// Snapshot with progress derived from elapsed time at `now`.
    pub fn snapshot_at(&self, now: Instant) -> CycleSnapshot {
        self.run.as_ref().map_or_else(
            || CycleSnapshot::idle(self.pattern),
            |run| self.running_snapshot(run, run.progress_at(now)),
        )
    }

    /// Snapshot with an explicit progress value, used at phase boundaries.
    pub fn snapshot_with_progress(&self, progress: f64) -> CycleSnapshot {
        self.run.as_ref().map_or_else(
            || CycleSnapshot::idle(self.pattern),
            |run| self.running_snapshot(run, progress),
        )
    }

    fn running_snapshot(&self, run: &ActiveRun, progress: f64) -> CycleSnapshot {
        CycleSnapshot {
            phase: Some(run.phase),
            label: Some(PhaseSequencer::label(run.phase)),
            next_phase: Some(PhaseSequencer::next(run.phase)),
            progress,
            running: true,
            pattern: self.pattern,
            is_box_mode: matches!(self.pattern, Pattern::Box),
            cycle: run.cycle,
        }
    }
}
