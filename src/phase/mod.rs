//! Breathing phase model and cycle engine.
//!
//! - [`model`]: phases, patterns and per-pattern duration tables
//! - [`sequencer`]: phase order, labels and cycle descriptions
//! - [`easing`]: the ease-in-out sine curve applied to phase progress
//! - [`state`]: engine-owned session state and published snapshots
//! - [`engine`]: the timer-driven [`CycleEngine`]

pub mod easing;
pub mod engine;
pub mod model;
pub mod sequencer;
pub mod state;

pub use easing::{ease_in_out_sine, eased_progress, raw_progress};
pub use engine::{CycleEngine, DEFAULT_FRAME_INTERVAL, EngineOptions};
pub use model::{Pattern, PatternConfig, Phase};
pub use sequencer::{CycleDescription, PhaseSequencer, PhaseStep};
pub use state::CycleSnapshot;
