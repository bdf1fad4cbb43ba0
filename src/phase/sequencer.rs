//! Ordered, wrapping phase sequence and per-pattern duration lookup.

use std::time::Duration;

use serde::Serialize;

use crate::error::ConfigError;

use super::model::{Pattern, PatternConfig, Phase};

/// Owns the cyclic phase order and the duration tables of both presets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseSequencer {
    normal: PatternConfig,
    boxed: PatternConfig,
}

impl Default for PhaseSequencer {
    fn default() -> Self {
        Self {
            normal: PatternConfig::preset(Pattern::Normal),
            boxed: PatternConfig::preset(Pattern::Box),
        }
    }
}

impl PhaseSequencer {
    /// Creates a sequencer with explicit tables for both presets.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDuration`] if either table has a
    /// zero-length phase.
    pub fn new(normal: PatternConfig, boxed: PatternConfig) -> Result<Self, ConfigError> {
        normal.validate()?;
        boxed.validate()?;
        Ok(Self { normal, boxed })
    }

    /// Returns the duration table for a pattern.
    #[must_use]
    pub const fn table(&self, pattern: Pattern) -> &PatternConfig {
        match pattern {
            Pattern::Normal => &self.normal,
            Pattern::Box => &self.boxed,
        }
    }

    /// How long `phase` lasts under `pattern`.
    #[must_use]
    pub const fn duration_of(&self, phase: Phase, pattern: Pattern) -> Duration {
        self.table(pattern).duration(phase)
    }

    /// The phase that follows `phase`.
    #[must_use]
    pub const fn next(phase: Phase) -> Phase {
        match phase {
            Phase::Inhale => Phase::Hold1,
            Phase::Hold1 => Phase::Exhale,
            Phase::Exhale => Phase::Hold2,
            Phase::Hold2 => Phase::Inhale,
        }
    }

    /// Display label; both holds read "Hold".
    #[must_use]
    pub const fn label(phase: Phase) -> &'static str {
        match phase {
            Phase::Inhale => "Inhale",
            Phase::Hold1 | Phase::Hold2 => "Hold",
            Phase::Exhale => "Exhale",
        }
    }

    /// Summary of one full cycle under `pattern`.
    #[must_use]
    pub fn cycle_description(&self, pattern: Pattern) -> CycleDescription {
        let table = self.table(pattern);
        let phases = Phase::ALL
            .iter()
            .map(|&phase| PhaseStep {
                phase,
                label: Self::label(phase),
                duration_ms: duration_ms(table.duration(phase)),
            })
            .collect();

        CycleDescription {
            pattern,
            name: pattern.display_name(),
            phases,
            total_ms: duration_ms(table.total()),
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// One entry of a [`CycleDescription`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseStep {
    /// The phase.
    pub phase: Phase,
    /// Display label.
    pub label: &'static str,
    /// Phase length in milliseconds.
    pub duration_ms: u64,
}

/// Derived description of a pattern's cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleDescription {
    /// Pattern being described.
    pub pattern: Pattern,
    /// Human-readable pattern name.
    pub name: &'static str,
    /// Steps in cycle order.
    pub phases: Vec<PhaseStep>,
    /// Total cycle length in milliseconds.
    pub total_ms: u64,
}

impl CycleDescription {
    /// Compact notation in seconds, e.g. `4-4-6-4`.
    ///
    /// Fractional seconds keep one decimal place.
    #[must_use]
    pub fn notation(&self) -> String {
        self.phases
            .iter()
            .map(|step| format_seconds(step.duration_ms))
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Breaths per minute at this pattern's pace.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn breaths_per_minute(&self) -> f64 {
        if self.total_ms == 0 {
            return 0.0;
        }
        60_000.0 / self.total_ms as f64
    }
}

#[allow(clippy::cast_precision_loss)]
fn format_seconds(ms: u64) -> String {
    if ms % 1000 == 0 {
        (ms / 1000).to_string()
    } else {
        format!("{:.1}", ms as f64 / 1000.0)
    }
}
