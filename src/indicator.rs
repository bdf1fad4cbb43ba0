//! Circle indicator geometry.
//!
//! Maps a phase and its eased progress to the diameter of the breathing
//! circle. The circle grows while inhaling, stays full on the first hold,
//! shrinks while exhaling and stays small on the second hold.

use serde::Serialize;

use crate::error::ConfigError;
use crate::phase::{CycleSnapshot, Phase, PhaseSequencer};

/// Default smallest circle diameter.
pub const DEFAULT_MIN_SIZE: u32 = 80;

/// Default largest circle diameter.
pub const DEFAULT_MAX_SIZE: u32 = 240;

/// Size bounds of the breathing circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indicator {
    min_size: u32,
    max_size: u32,
}

impl Default for Indicator {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_SIZE,
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}

/// What a display renders for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorFrame {
    /// Circle diameter, rounded to whole units.
    pub size: u32,
    /// Label of the active phase, `None` when idle.
    pub label: Option<&'static str>,
    /// Label of the phase shown as "next".
    pub next_label: Option<&'static str>,
    /// Eased progress in `[0, 1]`.
    pub progress: f64,
}

impl Indicator {
    /// Creates an indicator with explicit bounds.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` unless `0 < min_size < max_size`.
    pub fn new(min_size: u32, max_size: u32) -> Result<Self, ConfigError> {
        if min_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "indicator.min_size".into(),
                value: min_size.to_string(),
                expected: "a positive size".into(),
            });
        }
        if max_size <= min_size {
            return Err(ConfigError::InvalidValue {
                field: "indicator.max_size".into(),
                value: max_size.to_string(),
                expected: format!("a size greater than min_size ({min_size})"),
            });
        }
        Ok(Self { min_size, max_size })
    }

    /// Smallest diameter.
    #[must_use]
    pub const fn min_size(&self) -> u32 {
        self.min_size
    }

    /// Largest diameter.
    #[must_use]
    pub const fn max_size(&self) -> u32 {
        self.max_size
    }

    /// Unrounded diameter for `phase` at eased `progress`.
    ///
    /// `None` (idle) renders at the minimum size.
    #[must_use]
    pub fn size(&self, phase: Option<Phase>, progress: f64) -> f64 {
        let min = f64::from(self.min_size);
        let max = f64::from(self.max_size);
        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };

        match phase {
            Some(Phase::Inhale) => (max - min).mul_add(progress, min),
            Some(Phase::Hold1) => max,
            Some(Phase::Exhale) => (min - max).mul_add(progress, max),
            Some(Phase::Hold2) | None => min,
        }
    }

    /// Renders a snapshot.
    #[must_use]
    pub fn frame(&self, snapshot: &CycleSnapshot) -> IndicatorFrame {
        // Idle previews the phase a start would enter.
        let next = snapshot.next_phase.unwrap_or(Phase::Inhale);

        IndicatorFrame {
            size: round_size(self.size(snapshot.phase, snapshot.progress)),
            label: snapshot.label,
            next_label: Some(PhaseSequencer::label(next)),
            progress: snapshot.progress,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_size(size: f64) -> u32 {
    // size is already clamped to the u32 bounds it was computed from.
    size.round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::Pattern;
    use proptest::prelude::*;

    #[test]
    fn default_bounds() {
        let ind = Indicator::default();
        assert_eq!(ind.min_size(), 80);
        assert_eq!(ind.max_size(), 240);
    }

    #[test]
    fn new_rejects_bad_bounds() {
        assert!(Indicator::new(0, 100).is_err());
        assert!(Indicator::new(100, 100).is_err());
        assert!(Indicator::new(120, 100).is_err());
        assert!(Indicator::new(10, 20).is_ok());
    }

    #[test]
    fn inhale_grows_and_exhale_shrinks() {
        let ind = Indicator::default();
        assert!((ind.size(Some(Phase::Inhale), 0.0) - 80.0).abs() < f64::EPSILON);
        assert!((ind.size(Some(Phase::Inhale), 0.5) - 160.0).abs() < 1e-9);
        assert!((ind.size(Some(Phase::Inhale), 1.0) - 240.0).abs() < f64::EPSILON);

        assert!((ind.size(Some(Phase::Exhale), 0.0) - 240.0).abs() < f64::EPSILON);
        assert!((ind.size(Some(Phase::Exhale), 1.0) - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn holds_and_idle_are_flat() {
        let ind = Indicator::default();
        for p in [0.0, 0.3, 1.0] {
            assert!((ind.size(Some(Phase::Hold1), p) - 240.0).abs() < f64::EPSILON);
            assert!((ind.size(Some(Phase::Hold2), p) - 80.0).abs() < f64::EPSILON);
            assert!((ind.size(None, p) - 80.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn out_of_range_progress_is_clamped() {
        let ind = Indicator::default();
        assert!((ind.size(Some(Phase::Inhale), 2.0) - 240.0).abs() < f64::EPSILON);
        assert!((ind.size(Some(Phase::Inhale), -1.0) - 80.0).abs() < f64::EPSILON);
        assert!((ind.size(Some(Phase::Inhale), f64::NAN) - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn idle_frame_previews_inhale() {
        let frame = Indicator::default().frame(&CycleSnapshot::idle(Pattern::Normal));
        assert_eq!(frame.size, 80);
        assert_eq!(frame.label, None);
        assert_eq!(frame.next_label, Some("Inhale"));
    }

    #[test]
    fn running_frame_rounds_size() {
        let snapshot = CycleSnapshot {
            phase: Some(Phase::Exhale),
            label: Some("Exhale"),
            next_phase: Some(Phase::Hold2),
            progress: 0.25,
            running: true,
            pattern: Pattern::Normal,
            is_box_mode: false,
            cycle: 0,
        };
        let frame = Indicator::default().frame(&snapshot);
        assert_eq!(frame.size, 200);
        assert_eq!(frame.next_label, Some("Hold"));
    }

    proptest! {
        #[test]
        fn size_stays_within_bounds(idx in 0usize..4, p in -1.0f64..2.0) {
            let ind = Indicator::default();
            let s = ind.size(Some(Phase::ALL[idx]), p);
            prop_assert!((80.0..=240.0).contains(&s));
        }

        #[test]
        fn inhale_is_monotone(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let ind = Indicator::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(ind.size(Some(Phase::Inhale), lo) <= ind.size(Some(Phase::Inhale), hi));
        }
    }
}
