//! Easing and elapsed-time progress.

use std::f64::consts::PI;
use std::time::Duration;

/// Sinusoidal ease-in-out over `[0, 1]`.
///
/// `-(cos(π·t) - 1) / 2`. Input outside the unit interval is clamped, so
/// the result is always within `[0, 1]` and exactly `1.0` at `t >= 1`.
#[must_use]
pub fn ease_in_out_sine(t: f64) -> f64 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    -((PI * t).cos() - 1.0) / 2.0
}

/// Linear fraction of `duration` covered by `elapsed`, clamped to `[0, 1]`.
///
/// A zero `duration` counts as already complete.
#[must_use]
pub fn raw_progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

/// Eased progress for `elapsed` time into a phase of length `duration`.
#[must_use]
pub fn eased_progress(elapsed: Duration, duration: Duration) -> f64 {
    ease_in_out_sine(raw_progress(elapsed, duration))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn endpoints_are_exact() {
        assert!(ease_in_out_sine(0.0).abs() < f64::EPSILON);
        assert!((ease_in_out_sine(1.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn midpoint_is_half() {
        assert!((ease_in_out_sine(0.5) - 0.5).abs() < EPSILON);
    }

    #[test]
    fn out_of_range_input_is_clamped() {
        assert!(ease_in_out_sine(-3.0).abs() < f64::EPSILON);
        assert!((ease_in_out_sine(7.0) - 1.0).abs() < f64::EPSILON);
        assert!(ease_in_out_sine(f64::NAN).abs() < f64::EPSILON);
    }

    #[test]
    fn raw_progress_clamps_past_deadline() {
        let d = Duration::from_millis(4000);
        assert!(raw_progress(Duration::ZERO, d).abs() < f64::EPSILON);
        assert!((raw_progress(Duration::from_millis(1000), d) - 0.25).abs() < EPSILON);
        assert!((raw_progress(Duration::from_millis(9000), d) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_duration_is_complete() {
        assert!((raw_progress(Duration::ZERO, Duration::ZERO) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn eased_progress_reaches_one_at_deadline() {
        let d = Duration::from_millis(6000);
        assert!((eased_progress(d, d) - 1.0).abs() < f64::EPSILON);
    }

    proptest! {
        #[test]
        fn monotonically_non_decreasing(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(ease_in_out_sine(lo) <= ease_in_out_sine(hi) + EPSILON);
        }

        #[test]
        fn symmetric_about_midpoint(t in 0.0f64..=1.0) {
            let sum = ease_in_out_sine(t) + ease_in_out_sine(1.0 - t);
            prop_assert!((sum - 1.0).abs() < EPSILON);
        }

        #[test]
        fn stays_within_unit_interval(t in -10.0f64..10.0) {
            let v = ease_in_out_sine(t);
            prop_assert!((0.0..=1.0).contains(&v));
        }
    }
}
