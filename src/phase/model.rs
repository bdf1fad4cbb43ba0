//! Phase, pattern and duration-table types.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One stage of the breathing cycle.
///
/// The order of declaration is the order of the cycle; `Hold2` wraps
/// back to `Inhale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Breathing in; the indicator grows.
    Inhale,
    /// Hold with full lungs.
    Hold1,
    /// Breathing out; the indicator shrinks.
    Exhale,
    /// Hold with empty lungs.
    Hold2,
}

impl Phase {
    /// All phases in cycle order.
    pub const ALL: [Self; 4] = [Self::Inhale, Self::Hold1, Self::Exhale, Self::Hold2];

    /// Stable machine name (`inhale`, `hold1`, `exhale`, `hold2`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inhale => "inhale",
            Self::Hold1 => "hold1",
            Self::Exhale => "exhale",
            Self::Hold2 => "hold2",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Built-in breathing pattern selector.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Pattern {
    /// Inhale 4s, hold 4s, exhale 6s, hold 4s.
    #[default]
    Normal,
    /// Four equal 4s sides.
    Box,
}

impl Pattern {
    /// All built-in patterns.
    pub const ALL: [Self; 2] = [Self::Normal, Self::Box];

    /// Stable machine name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Box => "box",
        }
    }

    /// Human-readable mode name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Normal => "Normal Breathing",
            Self::Box => "Box Breathing",
        }
    }

    /// The other built-in pattern.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Normal => Self::Box,
            Self::Box => Self::Normal,
        }
    }

    /// Suggest a pattern name for a mistyped input.
    ///
    /// Returns the closest match if its Damerau-Levenshtein distance is ≤ 3.
    #[must_use]
    pub fn suggest(input: &str) -> Option<String> {
        let input = input.to_ascii_lowercase();
        Self::ALL
            .iter()
            .map(|p| (p.as_str(), strsim::damerau_levenshtein(&input, p.as_str())))
            .filter(|(_, dist)| *dist <= 3)
            .min_by_key(|(_, dist)| *dist)
            .map(|(name, _)| name.to_string())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Pattern {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "box" => Ok(Self::Box),
            _ => Err(ConfigError::UnknownPattern {
                name: s.to_string(),
                suggestion: Self::suggest(s.trim()),
            }),
        }
    }
}

/// Immutable mapping from [`Phase`] to a positive duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternConfig {
    inhale: Duration,
    hold1: Duration,
    exhale: Duration,
    hold2: Duration,
}

impl PatternConfig {
    /// The "normal" preset: 4s, 4s, 6s, 4s.
    pub const NORMAL: Self = Self {
        inhale: Duration::from_millis(4000),
        hold1: Duration::from_millis(4000),
        exhale: Duration::from_millis(6000),
        hold2: Duration::from_millis(4000),
    };

    /// The "box" preset: 4s on every side.
    pub const BOX: Self = Self {
        inhale: Duration::from_millis(4000),
        hold1: Duration::from_millis(4000),
        exhale: Duration::from_millis(4000),
        hold2: Duration::from_millis(4000),
    };

    /// Builds a table from millisecond values in cycle order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDuration`] for the first phase whose
    /// value is zero or negative.
    pub fn from_millis(inhale: i64, hold1: i64, exhale: i64, hold2: i64) -> Result<Self, ConfigError> {
        let positive = |phase: Phase, value_ms: i64| {
            u64::try_from(value_ms)
                .ok()
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .ok_or(ConfigError::InvalidDuration { phase, value_ms })
        };

        Ok(Self {
            inhale: positive(Phase::Inhale, inhale)?,
            hold1: positive(Phase::Hold1, hold1)?,
            exhale: positive(Phase::Exhale, exhale)?,
            hold2: positive(Phase::Hold2, hold2)?,
        })
    }

    /// Returns the built-in table for a preset.
    #[must_use]
    pub const fn preset(pattern: Pattern) -> Self {
        match pattern {
            Pattern::Normal => Self::NORMAL,
            Pattern::Box => Self::BOX,
        }
    }

    /// Checks that every phase has a non-zero duration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDuration`] for the first zero entry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for phase in Phase::ALL {
            if self.duration(phase).is_zero() {
                return Err(ConfigError::InvalidDuration { phase, value_ms: 0 });
            }
        }
        Ok(())
    }

    /// Duration of a single phase.
    #[must_use]
    pub const fn duration(&self, phase: Phase) -> Duration {
        match phase {
            Phase::Inhale => self.inhale,
            Phase::Hold1 => self.hold1,
            Phase::Exhale => self.exhale,
            Phase::Hold2 => self.hold2,
        }
    }

    /// Length of one full cycle.
    #[must_use]
    pub fn total(&self) -> Duration {
        Phase::ALL.iter().map(|p| self.duration(*p)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_serializes_lowercase() {
        let json = serde_json::to_string(&Phase::Hold1).unwrap();
        assert_eq!(json, "\"hold1\"");
        let back: Phase = serde_json::from_str("\"hold2\"").unwrap();
        assert_eq!(back, Phase::Hold2);
    }

    #[test]
    fn presets_match_documented_durations() {
        let normal = PatternConfig::preset(Pattern::Normal);
        assert_eq!(normal.duration(Phase::Inhale), Duration::from_millis(4000));
        assert_eq!(normal.duration(Phase::Hold1), Duration::from_millis(4000));
        assert_eq!(normal.duration(Phase::Exhale), Duration::from_millis(6000));
        assert_eq!(normal.duration(Phase::Hold2), Duration::from_millis(4000));
        assert_eq!(normal.total(), Duration::from_secs(18));

        let boxed = PatternConfig::preset(Pattern::Box);
        for phase in Phase::ALL {
            assert_eq!(boxed.duration(phase), Duration::from_millis(4000));
        }
        assert_eq!(boxed.total(), Duration::from_secs(16));
    }

    #[test]
    fn from_millis_rejects_zero() {
        let err = PatternConfig::from_millis(4000, 0, 4000, 4000).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidDuration {
                phase: Phase::Hold1,
                value_ms: 0
            }
        ));
    }

    #[test]
    fn from_millis_rejects_negative() {
        let err = PatternConfig::from_millis(4000, 4000, 4000, -1).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidDuration {
                phase: Phase::Hold2,
                value_ms: -1
            }
        ));
    }

    #[test]
    fn from_millis_accepts_positive() {
        let config = PatternConfig::from_millis(4000, 4000, 6000, 4000).unwrap();
        assert_eq!(config, PatternConfig::NORMAL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_entry() {
        let config = PatternConfig {
            exhale: Duration::ZERO,
            ..PatternConfig::BOX
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidDuration {
                phase: Phase::Exhale,
                ..
            }
        ));
    }

    #[test]
    fn pattern_parses_case_insensitively() {
        assert_eq!("BOX".parse::<Pattern>().unwrap(), Pattern::Box);
        assert_eq!(" normal ".parse::<Pattern>().unwrap(), Pattern::Normal);
    }

    #[test]
    fn pattern_parse_suggests_close_names() {
        let err = "boxx".parse::<Pattern>().unwrap_err();
        match err {
            ConfigError::UnknownPattern { name, suggestion } => {
                assert_eq!(name, "boxx");
                assert_eq!(suggestion.as_deref(), Some("box"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn pattern_suggest_ignores_distant_input() {
        assert!(Pattern::suggest("completely-different").is_none());
    }

    #[test]
    fn pattern_toggles_between_presets() {
        assert_eq!(Pattern::Normal.toggled(), Pattern::Box);
        assert_eq!(Pattern::Box.toggled(), Pattern::Normal);
        assert_eq!(Pattern::default(), Pattern::Normal);
    }
}
