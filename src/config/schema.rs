//! Settings schema
//!
//! [`RawSettings`] mirrors the YAML file one-to-one; every field is
//! optional so a partial file only overrides what it names. The loader
//! validates it into [`Settings`].
//!
//! ```yaml
//! pattern: box
//! frame_interval: 16ms
//! indicator:
//!   min_size: 80
//!   max_size: 240
//! ```
//!
//! Phase durations are fixed by the two presets and are not part of the
//! file.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::indicator::Indicator;
use crate::phase::{DEFAULT_FRAME_INTERVAL, Pattern};

// ============================================================================
// Raw (as written)
// ============================================================================

/// Settings file contents before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSettings {
    /// Pattern selected at startup (`normal` or `box`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Frame cadence as a humantime string, e.g. `16ms`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_interval: Option<String>,

    /// Circle size bounds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicator: Option<RawIndicator>,
}

/// `indicator` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawIndicator {
    /// Smallest circle diameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_size: Option<u32>,

    /// Largest circle diameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u32>,
}

// ============================================================================
// Validated
// ============================================================================

/// Validated runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Pattern selected at startup.
    pub pattern: Pattern,
    /// Frame cadence.
    pub frame_interval: Duration,
    /// Circle size bounds.
    pub indicator: Indicator,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pattern: Pattern::default(),
            frame_interval: DEFAULT_FRAME_INTERVAL,
            indicator: Indicator::default(),
        }
    }
}
