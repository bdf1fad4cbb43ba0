//! Configuration module
//!
//! Loads the optional YAML settings file, validates it and applies
//! environment overrides.

pub mod loader;
pub mod schema;

pub use loader::{
    CONFIG_ENV, PATTERN_ENV, apply_env_overrides, load_file, load_settings, load_settings_with,
    parse_frame_interval, parse_settings,
};
pub use schema::{RawIndicator, RawSettings, Settings};
