//! `breathpacer` - guided breathing pacer
//!
//! A timer-driven cycle engine that walks through inhale, hold, exhale and
//! hold phases, publishes eased progress for animation, and exposes the
//! state to any consumer through queries and a watch channel.

pub mod cli;
pub mod config;
pub mod error;
pub mod indicator;
pub mod observability;
pub mod phase;
