//! Command-line interface
//!
//! Argument definitions and command handlers for the `breathpacer` binary.

pub mod args;
pub mod commands;
