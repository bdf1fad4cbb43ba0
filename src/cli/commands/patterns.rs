//! `breathpacer patterns`
//!
//! Lists the breathing patterns with their phase timings. Every figure is
//! derived from the preset duration tables.

use crate::cli::args::{OutputFormat, PatternsArgs};
use crate::config::load_settings;
use crate::error::PacerError;
use crate::phase::{CycleDescription, Pattern, PhaseSequencer};

/// Prints the pattern catalogue.
///
/// # Errors
///
/// Returns an error if the settings cannot be loaded or serialized.
pub fn run(args: &PatternsArgs) -> Result<(), PacerError> {
    let settings = load_settings(args.config.as_deref())?;
    let descriptions = describe_all(&PhaseSequencer::default());

    match args.format {
        OutputFormat::Human => {
            for description in &descriptions {
                print!("{}", render_human(description, description.pattern == settings.pattern));
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&descriptions)?);
        }
    }
    Ok(())
}

/// Descriptions of every built-in pattern, in declaration order.
#[must_use]
pub fn describe_all(sequencer: &PhaseSequencer) -> Vec<CycleDescription> {
    Pattern::ALL
        .iter()
        .map(|&pattern| sequencer.cycle_description(pattern))
        .collect()
}

fn render_human(description: &CycleDescription, selected: bool) -> String {
    use std::fmt::Write;

    let marker = if selected { '*' } else { ' ' };
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{marker} {:<7} {:<17} {}  ({:.1} breaths/min)",
        description.pattern,
        description.name,
        description.notation(),
        description.breaths_per_minute(),
    );
    for step in &description.phases {
        let _ = writeln!(
            out,
            "      {:<7} {:<7} {:>6}ms",
            step.phase, step.label, step.duration_ms
        );
    }
    out
}
