//! `breathpacer completions <shell>`

use std::io::Write;

use clap::CommandFactory;

use crate::cli::args::{Cli, CompletionsArgs, Shell};
use crate::error::PacerError;

/// Renders the completion script for `shell`.
#[must_use]
pub fn script(shell: Shell) -> Vec<u8> {
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_owned();
    let mut out = Vec::new();
    clap_complete::generate(clap_complete::Shell::from(shell), &mut cmd, bin, &mut out);
    out
}

/// Writes the completion script to stdout.
///
/// # Errors
///
/// Returns an error if stdout is closed.
pub fn run(args: &CompletionsArgs) -> Result<(), PacerError> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&script(args.shell))?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bash_script_completes_subcommands() {
        let bash = String::from_utf8(script(Shell::Bash)).unwrap();
        assert!(bash.contains("_breathpacer()"), "got: {bash}");
        for sub in ["run", "patterns", "completions", "version"] {
            assert!(bash.contains(sub), "missing {sub}");
        }
    }

    #[test]
    fn every_shell_produces_a_script() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell, Shell::Elvish] {
            assert!(!script(shell).is_empty(), "{shell:?}");
        }
    }
}
