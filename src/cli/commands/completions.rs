//! Shell completions command implementation.

use crate::cli::{Cli, Shell};
use crate::error::Result;
use clap::CommandFactory;
use std::io::{self, Write};

impl From<&Shell> for clap_complete::Shell {
    fn from(shell: &Shell) -> Self {
        match shell {
            Shell::Bash => Self::Bash,
            Shell::Zsh => Self::Zsh,
            Shell::Fish => Self::Fish,
            Shell::PowerShell => Self::PowerShell,
            Shell::Elvish => Self::Elvish,
        }
    }
}

fn render(shell: &Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(clap_complete::Shell::from(shell), &mut cmd, name, out);
}

/// Write the completion script for `shell` to stdout.
///
/// # Errors
///
/// Infallible today; kept as `Result` to match the other commands.
pub fn execute(shell: &Shell) -> Result<()> {
    render(shell, &mut io::stdout().lock());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_cover_subcommands() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell, Shell::Elvish] {
            let mut buf = Vec::new();
            render(&shell, &mut buf);
            let script = String::from_utf8(buf).unwrap();
            assert!(script.contains("govstore"), "{shell:?}");
            assert!(script.contains("upsert"), "{shell:?}");
        }
    }
}
