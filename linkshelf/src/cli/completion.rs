// src/cli/completion.rs
use crate::cli::args::Cli;
use crate::cli::error::{CliError, CliResult};
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use std::io::Write;
use tracing::{debug, instrument};

const SUPPORTED: [Shell; 3] = [Shell::Bash, Shell::Zsh, Shell::Fish];

fn parse_shell(name: &str) -> CliResult<Shell> {
    SUPPORTED
        .into_iter()
        .find(|shell| shell.to_string().eq_ignore_ascii_case(name))
        .ok_or_else(|| {
            CliError::InvalidInput(format!(
                "Unsupported shell: {}. Supported shells: bash, zsh, fish",
                name
            ))
        })
}

/// How to install the generated script, printed to stderr as shell comments
pub fn install_hint(shell: Shell) -> &'static str {
    match shell {
        Shell::Zsh => "# linkshelf completion zsh > ~/.zfunc/_linkshelf",
        Shell::Fish => "# linkshelf completion fish > ~/.config/fish/completions/linkshelf.fish",
        _ => "# eval \"$(linkshelf completion bash)\"",
    }
}

/// Write the completion script for `shell` to `out`
#[instrument(skip(out), level = "debug")]
pub fn generate_completion(shell: &str, out: &mut dyn Write) -> CliResult<Shell> {
    let shell = parse_shell(shell)?;
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    debug!("Generating {} completion", shell);
    generate(shell, &mut cmd, bin_name, out);
    Ok(shell)
}
