// src/cli/mod.rs
use crate::cli::args::{Cli, Commands};
use crate::cli::display::Palette;
use crate::cli::error::{CliError, CliResult};
use crate::config::Settings;
use crate::infrastructure::di::service_container::ServiceContainer;
use std::io;

pub mod args;
pub mod bookmark_commands;
pub mod completion;
pub mod display;
pub mod error;

pub fn execute_command(cli: Cli, settings: &Settings) -> CliResult<()> {
    if cli.generate_config {
        println!("{}", crate::config::generate_default_config());
        return Ok(());
    }

    let palette = Palette::new(!cli.no_color);
    let notifier = bookmark_commands::console_notifier(palette);

    let Some(command) = cli.command else {
        return Ok(());
    };

    match command {
        Commands::CreateDb { path } => bookmark_commands::create_db(path, settings),
        Commands::Completion { shell } => handle_completion(&shell),
        command => {
            let services = ServiceContainer::new(settings)?;
            match command {
                Commands::Add { title, url } => {
                    bookmark_commands::add(&title, &url, &services, notifier)
                }
                Commands::List { is_json } => {
                    bookmark_commands::list(is_json, &services, notifier, palette)
                }
                Commands::Delete { ids, yes } => {
                    bookmark_commands::delete(&ids, yes, &services, notifier)
                }
                Commands::Open { id } => bookmark_commands::open(&id, &services),
                Commands::Watch => bookmark_commands::watch(&services, settings, notifier, palette),
                Commands::Whoami => bookmark_commands::whoami(&services, settings),
                Commands::CreateDb { .. } | Commands::Completion { .. } => Ok(()),
            }
        }
    }
}

fn handle_completion(shell: &str) -> CliResult<()> {
    let shell = completion::generate_completion(shell, &mut io::stdout()).map_err(|e| {
        CliError::CommandFailed(format!("Failed to generate completion script: {}", e))
    })?;
    eprintln!("{}", completion::install_hint(shell));
    Ok(())
}
