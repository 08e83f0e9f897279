// src/cli/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "linkshelf", author, version, about, long_about = None)]
/// Keep your bookmarks on a shelf that stays in sync
pub struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Turn debugging information on
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Print the default configuration and exit
    #[arg(long = "generate-config")]
    pub generate_config: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new database and initialize the schema
    CreateDb {
        /// Path of the database file, defaults to the configured db_url
        path: Option<String>,
    },
    /// Add a bookmark
    Add {
        title: String,
        url: String,
    },
    /// List your bookmarks, newest first
    List {
        #[arg(long = "json", help = "output as json")]
        is_json: bool,
    },
    /// Delete bookmarks by id
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,

        #[arg(short = 'y', long = "yes", help = "do not ask for confirmation")]
        yes: bool,
    },
    /// Open a bookmark in the default browser
    Open {
        id: String,
    },
    /// Show the list and keep it in sync until Ctrl-C
    Watch,
    /// Show the configured identity
    Whoami,
    /// Generate shell completion script (bash, zsh, fish)
    Completion {
        shell: String,
    },
}
