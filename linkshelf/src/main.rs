// src/main.rs
use clap::Parser;
use crossterm::style::Stylize;
use linkshelf::cli::args::Cli;
use linkshelf::cli::error::CliError;
use linkshelf::config::load_settings;
use linkshelf::exitcode;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::{filter_fn, LevelFilter},
    fmt::{self, format::FmtSpan},
    prelude::*,
};

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.debug, cli.no_color);

    let settings = match load_settings(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", format!("Failed to load configuration: {}", e).red());
            std::process::exit(exitcode::USAGE);
        }
    };

    match linkshelf::cli::execute_command(cli, &settings) {
        Ok(()) => std::process::exit(exitcode::SUCCESS),
        Err(CliError::OperationAborted) => std::process::exit(exitcode::CANCEL),
        Err(e) => {
            eprintln!("{}", format!("Error: {}", e).red());
            std::process::exit(exitcode::USAGE);
        }
    }
}

fn setup_logging(verbosity: u8, no_color: bool) {
    let filter = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        3 => LevelFilter::TRACE,
        _ => {
            eprintln!("Don't be crazy, max is -d -d -d");
            LevelFilter::TRACE
        }
    };

    let noisy_modules = ["diesel", "r2d2", "mio", "tokio"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    // stdout stays clean for piping
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(!no_color)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    let filtered_layer = fmt_layer.with_filter(filter).with_filter(module_filter);

    tracing_subscriber::registry().with(filtered_layer).init();

    match filter {
        LevelFilter::INFO => info!("Debug mode: info"),
        LevelFilter::DEBUG => debug!("Debug mode: debug"),
        LevelFilter::TRACE => debug!("Debug mode: trace"),
        _ => {}
    }
}
