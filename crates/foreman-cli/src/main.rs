//! foreman-reconcile
//!
//! Reconciles one Foreman resource per invocation and prints a single JSON
//! result object on stdout.

mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, LIST_KINDS};

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only the result object
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            eprintln!("{}: tracing subscriber already set", "warning".yellow().bold());
        }
        tracing::debug!("Verbose mode enabled");
    }

    if cli.kind == LIST_KINDS {
        commands::run_list_kinds();
        return;
    }

    let result = commands::run_reconcile(
        &cli.kind,
        cli.args_file.as_deref(),
        cli.config.as_deref(),
        cli.check,
    );
    match result {
        Ok(value) => println!("{}", value),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            println!("{}", output::failure(&e.to_string()));
            std::process::exit(1);
        }
    }
}
