//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::Parser;

/// Name of the pseudo-kind listing every registered kind.
pub const LIST_KINDS: &str = "kinds";

/// Reconcile one Foreman resource with a declared state
///
/// Reads a JSON object of parameters from ARGS_FILE, or from stdin when
/// no file is given, and prints one JSON result object.
///
/// Examples:
///   foreman-reconcile domain args.json
///   echo '{"name": "example.com", ...}' | foreman-reconcile domain
///   foreman-reconcile kinds
#[derive(Parser, Debug)]
#[command(name = "foreman-reconcile")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output on stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Connection settings file (TOML)
    #[arg(long, env = "FOREMAN_RECONCILE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Report what would change without changing anything
    #[arg(long)]
    pub check: bool,

    /// Resource kind to reconcile, or `kinds` to list them
    pub kind: String,

    /// JSON arguments file
    pub args_file: Option<PathBuf>,
}
