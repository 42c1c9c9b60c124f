//! Command implementations

use std::io::Read;
use std::path::Path;

use colored::Colorize;
use foreman_api::HttpForeman;
use foreman_core::{KindRegistry, ReconcileOptions, Reconciler};
use serde_json::Value;
use tracing::debug;

use crate::config::{ConnectionLayer, FileConfig, Invocation};
use crate::error::{CliError, Result};
use crate::output;

/// Print every registered kind.
pub fn run_list_kinds() {
    let registry = KindRegistry::with_builtins();
    println!("{}", "Available kinds".bold());
    println!();
    for name in registry.list() {
        if let Some(entry) = registry.get(name) {
            println!("  {:<18} {}", name.green(), entry.spec().resource);
        }
    }
}

/// Reconcile one resource of `kind` and return the success object.
///
/// Parameters are validated before the connection is built, so a
/// configuration error never reaches the server.
pub fn run_reconcile(
    kind: &str,
    args_file: Option<&Path>,
    config: Option<&Path>,
    check: bool,
) -> Result<Value> {
    let registry = KindRegistry::with_builtins();
    let entry = registry.get(kind).ok_or_else(|| {
        CliError::user(format!(
            "Unknown kind '{}'. Valid: {}",
            kind,
            registry.list().join(", ")
        ))
    })?;

    let invocation = Invocation::from_args(read_args(args_file)?)?;
    let desired = entry.parse(invocation.params)?;

    let connection = invocation
        .connection
        .or(ConnectionLayer::from_env()?)
        .or(FileConfig::load(config)?.connection)
        .into_connection()?;
    debug!(?connection, "Connecting");
    let api = HttpForeman::new(&connection)?;

    let options = ReconcileOptions {
        dry_run: check || invocation.check_mode,
    };
    let outcome = Reconciler::new(&api)
        .with_options(options)
        .reconcile(entry.spec(), &desired)?;

    Ok(output::success(entry.spec(), &outcome))
}

fn read_args(args_file: Option<&Path>) -> Result<Value> {
    let content = match args_file {
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            CliError::user(format!("Could not read arguments file {}: {}", path.display(), e))
        })?,
        None => {
            let mut content = String::new();
            std::io::stdin().read_to_string(&mut content)?;
            content
        }
    };
    Ok(serde_json::from_str(&content)?)
}
