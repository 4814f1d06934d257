//! CLI setup module
//!
//! Resolves flags against the config file and opens the GemChat core.

use crate::cli::{Cli, DEFAULT_PROXY_URL};
use crate::config::CliConfig;
use anyhow::Result;
use gemchat_core::{AppCore, paths};
use std::path::PathBuf;
use std::sync::Arc;

/// Flag, then config file, then default.
pub fn resolve_proxy_url(cli: &Cli, config: &CliConfig) -> String {
    cli.proxy_url
        .clone()
        .or_else(|| config.default.proxy_url.clone())
        .unwrap_or_else(|| DEFAULT_PROXY_URL.to_string())
}

pub fn resolve_db_path(cli: &Cli, config: &CliConfig) -> Result<PathBuf> {
    match cli.db_path.clone().or_else(|| config.default.db_path.clone()) {
        Some(path) => Ok(PathBuf::from(path)),
        None => paths::ensure_database_path(),
    }
}

/// Open the core, failing if the database cannot be opened.
pub fn prepare_core(cli: &Cli, config: &CliConfig) -> Result<Arc<AppCore>> {
    let db_path = resolve_db_path(cli, config)?;
    Ok(Arc::new(AppCore::new(&db_path)?))
}

/// Open the core for the TUI, which keeps running without storage.
pub fn prepare_core_lenient(cli: &Cli, config: &CliConfig) -> Arc<AppCore> {
    match resolve_db_path(cli, config) {
        Ok(db_path) => Arc::new(AppCore::new_or_unavailable(&db_path)),
        Err(err) => {
            tracing::warn!(error = %err, "Failed to resolve database path");
            Arc::new(AppCore::unavailable())
        }
    }
}
