use anyhow::Result;
use std::path::PathBuf;

const GEMCHAT_DIR: &str = ".gemchat";
const DB_FILE: &str = "gemchat.db";
const LOGS_DIR: &str = "logs";

/// Environment variable to override the GemChat directory.
const GEMCHAT_DIR_ENV: &str = "GEMCHAT_DIR";

/// Resolve the GemChat data directory.
/// Priority: GEMCHAT_DIR env var > ~/.gemchat/
pub fn resolve_gemchat_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(GEMCHAT_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|h| h.join(GEMCHAT_DIR))
        .ok_or_else(|| anyhow::anyhow!("Failed to determine home directory"))
}

/// Ensure the GemChat directory exists and return its path.
pub fn ensure_gemchat_dir() -> Result<PathBuf> {
    let dir = resolve_gemchat_dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Database path: ~/.gemchat/gemchat.db, creating the directory.
pub fn ensure_database_path() -> Result<PathBuf> {
    Ok(ensure_gemchat_dir()?.join(DB_FILE))
}

/// Get the logs directory: ~/.gemchat/logs/
pub fn logs_dir() -> Result<PathBuf> {
    let dir = resolve_gemchat_dir()?.join(LOGS_DIR);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
