//! Logging configuration for Courier.
//!
//! Provides platform-aware logging initialization that writes to a file for
//! embedding applications with their own display (to avoid interleaving
//! with it) and to stderr for headless or test use.

use std::fs::{self, File};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Initializes logging to a file.
///
/// Location: `~/.local/state/db-courier/courier.log` on Linux (XDG state
/// directory), or the platform-appropriate state/config directory on other
/// systems.
pub fn init_file_logging() {
    let log_path = get_log_path();

    // Ensure parent directory exists
    if let Some(parent) = log_path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("Warning: Could not create log directory: {e}");
            return;
        }
    }

    // Open log file (truncate on each run to avoid unbounded growth)
    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file: {e}");
            return;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(log_file)
        .with_ansi(false) // No ANSI colors in file output
        .init();
}

/// Initializes logging to stderr.
pub fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

/// Returns the path for the log file.
///
/// Uses XDG state directory on Linux (`~/.local/state/db-courier/courier.log`),
/// or falls back to config directory on other platforms.
pub fn get_log_path() -> PathBuf {
    // Try state directory first (XDG_STATE_HOME on Linux)
    if let Some(state_dir) = dirs::state_dir() {
        return state_dir.join("db-courier").join("courier.log");
    }

    // Fall back to config directory
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("db-courier").join("courier.log");
    }

    // Last resort: temp directory
    std::env::temp_dir().join("courier.log")
}
