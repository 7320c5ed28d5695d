//! ShellBridge logging
//!
//! Structured logging to the console and a daily rolling JSON file, plus
//! retention of old log files.

mod logging;
mod retention;

pub use logging::{init_logging, LogOptions};
pub use retention::{cleanup_old_logs, remove_old_files};
pub use tracing_appender::non_blocking::WorkerGuard;

use directories::ProjectDirs;
use std::path::PathBuf;

/// File name prefix of the rolling log
pub const LOG_FILE_NAME: &str = "shellbridge.log";

/// Get the application log directory
pub fn log_dir() -> PathBuf {
    ProjectDirs::from("com", "ShellBridge", "ShellBridge")
        .map(|dirs| dirs.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}
