//! Structured logging setup with tracing

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,
    /// Log to the console as JSON instead of human-readable text
    pub json_console: bool,
    /// Where the rolling file goes, `None` for [`crate::log_dir`]
    pub directory: Option<PathBuf>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_console: false,
            directory: None,
        }
    }
}

/// Initialize the logging system.
///
/// The returned guard flushes the file writer when dropped; keep it alive
/// for the lifetime of the application.
pub fn init_logging(options: &LogOptions) -> anyhow::Result<WorkerGuard> {
    let log_dir = options.directory.clone().unwrap_or_else(super::log_dir);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, super::LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&options.level)?,
    };

    // Release builds stay quiet on the console unless JSON was requested
    let pretty = (!options.json_console && cfg!(debug_assertions)).then(|| fmt::layer().pretty());
    let json = options.json_console.then(|| fmt::layer().json());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(pretty)
        .with(json)
        .with(fmt::layer().json().with_writer(non_blocking))
        .try_init()?;

    tracing::info!("Logging initialized in {}", log_dir.display());
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = LogOptions::default();
        assert_eq!(options.level, "info");
        assert!(!options.json_console);
        assert!(options.directory.is_none());
    }

    #[test]
    fn test_init_rejects_bad_filter() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let options = LogOptions {
            level: "shell_ops=verbose".to_string(),
            json_console: false,
            directory: Some(dir.path().to_path_buf()),
        };
        assert!(init_logging(&options).is_err());
        assert!(dir.path().is_dir());
    }
}
