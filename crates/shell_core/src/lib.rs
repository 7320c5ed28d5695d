//! ShellBridge core
//!
//! This crate contains:
//! - Configuration
//! - Error types
//! - The process-wide shell context

pub mod config;
pub mod error;
pub mod state;

pub use config::{LoggingConfig, ShellConfig, ShellSettings};
pub use error::CoreError;
pub use state::ShellContext;

use once_cell::sync::OnceCell;
use shell_log::WorkerGuard;

/// Global shell context
static CONTEXT: OnceCell<ShellContext> = OnceCell::new();

/// Initialize the global shell context
pub fn init(config: ShellConfig) -> Result<&'static ShellContext, CoreError> {
    CONTEXT
        .try_insert(ShellContext::new(config))
        .map_err(|_| CoreError::AlreadyInitialized)
}

/// Get the global shell context
pub fn context() -> Option<&'static ShellContext> {
    CONTEXT.get()
}

/// Load the configuration, start logging, trim old logs and initialize the
/// global context.
///
/// The returned guard must outlive all logging.
pub fn bootstrap() -> anyhow::Result<(WorkerGuard, &'static ShellContext)> {
    let config = ShellConfig::load()?;
    let guard = shell_log::init_logging(&config.logging.log_options())?;

    if let Err(e) = shell_log::cleanup_old_logs(config.logging.keep_log_files) {
        tracing::warn!("Log cleanup failed: {}", e);
    }

    let context = init(config)?;
    tracing::info!("Shell context initialized");
    Ok((guard, context))
}
