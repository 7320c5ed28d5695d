//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Cannot serialize configuration: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("Shell operation error: {0}")]
    Ops(#[from] shell_ops::OpsError),

    #[error("Shell context already initialized")]
    AlreadyInitialized,
}

impl CoreError {
    /// Is this error recoverable?
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CoreError::Io(_) | CoreError::ConfigParse(_))
    }

    /// Get a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            CoreError::ConfigParse(e) => format!("The settings file is invalid: {}", e.message()),
            _ => self.to_string(),
        }
    }
}
