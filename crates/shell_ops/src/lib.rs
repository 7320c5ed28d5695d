//! ShellBridge shell operations
//!
//! One API for the things a file manager asks of the desktop shell:
//! - Explore, open and execute through the platform handler
//! - Batched copy/move/rename/delete, with recycle bin support
//! - A user-configurable URL handler command
//! - File and product versions of executables
//!
//! Every operation returns a [`ShellResult`]; failures are logged and carry a
//! normalized [`ErrorCode`] plus the platform status code.

pub mod backend;
pub mod cmdline;
pub mod error_table;
mod facade;
pub mod fsutil;
pub mod known_folder;
pub mod request;
mod result;
pub mod url_handler;
pub mod version_info;

pub use backend::{NativeBackend, Resolve, ShellBackend, SpawnTarget};
pub use error_table::{translate, ErrorCode};
pub use facade::Shell;
pub use known_folder::{known_folder, optional_known_folder, KnownFolder};
pub use request::{OperationFlags, OperationKind, OperationRequest};
pub use result::{ProcessHandle, ShellResult};
pub use url_handler::UrlHandler;
pub use version_info::{file_version, VersionKind};

use std::path::PathBuf;
use thiserror::Error;

/// Errors from direct filesystem helpers and setup lookups
#[derive(Error, Debug)]
pub enum OpsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Known folder unavailable: {0}")]
    KnownFolder(String),
}

pub type Result<T> = std::result::Result<T, OpsError>;

impl ShellResult {
    pub fn from_ops_error(err: &OpsError) -> Self {
        let code = match err {
            OpsError::Io(e) => return Self::from_io_error(e),
            OpsError::NotFound(_) => ErrorCode::FileNotFound,
            OpsError::AlreadyExists(_) => ErrorCode::AlreadyExists,
            OpsError::InvalidPath(_) => ErrorCode::BadPathname,
            OpsError::InvalidOperation(_) => ErrorCode::InvalidParameter,
            OpsError::KnownFolder(_) => ErrorCode::PathNotFound,
        };
        Self::failure_with_message(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ops_error_codes() {
        let r = ShellResult::from_ops_error(&OpsError::AlreadyExists(PathBuf::from("/x/y")));
        assert!(!r.is_success());
        assert_eq!(r.error_code(), ErrorCode::AlreadyExists);
        assert!(r.message().contains("/x/y"));

        let r = ShellResult::from_ops_error(&OpsError::InvalidOperation("nope".into()));
        assert_eq!(r.error_code(), ErrorCode::InvalidParameter);
    }
}
