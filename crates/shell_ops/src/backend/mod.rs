//! Execution backends
//!
//! A backend performs exactly one primitive per call and reports the raw
//! outcome as a [`ShellResult`]. Two implementations exist:
//! - [`SpawnBackend`]: launches helper programs (`xdg-open`, `open`,
//!   `explorer`) and calls `std::fs` directly for file operations
//! - `BatchBackend` (Windows only): `SHFileOperationW` for batched file
//!   operations and `ShellExecuteExW` for opening and executing
//!
//! [`NativeBackend`] names the one chosen for the target platform.

mod batch;
mod spawn;
mod trash;

pub use batch::{encode_path_list, BatchPlan};
#[cfg(windows)]
pub use batch::BatchBackend;
pub use spawn::SpawnBackend;
pub use trash::{NoTrash, TrashBin, TrashError};
#[cfg(feature = "trash-support")]
pub use trash::SystemTrash;

use crate::request::OperationRequest;
use crate::ShellResult;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

#[cfg(windows)]
pub type NativeBackend = BatchBackend;
#[cfg(not(windows))]
pub type NativeBackend = SpawnBackend;

/// Platform primitives used by [`crate::Shell`]
pub trait ShellBackend: Send + Sync {
    /// Open a directory in the file manager
    fn explore_directory(&self, dir: &Path) -> ShellResult;

    /// Open the directory containing `file`, selecting it where supported
    fn explore_file(&self, file: &Path) -> ShellResult;

    /// Hand a path or URL to the default handler
    fn open(&self, target: &OsStr) -> ShellResult;

    /// Run a program with a raw parameter string
    fn execute(&self, program: &Path, params: &str) -> ShellResult;

    /// Launch a program with an explicit argument list
    fn spawn(&self, target: &SpawnTarget) -> ShellResult;

    /// Permanently delete one file
    fn delete_file(&self, path: &Path) -> ShellResult;

    /// Rename one file, across volumes if needed
    fn rename(&self, src: &Path, dest: &Path) -> ShellResult;

    /// Run a validated batched copy/move/rename/delete
    fn file_operation(&self, request: &OperationRequest) -> ShellResult;
}

/// How the executable of a [`SpawnTarget`] is located
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolve {
    /// Look the name up in `PATH`
    SearchPath,
    /// Use the path as given
    Literal,
}

impl fmt::Display for Resolve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolve::SearchPath => f.write_str("spawnp"),
            Resolve::Literal => f.write_str("spawn"),
        }
    }
}

/// A program to launch without waiting for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnTarget {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub resolve: Resolve,
}

impl SpawnTarget {
    pub fn new(program: impl Into<PathBuf>, resolve: Resolve) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            resolve,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Program path as it will be passed to the OS
    pub fn resolved_program(&self) -> PathBuf {
        match self.resolve {
            Resolve::SearchPath => self.program.clone(),
            Resolve::Literal if self.program.is_relative() => {
                // a bare name must not be looked up in PATH
                Path::new(".").join(&self.program)
            }
            Resolve::Literal => self.program.clone(),
        }
    }
}

impl fmt::Display for SpawnTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.resolve, self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Log a launch that never started
pub(crate) fn log_invoke_failure(what: &dyn fmt::Display, result: &ShellResult) {
    tracing::error!("failed to invoke '{}': {}", what, result.message());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_target_display() {
        let t = SpawnTarget::new("xdg-open", Resolve::SearchPath).arg("/tmp/a b");
        assert_eq!(t.to_string(), "spawnp xdg-open /tmp/a b");
    }

    #[test]
    fn test_literal_bare_name_is_not_searched() {
        let t = SpawnTarget::new("tool", Resolve::Literal);
        assert_eq!(t.resolved_program(), Path::new(".").join("tool"));

        let t = SpawnTarget::new("tool", Resolve::SearchPath);
        assert_eq!(t.resolved_program(), PathBuf::from("tool"));
    }
}
