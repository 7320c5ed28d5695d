//! Public operation surface

use crate::backend::{NativeBackend, Resolve, ShellBackend, SpawnTarget};
use crate::error_table::ErrorCode;
use crate::request::{OperationFlags, OperationKind, OperationRequest};
use crate::url_handler::{expand_command, TemplateError, UrlHandler};
use crate::version_info::VersionKind;
use crate::ShellResult;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

const BAD_URL_HANDLER_HINT: &str = "You have an invalid custom browser command in the settings.";

/// Shell operations over a backend.
///
/// Every method returns a [`ShellResult`] and logs its own failures.
pub struct Shell<B: ShellBackend = NativeBackend> {
    backend: B,
    url_handler: UrlHandler,
    silent: AtomicBool,
}

impl Shell<NativeBackend> {
    /// Shell over the platform's native backend
    pub fn native(url_handler: UrlHandler) -> Self {
        Self::new(NativeBackend::new(), url_handler)
    }
}

impl<B: ShellBackend> Shell<B> {
    pub fn new(backend: B, url_handler: UrlHandler) -> Self {
        Self {
            backend,
            url_handler,
            silent: AtomicBool::new(false),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn url_handler(&self) -> &UrlHandler {
        &self.url_handler
    }

    /// Suppress native progress/confirmation UI for batched operations
    pub fn set_silent(&self, silent: bool) {
        self.silent.store(silent, Ordering::Relaxed);
    }

    pub fn is_silent(&self) -> bool {
        self.silent.load(Ordering::Relaxed)
    }

    /// Show `path` in the file manager.
    ///
    /// A file is revealed in its directory, a directory is opened. A missing
    /// path falls back to its nearest existing ancestor.
    pub fn explore(&self, path: &Path) -> ShellResult {
        let result = if path.is_dir() {
            self.backend.explore_directory(path)
        } else if path.exists() {
            self.backend.explore_file(path)
        } else {
            match path.ancestors().skip(1).find(|dir| dir.is_dir()) {
                Some(dir) => {
                    tracing::debug!(
                        "'{}' does not exist, exploring '{}'",
                        path.display(),
                        dir.display()
                    );
                    self.backend.explore_directory(dir)
                }
                None => ShellResult::failure(ErrorCode::FileNotFound),
            }
        };

        report("explore", &path.display(), result)
    }

    /// Open a file or folder with its default handler
    pub fn open(&self, path: &Path) -> ShellResult {
        report("open", &path.display(), self.backend.open(path.as_os_str()))
    }

    /// Open `url` in the configured browser command, or the system default
    pub fn open_url(&self, url: &str) -> ShellResult {
        let Some(template) = self.url_handler.snapshot() else {
            return report("open", &url, self.backend.open(OsStr::new(url)));
        };

        let target = match url_handler_target(&template, url) {
            Ok(target) => target,
            Err(e) => {
                tracing::error!("{}", e);
                tracing::error!("{}", BAD_URL_HANDLER_HINT);
                return ShellResult::failure_with_message(
                    ErrorCode::InvalidParameter,
                    format!("{} ({})", BAD_URL_HANDLER_HINT, e),
                );
            }
        };

        report("open", &url, self.backend.spawn(&target))
    }

    /// Run `program` with a command-line parameter string
    pub fn execute(&self, program: &Path, params: &str) -> ShellResult {
        let subject = format!("{} {}", program.display(), params);
        report("execute", &subject.trim_end(), self.backend.execute(program, params))
    }

    /// Permanently delete one file
    pub fn delete(&self, path: &Path) -> ShellResult {
        report("delete", &path.display(), self.backend.delete_file(path))
    }

    pub fn rename(&self, src: &Path, dest: &Path) -> ShellResult {
        let subject = format!("{} -> {}", src.display(), dest.display());
        report("rename", &subject, self.backend.rename(src, dest))
    }

    /// Dotted file or product version of an executable, `1.0.0` if unknown
    pub fn file_version(&self, path: &Path, kind: VersionKind) -> String {
        crate::version_info::file_version(&self.backend, path, kind)
    }

    /// Create `dir` and its parents; an existing directory is a success
    pub fn create_directories(&self, dir: &Path) -> ShellResult {
        let result = match std::fs::create_dir_all(dir) {
            Ok(()) => ShellResult::success(),
            Err(e) => ShellResult::from_io_error(&e),
        };
        report("create directory", &dir.display(), result)
    }

    pub fn delete_directory_recursive(&self, dir: &Path) -> ShellResult {
        let result = if dir.is_dir() {
            match std::fs::remove_dir_all(dir) {
                Ok(()) => ShellResult::success(),
                Err(e) => ShellResult::from_io_error(&e),
            }
        } else if dir.exists() {
            ShellResult::failure(ErrorCode::NotADirectory)
        } else {
            ShellResult::failure(ErrorCode::PathNotFound)
        };
        report("delete directory", &dir.display(), result)
    }

    pub fn copy(
        &self,
        sources: &[PathBuf],
        destinations: &[PathBuf],
        yes_to_all: bool,
    ) -> ShellResult {
        self.batch(OperationKind::Copy, sources, destinations, yes_to_all, false)
    }

    pub fn move_files(
        &self,
        sources: &[PathBuf],
        destinations: &[PathBuf],
        yes_to_all: bool,
    ) -> ShellResult {
        self.batch(OperationKind::Move, sources, destinations, yes_to_all, false)
    }

    pub fn rename_files(
        &self,
        sources: &[PathBuf],
        destinations: &[PathBuf],
        yes_to_all: bool,
    ) -> ShellResult {
        self.batch(OperationKind::Rename, sources, destinations, yes_to_all, false)
    }

    pub fn copy_file(&self, source: &Path, destination: &Path, yes_to_all: bool) -> ShellResult {
        self.copy(&[source.to_path_buf()], &[destination.to_path_buf()], yes_to_all)
    }

    pub fn move_file(&self, source: &Path, destination: &Path, yes_to_all: bool) -> ShellResult {
        self.move_files(&[source.to_path_buf()], &[destination.to_path_buf()], yes_to_all)
    }

    /// Delete files, to the trash when `recycle` is set
    pub fn shell_delete(&self, files: &[PathBuf], recycle: bool) -> ShellResult {
        self.batch(OperationKind::Delete, files, &[], false, recycle)
    }

    /// Delete one file directly, using the shell only if that fails
    pub fn shell_delete_quiet(&self, file: &Path) -> ShellResult {
        match std::fs::remove_file(file) {
            Ok(()) => ShellResult::success(),
            Err(e) => {
                tracing::debug!("direct delete of '{}' failed: {}", file.display(), e);
                self.shell_delete(&[file.to_path_buf()], false)
            }
        }
    }

    fn batch(
        &self,
        kind: OperationKind,
        sources: &[PathBuf],
        destinations: &[PathBuf],
        yes_to_all: bool,
        recycle: bool,
    ) -> ShellResult {
        if sources.is_empty() {
            return ShellResult::success();
        }

        let request = OperationRequest::new(
            kind,
            sources.to_vec(),
            destinations.to_vec(),
            OperationFlags {
                recycle,
                silent: self.is_silent(),
                yes_to_all,
            },
        );

        let subject = BatchSubject(&request);
        if let Err(e) = request.validate() {
            let result =
                ShellResult::failure_with_message(ErrorCode::InvalidParameter, e.to_string());
            return report(kind.verb(), &subject, result);
        }

        report(kind.verb(), &subject, self.backend.file_operation(&request))
    }
}

/// Build the spawn target for a custom URL handler command
fn url_handler_target(template: &str, url: &str) -> Result<SpawnTarget, TemplateError> {
    let mut words = expand_command(template, url)?.into_iter();
    let program = words.next().ok_or(TemplateError::Empty)?;

    let resolve = if Path::new(&program).components().count() > 1 {
        Resolve::Literal
    } else {
        Resolve::SearchPath
    };

    Ok(SpawnTarget::new(program, resolve).args(words))
}

/// Log a failed result with what was attempted
fn report(action: &str, subject: &dyn fmt::Display, result: ShellResult) -> ShellResult {
    if !result.is_success() {
        tracing::error!("{} '{}' failed: {}", action, subject, result);
    } else if result.is_degraded() {
        tracing::warn!("{} '{}': {}", action, subject, result);
    }
    result
}

struct BatchSubject<'a>(&'a OperationRequest);

impl fmt::Display for BatchSubject<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let request = self.0;
        match request.sources.as_slice() {
            [one] => write!(f, "{}", one.display())?,
            many => write!(f, "{} items", many.len())?,
        }
        match request.destinations.as_slice() {
            [] => Ok(()),
            [one] => write!(f, " -> {}", one.display()),
            many => write!(f, " -> {} destinations", many.len()),
        }
    }
}
