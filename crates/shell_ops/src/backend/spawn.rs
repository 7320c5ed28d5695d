//! Process-spawn backend
//!
//! Explore/open/execute launch a helper program and return as soon as it
//! started. File operations go straight to `std::fs`.

use super::trash::{default_trash, TrashBin, TrashError};
use super::{log_invoke_failure, Resolve, ShellBackend, SpawnTarget};
use crate::cmdline::split_command_line;
use crate::error_table::ErrorCode;
use crate::fsutil;
use crate::request::{DestinationLayout, OperationKind, OperationRequest};
use crate::result::ProcessHandle;
use crate::{OpsError, ShellResult};
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Backend that shells out to helper programs
pub struct SpawnBackend {
    trash: Box<dyn TrashBin>,
}

impl SpawnBackend {
    pub fn new() -> Self {
        Self {
            trash: default_trash(),
        }
    }

    /// Use a specific trash implementation
    pub fn with_trash(trash: Box<dyn TrashBin>) -> Self {
        Self { trash }
    }

    fn delete_batch(&self, request: &OperationRequest) -> ShellResult {
        if !request.recycles() {
            return remove_each(&request.sources);
        }

        if self.trash.is_available() {
            return match self.trash.move_to_trash(&request.sources) {
                Ok(()) => ShellResult::success(),
                Err(e) => {
                    tracing::error!(
                        "failed to move {} item(s) to trash: {}",
                        request.sources.len(),
                        e
                    );
                    match e {
                        TrashError::Io(io) => ShellResult::from_io_error(&io),
                        TrashError::Facility(msg) => {
                            ShellResult::failure_with_message(ErrorCode::GeneralFailure, msg)
                        }
                    }
                }
            };
        }

        tracing::warn!(
            "trash unavailable, permanently deleting {} item(s)",
            request.sources.len()
        );

        let result = remove_each(&request.sources);
        if result.is_success() {
            ShellResult::degraded(format!(
                "Trash is unavailable; {} item(s) were permanently deleted",
                request.sources.len()
            ))
        } else {
            result
        }
    }
}

impl Default for SpawnBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellBackend for SpawnBackend {
    fn explore_directory(&self, dir: &Path) -> ShellResult {
        open_with_default(dir.as_os_str())
    }

    #[cfg(target_os = "macos")]
    fn explore_file(&self, file: &Path) -> ShellResult {
        spawn_detached(&SpawnTarget::new("open", Resolve::SearchPath).arg("-R").arg(file))
    }

    #[cfg(windows)]
    fn explore_file(&self, file: &Path) -> ShellResult {
        spawn_detached(&SpawnTarget::new("explorer", Resolve::SearchPath).arg("/select,").arg(file))
    }

    // ask the file manager to select the file, else open the containing folder
    #[cfg(not(any(target_os = "macos", windows)))]
    fn explore_file(&self, file: &Path) -> ShellResult {
        if show_item(file) {
            return ShellResult::success();
        }

        let folder = file.parent().unwrap_or(file);
        open_with_default(folder.as_os_str())
    }

    fn open(&self, target: &OsStr) -> ShellResult {
        open_with_default(target)
    }

    fn execute(&self, program: &Path, params: &str) -> ShellResult {
        let args = match split_command_line(params) {
            Ok(args) => args,
            Err(e) => {
                let result = ShellResult::failure_with_message(
                    ErrorCode::InvalidParameter,
                    format!("invalid parameters for '{}': {}", program.display(), e),
                );
                log_invoke_failure(&program.display(), &result);
                return result;
            }
        };

        let resolve = if program.components().count() > 1 {
            Resolve::Literal
        } else {
            Resolve::SearchPath
        };

        spawn_detached(&SpawnTarget::new(program, resolve).args(args))
    }

    fn spawn(&self, target: &SpawnTarget) -> ShellResult {
        spawn_detached(target)
    }

    fn delete_file(&self, path: &Path) -> ShellResult {
        match std::fs::remove_file(path) {
            Ok(()) => ShellResult::success(),
            Err(e) => ShellResult::from_io_error(&e),
        }
    }

    fn rename(&self, src: &Path, dest: &Path) -> ShellResult {
        match fsutil::rename_across_devices(src, dest) {
            Ok(()) => ShellResult::success(),
            Err(e) => ShellResult::from_ops_error(&e),
        }
    }

    fn file_operation(&self, request: &OperationRequest) -> ShellResult {
        let layout = match request.validate() {
            Ok(layout) => layout,
            Err(e) => {
                return ShellResult::failure_with_message(
                    ErrorCode::InvalidParameter,
                    e.to_string(),
                );
            }
        };

        match request.kind {
            OperationKind::Delete => self.delete_batch(request),
            OperationKind::Copy | OperationKind::Move | OperationKind::Rename => {
                transfer_each(request, layout)
            }
        }
    }
}

/// Start `target` without waiting for it
pub(crate) fn spawn_detached(target: &SpawnTarget) -> ShellResult {
    match try_spawn(target) {
        Ok(handle) => ShellResult::spawned(handle),
        Err(e) => {
            let result = ShellResult::from_io_error(&e);
            log_invoke_failure(target, &result);
            result
        }
    }
}

fn try_spawn(target: &SpawnTarget) -> io::Result<ProcessHandle> {
    let child = Command::new(target.resolved_program())
        .args(&target.args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    tracing::debug!("started '{}' (pid {})", target, child.id());
    Ok(ProcessHandle::from_child(child))
}

/// `dbus-send` call to the freedesktop FileManager1 `ShowItems` method
#[cfg(not(any(target_os = "macos", windows)))]
fn show_items_target(file: &Path) -> Option<SpawnTarget> {
    let absolute = std::path::absolute(file).ok()?;
    let uri = url::Url::from_file_path(&absolute).ok()?;

    // dbus-send splits array elements on ','
    let item = format!("array:string:{}", uri.as_str().replace(',', "%2C"));

    Some(
        SpawnTarget::new("dbus-send", Resolve::SearchPath)
            .args([
                "--session",
                "--print-reply",
                "--reply-timeout=2000",
                "--dest=org.freedesktop.FileManager1",
                "--type=method_call",
                "/org/freedesktop/FileManager1",
                "org.freedesktop.FileManager1.ShowItems",
            ])
            .arg(item)
            .arg("string:"),
    )
}

/// Select `file` in the running file manager; false if nothing answered
#[cfg(not(any(target_os = "macos", windows)))]
fn show_item(file: &Path) -> bool {
    let Some(target) = show_items_target(file) else {
        return false;
    };

    match try_spawn(&target).and_then(ProcessHandle::wait) {
        Ok(0) => true,
        Ok(code) => {
            tracing::debug!("'{}' exited with {}", target, code);
            false
        }
        Err(e) => {
            tracing::debug!("'{}' failed: {}", target, e);
            false
        }
    }
}

/// Try each default-handler candidate until one starts
fn open_with_default(target: &OsStr) -> ShellResult {
    let mut last_error = None;

    for candidate in opener_candidates(target) {
        match try_spawn(&candidate) {
            Ok(handle) => return ShellResult::spawned(handle),
            Err(e) => {
                tracing::debug!("opener '{}' failed: {}", candidate, e);
                last_error = Some((candidate, e));
            }
        }
    }

    match last_error {
        Some((candidate, e)) => {
            let result = ShellResult::from_io_error(&e);
            log_invoke_failure(&candidate, &result);
            result
        }
        None => {
            let result = ShellResult::failure_with_message(
                ErrorCode::NoAssociation,
                "no default handler is available on this system",
            );
            log_invoke_failure(&target.to_string_lossy(), &result);
            result
        }
    }
}

#[cfg(feature = "open-external")]
fn opener_candidates(target: &OsStr) -> Vec<SpawnTarget> {
    open::commands(target)
        .into_iter()
        .map(|cmd| {
            SpawnTarget::new(cmd.get_program(), Resolve::SearchPath)
                .args(cmd.get_args().map(OsStr::to_os_string))
        })
        .collect()
}

#[cfg(not(feature = "open-external"))]
fn opener_candidates(target: &OsStr) -> Vec<SpawnTarget> {
    let opener = if cfg!(target_os = "macos") {
        SpawnTarget::new("open", Resolve::SearchPath)
    } else if cfg!(windows) {
        SpawnTarget::new("cmd", Resolve::SearchPath).args(["/c", "start", ""])
    } else {
        SpawnTarget::new("xdg-open", Resolve::SearchPath)
    };

    vec![opener.arg(target)]
}

/// Best-effort batch bookkeeping: every item is attempted, the first
/// failure is reported
struct BatchOutcome {
    verb: &'static str,
    total: usize,
    failed: usize,
    first: Option<ShellResult>,
}

impl BatchOutcome {
    fn new(verb: &'static str, total: usize) -> Self {
        Self {
            verb,
            total,
            failed: 0,
            first: None,
        }
    }

    fn record(&mut self, path: &Path, outcome: Result<(), OpsError>) {
        if let Err(e) = outcome {
            tracing::error!("failed to {} '{}': {}", self.verb, path.display(), e);
            self.failed += 1;
            if self.first.is_none() {
                self.first = Some(ShellResult::from_ops_error(&e));
            }
        }
    }

    fn finish(self) -> ShellResult {
        match self.first {
            None => ShellResult::success(),
            Some(first) => {
                let message = format!(
                    "{} of {} item(s) could not {}: {}",
                    self.failed,
                    self.total,
                    self.verb,
                    first.message()
                );
                first.with_message(message)
            }
        }
    }
}

fn remove_each(paths: &[PathBuf]) -> ShellResult {
    let mut outcome = BatchOutcome::new("delete", paths.len());
    for path in paths {
        outcome.record(path, fsutil::remove_path(path).map_err(OpsError::from));
    }
    outcome.finish()
}

fn transfer_each(request: &OperationRequest, layout: DestinationLayout) -> ShellResult {
    let mut outcome = BatchOutcome::new(request.kind.verb(), request.sources.len());

    for (index, source) in request.sources.iter().enumerate() {
        let result = destination_for(request, layout, index)
            .and_then(|dest| transfer_one(request, source, &dest));
        outcome.record(source, result);
    }

    outcome.finish()
}

fn destination_for(
    request: &OperationRequest,
    layout: DestinationLayout,
    index: usize,
) -> Result<PathBuf, OpsError> {
    match layout {
        DestinationLayout::PerSource => Ok(request.destinations[index].clone()),
        DestinationLayout::Shared => {
            let shared = &request.destinations[0];
            let single_rename = request.kind == OperationKind::Rename && request.sources.len() == 1;
            if single_rename || (request.sources.len() == 1 && !shared.is_dir()) {
                return Ok(shared.clone());
            }

            std::fs::create_dir_all(shared)?;
            let source = &request.sources[index];
            let name = source
                .file_name()
                .ok_or_else(|| OpsError::InvalidPath(source.display().to_string()))?;
            Ok(shared.join(name))
        }
        DestinationLayout::None => Err(OpsError::InvalidOperation(format!(
            "{} needs a destination",
            request.kind.verb()
        ))),
    }
}

fn transfer_one(request: &OperationRequest, source: &Path, dest: &Path) -> Result<(), OpsError> {
    if std::fs::symlink_metadata(source).is_err() {
        return Err(OpsError::NotFound(source.to_path_buf()));
    }

    let overwrite = request.flags.yes_to_all;
    if dest.exists() && !overwrite {
        return Err(OpsError::AlreadyExists(dest.to_path_buf()));
    }

    match request.kind {
        OperationKind::Copy => {
            if source.is_dir() {
                fsutil::copy_dir(source, dest, overwrite)
            } else {
                std::fs::copy(source, dest)?;
                Ok(())
            }
        }
        OperationKind::Move | OperationKind::Rename => fsutil::rename_across_devices(source, dest),
        OperationKind::Delete => Err(OpsError::InvalidOperation(
            "delete has no destination".into(),
        )),
    }?;

    tracing::debug!("{}: {} -> {}", request.kind.verb(), source.display(), dest.display());
    Ok(())
}
