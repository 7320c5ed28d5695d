//! Batch backend built on `SHFileOperationW` / `ShellExecuteExW`
//!
//! Building the [`BatchPlan`] is platform independent; only running it needs
//! Windows.

use crate::request::{DestinationLayout, OperationKind, OperationRequest, RequestError};
use std::path::{Path, PathBuf};

// SHFILEOPSTRUCTW::wFunc
pub const FO_MOVE: u32 = 0x1;
pub const FO_COPY: u32 = 0x2;
pub const FO_DELETE: u32 = 0x3;
pub const FO_RENAME: u32 = 0x4;

// SHFILEOPSTRUCTW::fFlags
pub const FOF_MULTIDESTFILES: u16 = 0x1;
pub const FOF_SILENT: u16 = 0x4;
pub const FOF_NOCONFIRMATION: u16 = 0x10;
pub const FOF_ALLOWUNDO: u16 = 0x40;
pub const FOF_NOCONFIRMMKDIR: u16 = 0x200;
pub const FOF_NOERRORUI: u16 = 0x400;
pub const FOF_NOCOPYSECURITYATTRIBS: u16 = 0x800;
pub const FOF_NO_UI: u16 = FOF_SILENT | FOF_NOCONFIRMATION | FOF_NOERRORUI | FOF_NOCONFIRMMKDIR;

/// Arguments for one `SHFileOperationW` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    pub func: u32,
    pub flags: u16,
    /// Double-NUL-terminated source list
    pub from: Vec<u16>,
    /// Double-NUL-terminated destination list
    pub to: Vec<u16>,
}

impl BatchPlan {
    pub fn from_request(request: &OperationRequest) -> Result<Self, RequestError> {
        let layout = request.validate()?;

        let func = match request.kind {
            OperationKind::Copy => FO_COPY,
            OperationKind::Move => FO_MOVE,
            OperationKind::Rename => FO_RENAME,
            // recycling is a delete that allows undo
            OperationKind::Delete => FO_DELETE,
        };

        let mut flags = if request.kind == OperationKind::Delete || request.flags.yes_to_all {
            let mut f = FOF_NOCONFIRMATION;
            if request.recycles() {
                f |= FOF_ALLOWUNDO;
            }
            f
        } else {
            // target directory security, no progress bar, create directories silently
            FOF_NOCOPYSECURITYATTRIBS | FOF_SILENT | FOF_NOCONFIRMMKDIR
        };

        if layout == DestinationLayout::PerSource && request.kind != OperationKind::Delete {
            flags |= FOF_MULTIDESTFILES;
        }

        if request.flags.silent {
            flags |= FOF_NO_UI;
        }

        Ok(Self {
            func,
            flags,
            from: encode_path_list(&request.sources),
            to: encode_path_list(&request.destinations),
        })
    }
}

/// Serialize paths as absolute UTF-16 strings, each NUL-terminated, with one
/// extra NUL closing the list. An empty list is still double-NUL-terminated.
pub fn encode_path_list(paths: &[PathBuf]) -> Vec<u16> {
    let mut buffer = Vec::new();

    for path in paths {
        buffer.extend(encode_wide(&absolute(path)));
        buffer.push(0);
    }

    if paths.is_empty() {
        buffer.push(0);
    }
    buffer.push(0);

    buffer
}

/// `SHFileOperationW` refuses relative paths
fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(windows)]
fn encode_wide(path: &Path) -> Vec<u16> {
    use std::os::windows::ffi::OsStrExt;
    path.as_os_str().encode_wide().collect()
}

#[cfg(not(windows))]
fn encode_wide(path: &Path) -> Vec<u16> {
    path.to_string_lossy().encode_utf16().collect()
}

#[cfg(windows)]
pub use native::BatchBackend;

#[cfg(windows)]
mod native {
    use super::BatchPlan;
    use crate::backend::{log_invoke_failure, ShellBackend, SpawnTarget};
    use crate::error_table::{remap_batch_code, ErrorCode};
    use crate::request::OperationRequest;
    use crate::result::ProcessHandle;
    use crate::ShellResult;
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;
    use std::path::Path;
    use windows::core::PCWSTR;
    use windows::Win32::Foundation::{GetLastError, HWND};
    use windows::Win32::UI::Shell::{
        SHFileOperationW, ShellExecuteExW, SEE_MASK_FLAG_NO_UI, SEE_MASK_NOCLOSEPROCESS,
        SHELLEXECUTEINFOW, SHFILEOPSTRUCTW,
    };
    use windows::Win32::UI::WindowsAndMessaging::SW_SHOWNORMAL;

    /// Windows shell backend
    #[derive(Debug, Default, Clone, Copy)]
    pub struct BatchBackend;

    impl BatchBackend {
        pub fn new() -> Self {
            Self
        }

        fn shell_execute(
            &self,
            verb: Option<&str>,
            file: &OsStr,
            params: Option<&str>,
        ) -> ShellResult {
            let verb_w = verb.map(wide_str);
            let file_w = wide_os(file);
            let params_w = params.map(wide_str);

            let mut info = SHELLEXECUTEINFOW {
                cbSize: std::mem::size_of::<SHELLEXECUTEINFOW>() as u32,
                fMask: SEE_MASK_FLAG_NO_UI | SEE_MASK_NOCLOSEPROCESS,
                lpVerb: verb_w.as_ref().map_or(PCWSTR::null(), |v| PCWSTR(v.as_ptr())),
                lpFile: PCWSTR(file_w.as_ptr()),
                lpParameters: params_w.as_ref().map_or(PCWSTR::null(), |p| PCWSTR(p.as_ptr())),
                nShow: SW_SHOWNORMAL.0,
                ..Default::default()
            };

            if unsafe { ShellExecuteExW(&mut info) }.is_err() {
                let e = unsafe { GetLastError() };
                let result = ShellResult::os_failure(
                    ErrorCode::from_win32(e.0),
                    e.0 as i32,
                    Some(crate::error_table::format_system_message(e.0 as i32)),
                );

                let what = format!(
                    "{} {} {}",
                    verb.unwrap_or(""),
                    file.to_string_lossy(),
                    params.unwrap_or("")
                );
                log_invoke_failure(&what.trim(), &result);
                return result;
            }

            if info.hProcess.is_invalid() {
                ShellResult::success()
            } else {
                ShellResult::spawned(ProcessHandle::from_raw(info.hProcess))
            }
        }
    }

    impl ShellBackend for BatchBackend {
        fn explore_directory(&self, dir: &Path) -> ShellResult {
            self.shell_execute(Some("explore"), dir.as_os_str(), None)
        }

        fn explore_file(&self, file: &Path) -> ShellResult {
            let params = format!("/select,\"{}\"", file.display());
            self.shell_execute(None, OsStr::new("explorer"), Some(&params))
        }

        fn open(&self, target: &OsStr) -> ShellResult {
            self.shell_execute(Some("open"), target, None)
        }

        fn execute(&self, program: &Path, params: &str) -> ShellResult {
            let params = (!params.is_empty()).then_some(params);
            self.shell_execute(Some("open"), program.as_os_str(), params)
        }

        fn spawn(&self, target: &SpawnTarget) -> ShellResult {
            crate::backend::spawn::spawn_detached(target)
        }

        fn delete_file(&self, path: &Path) -> ShellResult {
            match std::fs::remove_file(crate::fsutil::to_unc(path)) {
                Ok(()) => ShellResult::success(),
                Err(e) => ShellResult::from_io_error(&e),
            }
        }

        fn rename(&self, src: &Path, dest: &Path) -> ShellResult {
            let (src, dest) = (crate::fsutil::to_unc(src), crate::fsutil::to_unc(dest));
            match crate::fsutil::rename_across_devices(&src, &dest) {
                Ok(()) => ShellResult::success(),
                Err(e) => ShellResult::from_ops_error(&e),
            }
        }

        fn file_operation(&self, request: &OperationRequest) -> ShellResult {
            let plan = match BatchPlan::from_request(request) {
                Ok(plan) => plan,
                Err(e) => {
                    return ShellResult::failure_with_message(
                        ErrorCode::InvalidParameter,
                        e.to_string(),
                    );
                }
            };

            let mut op = SHFILEOPSTRUCTW {
                hwnd: HWND::default(),
                wFunc: plan.func,
                pFrom: PCWSTR(plan.from.as_ptr()),
                pTo: PCWSTR(plan.to.as_ptr()),
                fFlags: plan.flags,
                ..Default::default()
            };

            let res = unsafe { SHFileOperationW(&mut op) };
            if res == 0 {
                if op.fAnyOperationsAborted.as_bool() {
                    return ShellResult::failure(ErrorCode::Cancelled);
                }
                return ShellResult::success();
            }

            let code = remap_batch_code(res);
            tracing::error!(
                "shell {} of {} item(s) failed: private code 0x{:x}, mapped to {}",
                request.kind.verb(),
                request.sources.len(),
                res,
                code
            );
            ShellResult::os_failure(ErrorCode::from_win32(code), code as i32, None)
        }
    }

    fn wide_str(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(std::iter::once(0)).collect()
    }

    fn wide_os(s: &OsStr) -> Vec<u16> {
        s.encode_wide().chain(std::iter::once(0)).collect()
    }
}
