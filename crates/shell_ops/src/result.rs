//! Outcome of a shell operation

use crate::error_table::{format_system_message, translate, ErrorCode, OsCode};
use std::fmt;
use std::io;
use std::process::Child;

/// A process launched by a shell operation.
///
/// The handle is move-only. It is released exactly once: either when it is
/// dropped, or by the caller consuming it through [`ProcessHandle::wait`].
/// Dropping never blocks; a child that is still running is handed to a
/// detached reaper thread.
pub struct ProcessHandle {
    inner: Option<Inner>,
}

enum Inner {
    Child(Child),
    #[cfg(windows)]
    Raw(windows::Win32::Foundation::HANDLE),
}

// The raw handle is owned exclusively by this wrapper.
#[cfg(windows)]
unsafe impl Send for Inner {}

impl ProcessHandle {
    pub fn from_child(child: Child) -> Self {
        Self {
            inner: Some(Inner::Child(child)),
        }
    }

    /// Take ownership of a handle returned by `ShellExecuteExW`
    #[cfg(windows)]
    pub(crate) fn from_raw(handle: windows::Win32::Foundation::HANDLE) -> Self {
        Self {
            inner: Some(Inner::Raw(handle)),
        }
    }

    /// OS process id, if it can still be queried
    pub fn id(&self) -> Option<u32> {
        match self.inner.as_ref()? {
            Inner::Child(child) => Some(child.id()),
            #[cfg(windows)]
            Inner::Raw(handle) => {
                let pid = unsafe { windows::Win32::System::Threading::GetProcessId(*handle) };
                (pid != 0).then_some(pid)
            }
        }
    }

    /// Non-blocking check for the exit code
    pub fn try_wait(&mut self) -> io::Result<Option<i32>> {
        match self.inner.as_mut() {
            Some(Inner::Child(child)) => Ok(child.try_wait()?.map(|s| s.code().unwrap_or(-1))),
            #[cfg(windows)]
            Some(Inner::Raw(handle)) => raw_exit_code(*handle, 0),
            None => Ok(None),
        }
    }

    /// Block until the process exits and release the handle
    pub fn wait(mut self) -> io::Result<i32> {
        match self.inner.take() {
            Some(Inner::Child(mut child)) => Ok(child.wait()?.code().unwrap_or(-1)),
            #[cfg(windows)]
            Some(Inner::Raw(handle)) => {
                let code = raw_exit_code(handle, windows::Win32::System::Threading::INFINITE);
                close_raw(handle);
                code?.ok_or_else(|| io::Error::new(io::ErrorKind::Other, "process still running"))
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "process handle already released",
            )),
        }
    }
}

#[cfg(windows)]
fn raw_exit_code(
    handle: windows::Win32::Foundation::HANDLE,
    timeout_ms: u32,
) -> io::Result<Option<i32>> {
    use windows::Win32::Foundation::WAIT_OBJECT_0;
    use windows::Win32::System::Threading::{GetExitCodeProcess, WaitForSingleObject};

    unsafe {
        if WaitForSingleObject(handle, timeout_ms) != WAIT_OBJECT_0 {
            return Ok(None);
        }

        let mut code = 0u32;
        GetExitCodeProcess(handle, &mut code).map_err(io::Error::from)?;
        Ok(Some(code as i32))
    }
}

#[cfg(windows)]
fn close_raw(handle: windows::Win32::Foundation::HANDLE) {
    if !handle.is_invalid() {
        let _ = unsafe { windows::Win32::Foundation::CloseHandle(handle) };
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        match self.inner.take() {
            Some(Inner::Child(mut child)) => {
                if let Ok(Some(_)) = child.try_wait() {
                    return;
                }

                let pid = child.id();
                let spawned = std::thread::Builder::new()
                    .name(format!("reap-{}", pid))
                    .spawn(move || {
                        let _ = child.wait();
                    });

                if let Err(e) = spawned {
                    tracing::warn!("failed to start reaper for process {}: {}", pid, e);
                }
            }
            #[cfg(windows)]
            Some(Inner::Raw(handle)) => close_raw(handle),
            None => {}
        }
    }
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle").field("id", &self.id()).finish()
    }
}

/// Result of every shell operation.
///
/// Not `Clone`: an attached process handle has a single owner.
#[derive(Debug)]
pub struct ShellResult {
    success: bool,
    code: ErrorCode,
    os_code: OsCode,
    message: String,
    degraded: bool,
    process: Option<ProcessHandle>,
}

impl ShellResult {
    fn new(
        success: bool,
        code: ErrorCode,
        os_code: OsCode,
        message: Option<String>,
        process: Option<ProcessHandle>,
    ) -> Self {
        let message = match message {
            Some(m) if !m.trim().is_empty() => m,
            _ => default_message(code, os_code),
        };

        Self {
            success,
            code,
            os_code,
            message,
            degraded: false,
            process,
        }
    }

    pub fn success() -> Self {
        Self::new(true, ErrorCode::Success, 0, None, None)
    }

    /// Success that owns the launched process
    pub fn spawned(process: ProcessHandle) -> Self {
        Self::new(true, ErrorCode::Success, 0, None, Some(process))
    }

    /// Success reached through a weaker fallback; `note` says which
    pub fn degraded(note: impl Into<String>) -> Self {
        let mut result = Self::new(true, ErrorCode::Success, 0, Some(note.into()), None);
        result.degraded = true;
        result
    }

    /// Failure produced by this crate rather than by an OS call
    pub fn failure(code: ErrorCode) -> Self {
        Self::new(false, code, code.native_code(), None, None)
    }

    pub fn failure_with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(false, code, code.native_code(), Some(message.into()), None)
    }

    /// Failure reported by the OS as a raw status code
    pub fn os_failure(code: ErrorCode, os_code: OsCode, message: Option<String>) -> Self {
        Self::new(false, code, os_code, message, None)
    }

    pub fn from_io_error(err: &io::Error) -> Self {
        let code = ErrorCode::from_io(err);
        match err.raw_os_error() {
            Some(raw) => Self::new(false, code, raw, Some(format_system_message(raw)), None),
            None => Self::new(false, code, code.native_code(), Some(err.to_string()), None),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn error_code(&self) -> ErrorCode {
        self.code
    }

    /// Platform-native status code, `0` on success
    pub fn os_code(&self) -> OsCode {
        self.os_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn process(&self) -> Option<&ProcessHandle> {
        self.process.as_ref()
    }

    /// Move the process handle out; the caller becomes responsible for it
    pub fn take_process(&mut self) -> Option<ProcessHandle> {
        self.process.take()
    }

    /// Replace the message, keeping the code
    pub(crate) fn with_message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        if !message.trim().is_empty() {
            self.message = message;
        }
        self
    }
}

fn default_message(code: ErrorCode, os_code: OsCode) -> String {
    match code {
        ErrorCode::Unknown(_) => format_system_message(os_code),
        known => translate(known).into_owned(),
    }
}

impl fmt::Display for ShellResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "Error {}", self.os_code)
        } else {
            f.write_str(&self.message)
        }
    }
}

impl From<io::Error> for ShellResult {
    fn from(err: io::Error) -> Self {
        Self::from_io_error(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_invariants() {
        let r = ShellResult::success();
        assert!(r.is_success());
        assert_eq!(r.error_code(), ErrorCode::Success);
        assert_eq!(r.os_code(), 0);
        assert!(!r.message().is_empty());
        assert!(!r.is_degraded());
    }

    #[test]
    fn test_failure_message_from_table() {
        let r = ShellResult::failure(ErrorCode::DiskFull);
        assert!(!r.is_success());
        assert_eq!(r.message(), translate(ErrorCode::DiskFull));
        assert_eq!(r.to_string(), r.message());
    }

    #[test]
    fn test_blank_message_falls_back() {
        let r = ShellResult::failure_with_message(ErrorCode::AccessDenied, "   ");
        assert_eq!(r.message(), translate(ErrorCode::AccessDenied));

        let r = ShellResult::os_failure(ErrorCode::Unknown(0x4d2), 0x4d2, None);
        assert!(r.to_string().contains("0x4d2"));
    }

    #[test]
    fn test_display_never_empty() {
        let results = [
            ShellResult::success(),
            ShellResult::failure(ErrorCode::InvalidParameter),
            ShellResult::os_failure(ErrorCode::Unknown(99999), 99999, None),
            ShellResult::degraded("trash unavailable"),
            ShellResult::from_io_error(&io::Error::new(io::ErrorKind::Other, "")),
        ];

        for r in &results {
            assert!(!r.to_string().is_empty());
        }
    }

    #[test]
    fn test_degraded_is_success() {
        let r = ShellResult::degraded("trash was unavailable");
        assert!(r.is_success());
        assert!(r.is_degraded());
        assert_eq!(r.error_code(), ErrorCode::Success);
        assert_eq!(r.message(), "trash was unavailable");
    }

    #[test]
    fn test_from_io_error_keeps_raw_code() {
        let raw = ErrorCode::FileNotFound.native_code();
        let r = ShellResult::from(io::Error::from_raw_os_error(raw));
        assert_eq!(r.error_code(), ErrorCode::FileNotFound);
        assert_eq!(r.os_code(), raw);
        assert!(r.message().contains(&format!("0x{:x}", raw)));
    }

    #[cfg(unix)]
    #[test]
    fn test_take_process_transfers_ownership() {
        let child = std::process::Command::new("true").spawn().unwrap();
        let mut r = ShellResult::spawned(ProcessHandle::from_child(child));
        assert!(r.process().is_some());

        let handle = r.take_process().unwrap();
        assert!(r.process().is_none());
        assert_eq!(handle.wait().unwrap(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_drop_does_not_block() {
        let child = std::process::Command::new("sleep").arg("5").spawn().unwrap();
        let started = std::time::Instant::now();
        drop(ShellResult::spawned(ProcessHandle::from_child(child)));
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
    }
}
