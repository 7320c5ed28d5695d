//! Version resources of Windows executables, extracted with the 7z archiver

use crate::backend::{Resolve, ShellBackend, SpawnTarget};
use crate::OpsError;
use std::ffi::OsString;
use std::path::Path;

/// Reported when no version can be read
pub const DEFAULT_VERSION: &str = "1.0.0";

const VERSION_RESOURCE: &str = ".rsrc/version.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionKind {
    File,
    Product,
}

impl VersionKind {
    fn keyword(self) -> &'static str {
        match self {
            VersionKind::File => "FILEVERSION",
            VersionKind::Product => "PRODUCTVERSION",
        }
    }
}

/// Dotted file or product version of the executable at `path`.
///
/// Runs `7z` to unpack the version resource into a temporary directory and
/// waits for it. Falls back to [`DEFAULT_VERSION`] when anything fails.
pub fn file_version<B: ShellBackend + ?Sized>(
    backend: &B,
    path: &Path,
    kind: VersionKind,
) -> String {
    match extract_version(backend, path, kind) {
        Ok(Some(version)) => version,
        Ok(None) => {
            tracing::debug!("no {} in {}", kind.keyword(), path.display());
            DEFAULT_VERSION.to_string()
        }
        Err(e) => {
            tracing::warn!("failed to read version of {}: {}", path.display(), e);
            DEFAULT_VERSION.to_string()
        }
    }
}

fn extract_version<B: ShellBackend + ?Sized>(
    backend: &B,
    path: &Path,
    kind: VersionKind,
) -> Result<Option<String>, OpsError> {
    let out = tempfile::tempdir()?;

    let mut out_arg = OsString::from("-o");
    out_arg.push(out.path());

    let target = SpawnTarget::new("7z", Resolve::SearchPath)
        .arg("x")
        .arg(path)
        .arg(VERSION_RESOURCE)
        .arg(out_arg)
        .arg("-y");

    let mut result = backend.spawn(&target);
    if !result.is_success() {
        return Err(OpsError::InvalidOperation(format!("{}: {}", target, result)));
    }

    if let Some(process) = result.take_process() {
        let code = process.wait()?;
        if code != 0 {
            tracing::debug!("'{}' exited with {}", target, code);
        }
    }

    match std::fs::read(out.path().join(VERSION_RESOURCE)) {
        Ok(bytes) => Ok(parse_version(&String::from_utf8_lossy(&bytes), kind)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Find `FILEVERSION 1,3,22,0` (or `PRODUCTVERSION`) in a version resource
/// script and return it as `1.3.22.0`
pub fn parse_version(resource: &str, kind: VersionKind) -> Option<String> {
    let keyword = kind.keyword();

    resource.lines().find_map(|line| {
        let rest = line.trim_start().strip_prefix(keyword)?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }

        let parts: Vec<&str> = rest.split(',').map(str::trim).collect();
        if parts.iter().any(|p| p.is_empty()) {
            return None;
        }
        Some(parts.join("."))
    })
}
