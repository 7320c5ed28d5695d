//! Log file retention

use anyhow::Context;
use globset::{Glob, GlobMatcher};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Keep the newest `keep` files in `dir` whose names match `pattern`
/// (`*` matches any run of characters) and delete the rest.
///
/// Returns how many files were removed. Files that cannot be removed are
/// logged and skipped.
pub fn remove_old_files(dir: &Path, pattern: &str, keep: usize) -> anyhow::Result<usize> {
    let matcher = name_matcher(pattern)?;
    if !dir.exists() {
        return Ok(0);
    }

    let mut files: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }

        let name = entry.file_name();
        if !matcher.is_match(&name) {
            continue;
        }

        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        files.push((modified, entry.path()));
    }

    if files.len() <= keep {
        return Ok(0);
    }

    // oldest first
    files.sort();
    let excess = files.len() - keep;

    let mut deleted = 0;
    for (_, path) in files.into_iter().take(excess) {
        match std::fs::remove_file(&path) {
            Ok(()) => {
                deleted += 1;
                tracing::debug!("Deleted old file: {:?}", path);
            }
            Err(e) => tracing::warn!("failed to remove log file {:?}: {}", path, e),
        }
    }

    Ok(deleted)
}

/// Trim the log directory to the newest `keep` log files
pub fn cleanup_old_logs(keep: usize) -> anyhow::Result<usize> {
    let pattern = format!("{}*", super::LOG_FILE_NAME);
    let deleted = remove_old_files(&super::log_dir(), &pattern, keep)?;
    tracing::info!("Cleaned up {} old log files", deleted);
    Ok(deleted)
}

/// Matcher for file names; `*` matches any run of characters
fn name_matcher(pattern: &str) -> anyhow::Result<GlobMatcher> {
    let glob = Glob::new(pattern)
        .with_context(|| format!("invalid file name pattern '{}'", pattern))?;
    Ok(glob.compile_matcher())
}
