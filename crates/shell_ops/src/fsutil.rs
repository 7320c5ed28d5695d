//! Direct filesystem helpers shared by the backends

use crate::{OpsError, Result};
use std::io;
use std::path::{Path, PathBuf};

/// Copy a directory tree.
///
/// An existing `dst` is an error unless `merge` is set, in which case files
/// are added to it. Symlinked directories are not followed.
pub fn copy_dir(src: &Path, dst: &Path, merge: bool) -> Result<()> {
    if !src.is_dir() {
        return Err(OpsError::NotFound(src.to_path_buf()));
    }

    if dst.exists() {
        if !merge {
            return Err(OpsError::AlreadyExists(dst.to_path_buf()));
        }
    } else {
        std::fs::create_dir_all(dst)?;
    }

    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            copy_dir(&src_path, &dst_path, merge)?;
        } else if file_type.is_symlink() && src_path.is_dir() {
            tracing::debug!("Skipping directory symlink: {}", src_path.display());
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }

    Ok(())
}

/// Move `source` to `base_dir/destination`, creating intermediate
/// directories. Falls back to copy and delete when a rename is impossible.
pub fn move_file_recursive(source: &Path, base_dir: &Path, destination: &Path) -> Result<PathBuf> {
    let target = prepare_target(base_dir, destination)?;

    if let Err(e) = std::fs::rename(source, &target) {
        tracing::debug!("rename failed ({}), copying instead: {}", e, source.display());
        std::fs::copy(source, &target)?;
        if let Err(e) = std::fs::remove_file(source) {
            tracing::warn!("Copied but could not remove {}: {}", source.display(), e);
        }
    }

    Ok(target)
}

/// Copy `source` to `base_dir/destination`, creating intermediate directories
pub fn copy_file_recursive(source: &Path, base_dir: &Path, destination: &Path) -> Result<PathBuf> {
    let target = prepare_target(base_dir, destination)?;
    std::fs::copy(source, &target)?;
    Ok(target)
}

fn prepare_target(base_dir: &Path, destination: &Path) -> Result<PathBuf> {
    if destination.is_absolute() {
        return Err(OpsError::InvalidPath(format!(
            "{} must be relative to {}",
            destination.display(),
            base_dir.display()
        )));
    }

    let target = base_dir.join(destination);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(target)
}

/// Rename, falling back to copy + delete across filesystems
pub fn rename_across_devices(src: &Path, dest: &Path) -> Result<()> {
    match std::fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::info!(
                "Cross-filesystem move, using copy+delete: {} -> {}",
                src.display(),
                dest.display()
            );

            if src.is_dir() {
                copy_dir(src, dest, false)?;
            } else {
                std::fs::copy(src, dest)?;
            }
            remove_path(src)?;
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Remove a file, or a directory with its contents
pub fn remove_path(path: &Path) -> io::Result<()> {
    let metadata = std::fs::symlink_metadata(path)?;
    if metadata.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    }
}

/// Long-path form (`\\?\`) of an absolute path
#[cfg(windows)]
pub(crate) fn to_unc(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let s = absolute.to_string_lossy();
    if s.starts_with(r"\\?\") {
        absolute
    } else if let Some(share) = s.strip_prefix(r"\\") {
        PathBuf::from(format!(r"\\?\UNC\{}", share))
    } else {
        PathBuf::from(format!(r"\\?\{}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree(root: &Path) {
        fs::create_dir_all(root.join("sub/deeper")).unwrap();
        fs::write(root.join("top.txt"), "top").unwrap();
        fs::write(root.join("sub/deeper/leaf.txt"), "leaf").unwrap();
    }

    #[test]
    fn test_copy_dir() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        tree(&src);

        copy_dir(&src, &dst, false).unwrap();
        assert_eq!(fs::read_to_string(dst.join("sub/deeper/leaf.txt")).unwrap(), "leaf");
        assert!(src.join("top.txt").exists());
    }

    #[test]
    fn test_copy_dir_merge() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        tree(&src);
        fs::create_dir_all(&dst).unwrap();
        fs::write(dst.join("kept.txt"), "kept").unwrap();

        assert!(matches!(
            copy_dir(&src, &dst, false),
            Err(OpsError::AlreadyExists(_))
        ));

        copy_dir(&src, &dst, true).unwrap();
        assert!(dst.join("kept.txt").exists());
        assert!(dst.join("top.txt").exists());
    }

    #[test]
    fn test_move_file_recursive_creates_dirs() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a.txt");
        fs::write(&source, "a").unwrap();
        let base = tmp.path().join("base");

        let target = move_file_recursive(&source, &base, Path::new("x/y/a.txt")).unwrap();
        assert_eq!(target, base.join("x/y/a.txt"));
        assert!(target.exists());
        assert!(!source.exists());
    }

    #[test]
    fn test_copy_file_recursive() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a.txt");
        fs::write(&source, "a").unwrap();

        let target = copy_file_recursive(&source, tmp.path(), Path::new("n/a.txt")).unwrap();
        assert!(target.exists());
        assert!(source.exists());

        assert!(matches!(
            copy_file_recursive(&source, tmp.path(), &tmp.path().join("abs.txt")),
            Err(OpsError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_remove_path() {
        let tmp = TempDir::new().unwrap();
        tree(tmp.path());
        remove_path(&tmp.path().join("sub")).unwrap();
        remove_path(&tmp.path().join("top.txt")).unwrap();
        assert!(fs::read_dir(tmp.path()).unwrap().next().is_none());
    }
}
