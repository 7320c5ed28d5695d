//! Per-user well-known folders

use crate::{OpsError, Result};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownFolder {
    Desktop,
    StartMenu,
}

impl KnownFolder {
    pub fn name(self) -> &'static str {
        match self {
            KnownFolder::Desktop => "desktop",
            KnownFolder::StartMenu => "start menu",
        }
    }
}

/// Resolve a known folder, logging and failing when it cannot be found.
///
/// Callers generally have no way to continue without it.
pub fn known_folder(folder: KnownFolder) -> Result<PathBuf> {
    optional_known_folder(folder).ok_or_else(|| {
        tracing::error!("failed to get known folder '{}'", folder.name());
        OpsError::KnownFolder(folder.name().to_string())
    })
}

/// Same as [`known_folder`], without logging
pub fn optional_known_folder(folder: KnownFolder) -> Option<PathBuf> {
    match folder {
        KnownFolder::Desktop => dirs_next::desktop_dir()
            .or_else(|| dirs_next::home_dir().map(|home| home.join("Desktop"))),
        KnownFolder::StartMenu => start_menu_dir(),
    }
}

#[cfg(windows)]
fn start_menu_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|roaming| roaming.join(r"Microsoft\Windows\Start Menu"))
}

#[cfg(target_os = "macos")]
fn start_menu_dir() -> Option<PathBuf> {
    Some(PathBuf::from("/Applications"))
}

#[cfg(not(any(windows, target_os = "macos")))]
fn start_menu_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|data| data.join("applications"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_matches_optional() {
        for folder in [KnownFolder::Desktop, KnownFolder::StartMenu] {
            match optional_known_folder(folder) {
                Some(path) => assert_eq!(known_folder(folder).unwrap(), path),
                None => assert!(matches!(
                    known_folder(folder),
                    Err(OpsError::KnownFolder(_))
                )),
            }
        }
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    #[test]
    fn test_start_menu_is_applications_dir() {
        if let Some(path) = optional_known_folder(KnownFolder::StartMenu) {
            assert!(path.ends_with("applications"));
        }
    }
}
