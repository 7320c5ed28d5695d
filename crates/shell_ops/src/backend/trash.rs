//! Trash / recycle bin access for the spawn backend

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrashError {
    #[error("Trash error: {0}")]
    Facility(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(feature = "trash-support")]
impl From<trash::Error> for TrashError {
    fn from(e: trash::Error) -> Self {
        TrashError::Facility(e.to_string())
    }
}

/// Reversible delete facility
pub trait TrashBin: Send + Sync {
    /// Whether trashing can be attempted at all on this system
    fn is_available(&self) -> bool;

    /// Move all `paths` to the trash
    fn move_to_trash(&self, paths: &[PathBuf]) -> Result<(), TrashError>;
}

/// The desktop trash, through the `trash` crate
#[cfg(feature = "trash-support")]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTrash;

#[cfg(feature = "trash-support")]
impl TrashBin for SystemTrash {
    fn is_available(&self) -> bool {
        true
    }

    fn move_to_trash(&self, paths: &[PathBuf]) -> Result<(), TrashError> {
        trash::delete_all(paths)?;
        tracing::info!("Moved {} item(s) to trash", paths.len());
        Ok(())
    }
}

/// Stand-in used when the build or the platform has no trash
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTrash;

impl TrashBin for NoTrash {
    fn is_available(&self) -> bool {
        false
    }

    fn move_to_trash(&self, _paths: &[PathBuf]) -> Result<(), TrashError> {
        Err(TrashError::Facility("no trash available".to_string()))
    }
}

/// The trash the native backend uses by default
pub(crate) fn default_trash() -> Box<dyn TrashBin> {
    #[cfg(feature = "trash-support")]
    {
        Box::new(SystemTrash)
    }

    #[cfg(not(feature = "trash-support"))]
    {
        Box::new(NoTrash)
    }
}
