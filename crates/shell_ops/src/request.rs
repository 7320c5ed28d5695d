//! Batched file operation requests

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("{destinations} destinations for {sources} sources: expected one per source or a single shared destination")]
    DestinationCount { sources: usize, destinations: usize },
}

/// Kind of batched file operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Copy,
    Move,
    Rename,
    Delete,
}

impl OperationKind {
    pub fn verb(self) -> &'static str {
        match self {
            OperationKind::Copy => "copy",
            OperationKind::Move => "move",
            OperationKind::Rename => "rename",
            OperationKind::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationFlags {
    /// Send deleted files to the trash instead of erasing them
    pub recycle: bool,
    /// Suppress any native progress or confirmation UI
    pub silent: bool,
    /// Answer "yes" to overwrite confirmations
    pub yes_to_all: bool,
}

/// How destinations pair up with sources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationLayout {
    /// Pure delete, no destinations
    None,
    /// Every source goes to the same destination
    Shared,
    /// One destination per source
    PerSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRequest {
    pub kind: OperationKind,
    pub sources: Vec<PathBuf>,
    pub destinations: Vec<PathBuf>,
    pub flags: OperationFlags,
}

impl OperationRequest {
    pub fn new(
        kind: OperationKind,
        sources: Vec<PathBuf>,
        destinations: Vec<PathBuf>,
        flags: OperationFlags,
    ) -> Self {
        Self {
            kind,
            sources,
            destinations,
            flags,
        }
    }

    pub fn delete(sources: Vec<PathBuf>, recycle: bool) -> Self {
        Self::new(
            OperationKind::Delete,
            sources,
            Vec::new(),
            OperationFlags {
                recycle,
                ..Default::default()
            },
        )
    }

    /// Check the source/destination pairing before anything is attempted
    pub fn validate(&self) -> Result<DestinationLayout, RequestError> {
        let sources = self.sources.len();
        let destinations = self.destinations.len();

        if destinations == sources && destinations > 0 {
            Ok(DestinationLayout::PerSource)
        } else if destinations == 1 {
            Ok(DestinationLayout::Shared)
        } else if destinations == 0 && self.kind == OperationKind::Delete {
            Ok(DestinationLayout::None)
        } else {
            Err(RequestError::DestinationCount {
                sources,
                destinations,
            })
        }
    }

    /// Whether trash semantics apply
    pub fn recycles(&self) -> bool {
        self.kind == OperationKind::Delete && self.flags.recycle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    fn request(kind: OperationKind, sources: &[&str], destinations: &[&str]) -> OperationRequest {
        OperationRequest::new(kind, paths(sources), paths(destinations), Default::default())
    }

    #[test]
    fn test_per_source() {
        let r = request(OperationKind::Copy, &["a", "b"], &["x", "y"]);
        assert_eq!(r.validate(), Ok(DestinationLayout::PerSource));
    }

    #[test]
    fn test_shared_destination() {
        let r = request(OperationKind::Copy, &["a.txt", "b.txt"], &["/dst"]);
        assert_eq!(r.validate(), Ok(DestinationLayout::Shared));
    }

    #[test]
    fn test_delete_without_destinations() {
        let r = request(OperationKind::Delete, &["a", "b", "c"], &[]);
        assert_eq!(r.validate(), Ok(DestinationLayout::None));
    }

    #[test]
    fn test_mismatched_counts() {
        for (kind, sources, destinations) in [
            (OperationKind::Copy, &["a", "b", "c"][..], &["x", "y"][..]),
            (OperationKind::Move, &["a"][..], &[][..]),
            (OperationKind::Rename, &["a", "b"][..], &["x", "y", "z"][..]),
            (OperationKind::Delete, &["a", "b", "c"][..], &["x", "y"][..]),
        ] {
            let r = request(kind, sources, destinations);
            assert_eq!(
                r.validate(),
                Err(RequestError::DestinationCount {
                    sources: sources.len(),
                    destinations: destinations.len(),
                })
            );
        }
    }

    #[test]
    fn test_recycle_only_for_delete() {
        let mut r = request(OperationKind::Copy, &["a"], &["b"]);
        r.flags.recycle = true;
        assert!(!r.recycles());
        assert!(OperationRequest::delete(paths(&["a"]), true).recycles());
    }
}
