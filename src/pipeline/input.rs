//! Input resolution: classify a user-supplied path as a file or a folder.
//!
//! The extractor behaves differently for the two: a single file propagates
//! its extraction error, a folder scan skips failing files. Resolving up
//! front also turns a missing path into [`JobAdError::SourceNotFound`] before
//! any work starts.

use crate::error::JobAdError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The resolved source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedInput {
    /// A single document.
    File(PathBuf),
    /// A directory to scan recursively.
    Folder(PathBuf),
}

impl ResolvedInput {
    /// Get the underlying path regardless of kind.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::File(p) | ResolvedInput::Folder(p) => p,
        }
    }
}

/// Resolve `input` to a file or folder, failing if it does not exist.
pub fn resolve_input(input: impl AsRef<Path>) -> Result<ResolvedInput, JobAdError> {
    let path = input.as_ref().to_path_buf();

    let meta = std::fs::metadata(&path).map_err(|_| JobAdError::SourceNotFound {
        path: path.clone(),
    })?;

    if meta.is_dir() {
        debug!("Resolved folder source: {}", path.display());
        Ok(ResolvedInput::Folder(path))
    } else {
        debug!("Resolved file source: {}", path.display());
        Ok(ResolvedInput::File(path))
    }
}
