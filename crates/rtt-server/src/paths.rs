//! Client path confinement.
//!
//! Every client-supplied path is joined onto the root directory and
//! canonicalized (symlinks and `..` resolved) before the containment check,
//! which compares path components of the canonical forms.

use std::fs::Metadata;
use std::path::{Path, PathBuf};

use rtt_core::{Error, Result};

/// Resolves client paths inside a fixed root directory.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Canonicalize `root` once; it must exist.
    pub fn new(root: &Path) -> Result<Self> {
        let root = std::fs::canonicalize(root).map_err(|source| Error::PathResolution {
            path: root.to_path_buf(),
            source,
        })?;
        Ok(Self { root })
    }

    /// The canonical root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Canonical absolute path of `relative` under the root.
    ///
    /// # Errors
    ///
    /// - [`Error::PathResolution`] if the joined path cannot be canonicalized
    ///   (missing component, permission denied).
    /// - [`Error::PathTraversal`] if the canonical path lies outside the root.
    pub async fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let joined = self.root.join(relative);

        let canonical = tokio::fs::canonicalize(&joined).await.map_err(|source| {
            tracing::debug!(path = %joined.display(), error = %source, "Path resolution failed");
            Error::PathResolution {
                path: joined.clone(),
                source,
            }
        })?;

        if !canonical.starts_with(&self.root) {
            tracing::warn!(
                requested = relative,
                resolved = %canonical.display(),
                "Rejected path outside root directory"
            );
            return Err(Error::PathTraversal { path: canonical });
        }

        Ok(canonical)
    }

    /// Like [`resolve`](Self::resolve), but the target must be a regular
    /// file.
    ///
    /// # Errors
    ///
    /// As for `resolve`, plus [`Error::NotFound`] when the target is not a
    /// regular file and [`Error::PathResolution`] when it cannot be statted.
    pub async fn resolve_file(&self, relative: &str) -> Result<PathBuf> {
        let canonical = self.resolve(relative).await?;
        let metadata = tokio::fs::metadata(&canonical).await;
        require_file(canonical, metadata, relative)
    }
}

fn require_file(
    canonical: PathBuf,
    metadata: std::io::Result<Metadata>,
    relative: &str,
) -> Result<PathBuf> {
    match metadata {
        Ok(metadata) if metadata.is_file() => Ok(canonical),
        Ok(_) => Err(Error::not_found("video", relative)),
        Err(source) => Err(Error::PathResolution {
            path: canonical,
            source,
        }),
    }
}
