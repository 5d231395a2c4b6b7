//! Sidecar subtitle lookup.
//!
//! Looks beside a video for an ASS subtitle named after it. Nothing is
//! muxed; the result is only reported to the log.

use std::path::{Path, PathBuf};

/// First existing sidecar for `video`: `<stem>.ass`, then `<name>.<ext>.ass`.
pub async fn find_sidecar_subtitle(video: &Path) -> Option<PathBuf> {
    let dir = video.parent()?;
    let stem = video.file_stem()?.to_string_lossy();
    let name = video.file_name()?.to_string_lossy();

    for candidate in [format!("{stem}.ass"), format!("{name}.ass")] {
        let candidate = dir.join(candidate);
        if let Ok(metadata) = tokio::fs::metadata(&candidate).await {
            if metadata.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}
