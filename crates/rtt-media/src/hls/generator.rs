//! HLS playlist generation functions.

use std::fmt;

use super::types::{MediaPlaylist, Segment, HLS_VERSION};
use super::uri::SegmentUriBuilder;
use crate::plan::SegmentPlan;

impl MediaPlaylist {
    /// Playlist for `plan`, with one entry per window in plan order.
    ///
    /// The target duration is the longest window rounded up to whole
    /// seconds.
    pub fn from_plan(plan: &SegmentPlan, uris: &SegmentUriBuilder) -> Self {
        let segments = plan
            .windows
            .iter()
            .map(|window| Segment {
                duration: window.duration,
                uri: uris.uri(plan.strategy, window),
            })
            .collect();

        Self {
            target_duration: plan.max_duration().ceil_secs(),
            segments,
        }
    }
}

impl fmt::Display for MediaPlaylist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#EXTM3U")?;
        writeln!(f, "#EXT-X-VERSION:{HLS_VERSION}")?;
        writeln!(f, "#EXT-X-TARGETDURATION:{}", self.target_duration)?;
        writeln!(f, "#EXT-X-PLAYLIST-TYPE:VOD")?;

        for segment in &self.segments {
            writeln!(f, "#EXTINF:{},", segment.duration)?;
            writeln!(f, "{}", segment.uri)?;
        }

        writeln!(f, "#EXT-X-ENDLIST")
    }
}

/// Generate an HLS media playlist (M3U8) from a [`MediaPlaylist`].
///
/// Output includes:
/// - `#EXTM3U` header and `#EXT-X-VERSION:3`
/// - `#EXT-X-TARGETDURATION`
/// - `#EXT-X-PLAYLIST-TYPE:VOD`
/// - `#EXTINF` with four-decimal duration for each segment
/// - `#EXT-X-ENDLIST`
pub fn generate_media_playlist(playlist: &MediaPlaylist) -> String {
    playlist.to_string()
}
