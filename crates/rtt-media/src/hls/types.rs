//! HLS playlist types.

use rtt_core::Timestamp;
use serde::{Deserialize, Serialize};

/// Protocol version declared by every generated playlist.
pub const HLS_VERSION: u8 = 3;

/// A single segment in a media playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Segment duration, printed with four decimals.
    pub duration: Timestamp,
    /// URI for this segment.
    pub uri: String,
}

/// A complete video-on-demand media playlist.
///
/// Rendered with `#EXT-X-PLAYLIST-TYPE:VOD` and closed with
/// `#EXT-X-ENDLIST`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaPlaylist {
    /// Maximum segment duration in integer seconds (rounded up).
    pub target_duration: u64,
    /// Ordered list of segments.
    pub segments: Vec<Segment>,
}
