//! HLS playlist generation.
//!
//! This module renders a [`SegmentPlan`](crate::plan::SegmentPlan) as an
//! M3U8 media playlist whose segment URIs point back at the transcoding
//! route.

mod generator;
mod types;
mod uri;

pub use generator::generate_media_playlist;
pub use types::{MediaPlaylist, Segment, HLS_VERSION};
pub use uri::{urlencoded, SegmentUriBuilder, SEGMENT_ROUTE};
