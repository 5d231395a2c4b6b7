//! rtt-media: segment planning and HLS playlist generation.
//!
//! # Modules
//!
//! - [`plan`] - Cut a video's timeline into contiguous segment windows
//! - [`hls`] - Render a plan as an HLS media playlist (M3U8)

pub mod hls;
pub mod plan;

// Re-export commonly used items at the crate root.
pub use hls::{generate_media_playlist, MediaPlaylist, Segment, SegmentUriBuilder};
pub use plan::SegmentPlan;
