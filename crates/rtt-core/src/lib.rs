//! rtt-core: shared types, errors, and configuration.
//!
//! This crate is the foundational dependency for all other rtt-* crates,
//! providing the fixed-precision [`Timestamp`], the request-scoped media
//! model ([`VideoAsset`], [`SegmentWindow`]), a unified error type, and the
//! application configuration.

pub mod config;
pub mod error;
pub mod media;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use media::*;
