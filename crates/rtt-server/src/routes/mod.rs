//! Route handlers for the HTTP surface.

pub mod playlist;
pub mod root;
pub mod segment;

use rtt_core::{PlanningStrategy, Result, VideoAsset};
use rtt_media::SegmentPlan;

use crate::context::AppContext;

/// Plan `asset` with the configured strategy.
///
/// Keyframe planning runs ffprobe a second time and records the key
/// pictures on `asset`.
pub(crate) async fn plan_for(ctx: &AppContext, asset: &mut VideoAsset) -> Result<SegmentPlan> {
    match ctx.config.segment.strategy {
        PlanningStrategy::Fixed => {
            Ok(SegmentPlan::fixed(asset.duration, ctx.segment_length_secs()))
        }
        PlanningStrategy::Keyframe => {
            let keyframes = ctx.keyframes.extract(&asset.path, asset.time_base).await?;
            let plan = SegmentPlan::keyframe_aligned(asset.duration, &keyframes);
            asset.keyframes = Some(keyframes);
            Ok(plan)
        }
    }
}
