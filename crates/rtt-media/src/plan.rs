//! Segment planning.
//!
//! A [`SegmentPlan`] cuts a video's timeline into contiguous
//! [`SegmentWindow`]s. Both strategies work in integer ticks, so the window
//! durations always sum to exactly the probed total and a window can be
//! reproduced bit-for-bit when a segment is requested later.

use rtt_core::{PlanningStrategy, SegmentWindow, Timestamp};
use serde::{Deserialize, Serialize};

/// Ordered, gap-free windows covering `[0, total)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentPlan {
    /// Strategy that produced the windows.
    pub strategy: PlanningStrategy,
    /// Probed total duration.
    pub total: Timestamp,
    /// Windows in increasing start order, indexed from 0.
    pub windows: Vec<SegmentWindow>,
}

impl SegmentPlan {
    /// Fixed-length plan with nominal length `length_secs`.
    ///
    /// Produces `ceil(total / L)` windows. Window `i` starts at `i * L`; the
    /// last one carries the remainder. A `length_secs` of zero is treated as
    /// one second. An empty video yields an empty plan.
    pub fn fixed(total: Timestamp, length_secs: u32) -> Self {
        let length = Timestamp::from_whole_secs(u64::from(length_secs.max(1)));
        let count = total.ticks().div_ceil(length.ticks());

        let windows = (0..count)
            .map(|i| {
                let start = Timestamp::from_ticks(i * length.ticks());
                let duration = if i + 1 == count {
                    total.saturating_sub(start)
                } else {
                    length
                };
                SegmentWindow {
                    index: i as usize,
                    start,
                    duration,
                }
            })
            .collect();

        Self {
            strategy: PlanningStrategy::Fixed,
            total,
            windows,
        }
    }

    /// Keyframe-aligned plan: one window per keyframe.
    ///
    /// Keyframes at or past `total` are ignored, duplicates collapse, and a
    /// boundary at 0 is added when the first keyframe starts later. Each
    /// window runs to the next keyframe; the last runs to `total`.
    pub fn keyframe_aligned(total: Timestamp, keyframes: &[Timestamp]) -> Self {
        let mut starts: Vec<Timestamp> = keyframes
            .iter()
            .copied()
            .filter(|k| *k < total)
            .collect();
        starts.sort_unstable();
        starts.dedup();

        if total > Timestamp::ZERO && starts.first() != Some(&Timestamp::ZERO) {
            starts.insert(0, Timestamp::ZERO);
        }

        let windows = starts
            .iter()
            .enumerate()
            .map(|(index, &start)| {
                let end = starts.get(index + 1).copied().unwrap_or(total);
                SegmentWindow {
                    index,
                    start,
                    duration: end.saturating_sub(start),
                }
            })
            .collect();

        Self {
            strategy: PlanningStrategy::Keyframe,
            total,
            windows,
        }
    }

    /// Window `index`, if the plan has one.
    pub fn window(&self, index: usize) -> Option<&SegmentWindow> {
        self.windows.get(index)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Longest window duration, or zero for an empty plan.
    pub fn max_duration(&self) -> Timestamp {
        self.windows
            .iter()
            .map(|w| w.duration)
            .max()
            .unwrap_or(Timestamp::ZERO)
    }

    /// Sum of all window durations.
    pub fn covered(&self) -> Timestamp {
        self.windows
            .iter()
            .fold(Timestamp::ZERO, |acc, w| acc + w.duration)
    }
}
