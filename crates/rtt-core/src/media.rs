//! Media-domain types: fixed-precision timestamps, stream time bases, the
//! probed [`VideoAsset`], planned [`SegmentWindow`]s, and the planning
//! strategy selector.
//!
//! All times flowing through the pipeline are [`Timestamp`]s, an integer
//! count of ten-thousandths of a second. Rounding to that precision happens
//! exactly once, where a float enters the system (probe output, keyframe
//! PTS, query parameters); everything after that is integer arithmetic, so
//! segment durations always sum to the probed total.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// Number of fractional decimal digits kept for every time value.
pub const PRECISION: u32 = 4;

/// Ticks per second at [`PRECISION`].
pub const TICKS_PER_SEC: u64 = 10_u64.pow(PRECISION);

/// Absorbs binary representation noise before ceiling, so that
/// `0.1 * 3` ceils to `0.3` rather than `0.3001`.
const NOISE: f64 = 1e-6;

/// A non-negative point in (or span of) media time, in units of
/// 1/[`TICKS_PER_SEC`] seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Zero seconds.
    pub const ZERO: Timestamp = Timestamp(0);

    /// Build from a raw tick count.
    pub const fn from_ticks(ticks: u64) -> Self {
        Self(ticks)
    }

    /// Build from whole seconds.
    pub const fn from_whole_secs(secs: u64) -> Self {
        Self(secs * TICKS_PER_SEC)
    }

    /// Round `secs` to the nearest tick (half away from zero).
    ///
    /// Returns `None` for negative or non-finite input.
    pub fn from_secs_round(secs: f64) -> Option<Self> {
        Self::convert(secs, f64::round)
    }

    /// Round `secs` up to a tick.
    pub fn from_secs_ceil(secs: f64) -> Option<Self> {
        Self::convert(secs, |t| (t - NOISE).ceil())
    }

    fn convert(secs: f64, op: impl Fn(f64) -> f64) -> Option<Self> {
        if !secs.is_finite() || secs < 0.0 {
            return None;
        }
        let ticks = op(secs * TICKS_PER_SEC as f64);
        if ticks < 0.0 || ticks > u64::MAX as f64 {
            return None;
        }
        Some(Self(ticks as u64))
    }

    /// Raw tick count.
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Half of this value, rounded half up to a tick.
    pub const fn halved(self) -> Self {
        Self(self.0.div_ceil(2))
    }

    /// Smallest whole number of seconds not less than this value.
    pub const fn ceil_secs(self) -> u64 {
        self.0.div_ceil(TICKS_PER_SEC)
    }

    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl std::ops::Add for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl fmt::Display for Timestamp {
    /// Always prints exactly [`PRECISION`] decimals, e.g. `5.0000`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:0width$}",
            self.0 / TICKS_PER_SEC,
            self.0 % TICKS_PER_SEC,
            width = PRECISION as usize
        )
    }
}

// ---------------------------------------------------------------------------
// TimeBase
// ---------------------------------------------------------------------------

/// Rational unit of a stream's presentation timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBase {
    pub num: u64,
    pub den: u64,
}

impl TimeBase {
    /// Millisecond time base, used when a stream does not report one.
    pub const MILLIS: TimeBase = TimeBase { num: 1, den: 1000 };

    /// Parse `"num/den"`. Returns `None` for anything unusable, including a
    /// zero numerator or denominator.
    pub fn parse(s: &str) -> Option<Self> {
        let (num, den) = s.trim().split_once('/')?;
        let num: u64 = num.trim().parse().ok()?;
        let den: u64 = den.trim().parse().ok()?;
        if num == 0 || den == 0 {
            return None;
        }
        Some(Self { num, den })
    }

    /// Convert a PTS in this unit to seconds.
    pub fn to_secs(self, pts: i64) -> f64 {
        pts as f64 * self.num as f64 / self.den as f64
    }
}

impl Default for TimeBase {
    fn default() -> Self {
        Self::MILLIS
    }
}

impl fmt::Display for TimeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

// ---------------------------------------------------------------------------
// VideoAsset
// ---------------------------------------------------------------------------

/// A probed source file. Derived fresh for every request and never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoAsset {
    /// Canonical absolute path inside the root directory.
    pub path: PathBuf,
    /// Total duration, rounded to [`PRECISION`].
    pub duration: Timestamp,
    /// Whether the file carries an audio stream.
    pub has_audio: bool,
    /// Time base of the first video stream.
    pub time_base: TimeBase,
    /// Keyframe start times, when they were extracted.
    pub keyframes: Option<Vec<Timestamp>>,
}

// ---------------------------------------------------------------------------
// SegmentWindow
// ---------------------------------------------------------------------------

/// One planned segment of the presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentWindow {
    /// Ordinal position in the plan, starting at 0.
    pub index: usize,
    pub start: Timestamp,
    pub duration: Timestamp,
}

impl SegmentWindow {
    /// Exclusive end of the window.
    pub fn end(&self) -> Timestamp {
        self.start + self.duration
    }
}

// ---------------------------------------------------------------------------
// PlanningStrategy
// ---------------------------------------------------------------------------

/// How a video's timeline is cut into segments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanningStrategy {
    /// Constant nominal length, addressed by segment index.
    #[default]
    Fixed,
    /// One segment per keyframe, addressed by start/duration.
    Keyframe,
}

impl fmt::Display for PlanningStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed => write!(f, "fixed"),
            Self::Keyframe => write!(f, "keyframe"),
        }
    }
}

impl FromStr for PlanningStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" => Ok(Self::Fixed),
            "keyframe" | "keyframes" => Ok(Self::Keyframe),
            other => Err(format!(
                "unknown planning strategy '{other}' (expected fixed or keyframe)"
            )),
        }
    }
}
