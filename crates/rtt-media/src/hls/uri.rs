//! Segment URI construction.
//!
//! Every URI carries the client path and the audio flag; the window is
//! addressed by index in fixed mode and by start/duration in keyframe mode.
//! Times are printed with four decimals so they parse back to the same
//! ticks.

use rtt_core::{PlanningStrategy, SegmentWindow};

/// Route that serves transcoded segments.
pub const SEGMENT_ROUTE: &str = "/video/rttSegment";

/// Builds segment URIs for one asset.
#[derive(Debug, Clone)]
pub struct SegmentUriBuilder {
    base: String,
}

impl SegmentUriBuilder {
    /// `path` is the client-supplied relative path, not the resolved one.
    pub fn new(path: &str, has_audio: bool) -> Self {
        Self {
            base: format!(
                "{SEGMENT_ROUTE}?path={}&audio={}",
                urlencoded(path),
                u8::from(has_audio)
            ),
        }
    }

    pub fn uri(&self, strategy: PlanningStrategy, window: &SegmentWindow) -> String {
        match strategy {
            PlanningStrategy::Fixed => format!("{}&segment={}", self.base, window.index),
            PlanningStrategy::Keyframe => format!(
                "{}&start={}&duration={}",
                self.base, window.start, window.duration
            ),
        }
    }
}

/// Percent-encode a query component.
///
/// Leaves ASCII alphanumerics and `-_.!~*'()` untouched and encodes every
/// other UTF-8 byte as `%XX`, so `/` and spaces are escaped too.
pub fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(b as char),
            _ => {
                out.push('%');
                out.push(char::from(HEX[(b >> 4) as usize]));
                out.push(char::from(HEX[(b & 0x0f) as usize]));
            }
        }
    }
    out
}

const HEX: [u8; 16] = *b"0123456789ABCDEF";

#[cfg(test)]
mod tests {
    use super::*;
    use rtt_core::Timestamp;

    #[test]
    fn encodes_like_a_uri_component() {
        assert_eq!(urlencoded("movies/a b.mkv"), "movies%2Fa%20b.mkv");
        assert_eq!(urlencoded("x&y=z?#"), "x%26y%3Dz%3F%23");
        assert_eq!(urlencoded("(it's)!~*"), "(it's)!~*");
        assert_eq!(urlencoded("電影.mp4"), "%E9%9B%BB%E5%BD%B1.mp4");
        assert_eq!(urlencoded("100%"), "100%25");
    }

    #[test]
    fn fixed_uri_uses_index() {
        let builder = SegmentUriBuilder::new("shows/ep 1.mkv", true);
        let window = SegmentWindow {
            index: 2,
            start: Timestamp::from_whole_secs(10),
            duration: Timestamp::from_ticks(23_000),
        };
        assert_eq!(
            builder.uri(PlanningStrategy::Fixed, &window),
            "/video/rttSegment?path=shows%2Fep%201.mkv&audio=1&segment=2"
        );
    }

    #[test]
    fn keyframe_uri_uses_times() {
        let builder = SegmentUriBuilder::new("a.mp4", false);
        let window = SegmentWindow {
            index: 0,
            start: Timestamp::from_ticks(41_708),
            duration: Timestamp::from_ticks(5),
        };
        assert_eq!(
            builder.uri(PlanningStrategy::Keyframe, &window),
            "/video/rttSegment?path=a.mp4&audio=0&start=4.1708&duration=0.0005"
        );
    }
}
