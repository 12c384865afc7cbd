/// Exercise segments and their playback windows
///
/// Segments arrive from the analysis service with a textual range in the form
/// `hh:mm:ss-hh:mm:ss`. Parsing is permissive: a malformed half resolves to
/// zero seconds instead of failing.
use serde::{Deserialize, Serialize};
use std::fmt;

/// One detected exercise within a video
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    /// Exercise name
    #[serde(rename = "name_of_exercise", alias = "name")]
    pub name: String,
    /// Free-form description of the exercise
    #[serde(default)]
    pub description: String,
    /// Time range as `hh:mm:ss-hh:mm:ss`
    #[serde(rename = "timestamp", alias = "timestampRange", alias = "timestamp_range")]
    pub timestamp_range: String,
}

impl Segment {
    pub fn new(name: impl Into<String>, description: impl Into<String>, timestamp_range: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            timestamp_range: timestamp_range.into(),
        }
    }

    /// Parsed playback window for this segment
    pub fn window(&self) -> PlaybackWindow {
        parse_timestamp_range(&self.timestamp_range)
    }

    /// Replace the segment's range with an edited window
    pub fn set_window(&mut self, window: PlaybackWindow) {
        self.timestamp_range = window.to_range_string();
    }
}

/// Half-open interval `[start, end)` in whole seconds
///
/// `start < end` is expected but not enforced. A degenerate window pins
/// playback to `start` because every position is outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackWindow {
    pub start: u32,
    pub end: u32,
}

impl PlaybackWindow {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Whether a playback position lies inside the window
    pub fn contains(&self, position: f64) -> bool {
        position >= f64::from(self.start) && position < f64::from(self.end)
    }

    /// Whether the window can never contain a position
    pub fn is_degenerate(&self) -> bool {
        self.start >= self.end
    }

    /// Length of the window in seconds, zero when degenerate
    pub fn duration(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Format back into `hh:mm:ss-hh:mm:ss`
    pub fn to_range_string(&self) -> String {
        format!("{}-{}", format_clock(self.start), format_clock(self.end))
    }
}

impl fmt::Display for PlaybackWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}s, {}s)", self.start, self.end)
    }
}

/// Parse `hh:mm:ss-hh:mm:ss` into a playback window
///
/// Text after a second `-` is ignored. A missing or malformed half is 0.
pub fn parse_timestamp_range(range: &str) -> PlaybackWindow {
    let mut halves = range.split('-');
    let start = halves.next().map(time_to_seconds).unwrap_or(0);
    let end = halves.next().map(time_to_seconds).unwrap_or(0);
    PlaybackWindow { start, end }
}

/// Convert `hh:mm:ss` to seconds, or 0 when it is not three integer parts
pub fn time_to_seconds(time: &str) -> u32 {
    let parts: Vec<&str> = time.split(':').collect();
    if parts.len() != 3 {
        return 0;
    }

    let parsed: Option<Vec<u32>> = parts.iter().map(|p| p.trim().parse::<u32>().ok()).collect();
    let Some(values) = parsed else {
        return 0;
    };

    values[0]
        .checked_mul(3600)
        .and_then(|h| values[1].checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(values[2]))
        .unwrap_or(0)
}

/// Format seconds as `hh:mm:ss`
pub fn format_clock(total_seconds: u32) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
