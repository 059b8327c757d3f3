//! Timestamp parsing and formatting
//!
//! Upstream observations carry their timestamps as `"M:SS"` strings,
//! decimal-second strings, or bare JSON numbers. Parsing is total: anything
//! that cannot be read as a time resolves to `0.0` seconds.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A timestamp exactly as the analysis service sent it
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Timestamp {
    /// Bare numeric seconds
    Seconds(f64),
    /// `"M:SS"` or decimal-seconds text
    Text(String),
    /// Absent, null, or a JSON type that cannot carry a time
    #[default]
    Missing,
}

impl Timestamp {
    /// Resolve to seconds, coercing malformed input to `0.0`
    #[must_use]
    pub fn seconds(&self) -> f64 {
        match self {
            Self::Seconds(secs) => sanitize(*secs),
            Self::Text(text) => parse_str(text),
            Self::Missing => 0.0,
        }
    }

    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Original text form, if the source sent one
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Display form: the source text when present, otherwise `M:SS`
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Text(text) if !text.trim().is_empty() => text.trim().to_string(),
            _ => format(self.seconds()),
        }
    }
}

impl From<f64> for Timestamp {
    fn from(secs: f64) -> Self {
        Self::Seconds(secs)
    }
}

impl From<&str> for Timestamp {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Number(n) => n.as_f64().map_or(Self::Missing, Self::Seconds),
            Value::String(s) => Self::Text(s),
            _ => Self::Missing,
        })
    }
}

/// Parse a timestamp into seconds
#[must_use]
pub fn parse(ts: &Timestamp) -> f64 {
    ts.seconds()
}

/// Parse `"M:SS"` or decimal seconds. Unreadable input is `0.0`.
#[must_use]
pub fn parse_str(ts: &str) -> f64 {
    let ts = ts.trim();
    if ts.is_empty() {
        return 0.0;
    }

    let parts: Vec<&str> = ts.split(':').collect();
    let secs = if parts.len() == 2 {
        match (parts[0].trim().parse::<f64>(), parts[1].trim().parse::<f64>()) {
            (Ok(minutes), Ok(seconds)) => minutes * 60.0 + seconds,
            _ => 0.0,
        }
    } else {
        ts.parse::<f64>().unwrap_or(0.0)
    };

    sanitize(secs)
}

/// Format seconds as `M:SS` (floored to the whole second)
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format(seconds: f64) -> String {
    let whole = sanitize(seconds).floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

fn sanitize(secs: f64) -> f64 {
    if secs.is_finite() && secs > 0.0 {
        secs
    } else {
        0.0
    }
}
