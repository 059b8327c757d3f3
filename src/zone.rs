//! Severity zones and keyword classification
//!
//! Labels are classified against static, ordered keyword tables. Tables are
//! tested red, then yellow, then green; the first hit wins. A label that
//! matches nothing lands in [`Zone::Yellow`] so a classification miss never
//! reads as "safe".

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity classification of an observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    /// Low: relaxed, comfortable
    Green,
    /// Moderate: alert, mildly aroused. Also the fallback for unknown labels.
    #[default]
    Yellow,
    /// Elevated: stress or discomfort
    Red,
}

impl Zone {
    /// Parse an explicit zone tag (case-insensitive)
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "green" => Some(Self::Green),
            "yellow" => Some(Self::Yellow),
            "red" => Some(Self::Red),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
        }
    }

    /// Assessment label shown next to an overall score
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Green => "LOW",
            Self::Yellow => "MODERATE",
            Self::Red => "ELEVATED",
        }
    }

    /// Short badge text for list rows
    #[must_use]
    pub fn badge(self) -> &'static str {
        match self {
            Self::Green => "Low",
            Self::Yellow => "Med",
            Self::Red => "High",
        }
    }

    /// Band a 0-100 distress score: 0-33 green, 34-66 yellow, 67+ red
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score <= 33.0 {
            Self::Green
        } else if score <= 66.0 {
            Self::Yellow
        } else {
            Self::Red
        }
    }

    /// Representative score for an observation that only carries a zone
    #[must_use]
    pub fn default_score(self) -> f64 {
        match self {
            Self::Green => 25.0,
            Self::Yellow => 50.0,
            Self::Red => 75.0,
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered `(zone, keywords)` rows; earlier rows take priority
#[derive(Debug)]
pub struct KeywordTable {
    rows: &'static [(Zone, &'static [&'static str])],
}

impl KeywordTable {
    #[must_use]
    pub const fn new(rows: &'static [(Zone, &'static [&'static str])]) -> Self {
        Self { rows }
    }

    /// First zone whose keyword set has a substring hit in `text`
    #[must_use]
    pub fn lookup(&self, text: &str) -> Option<Zone> {
        let text = text.to_lowercase();
        self.rows
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
            .map(|(zone, _)| *zone)
    }
}

/// Body-language and free-text labels
pub static BEHAVIOR_KEYWORDS: KeywordTable = KeywordTable::new(&[
    (
        Zone::Red,
        &[
            "stress", "fear", "distress", "aggressive", "growl", "hiss", "flat", "tuck", "whale",
        ],
    ),
    (
        Zone::Yellow,
        &["alert", "bark", "whine", "tense", "forward", "demand", "meow"],
    ),
    (
        Zone::Green,
        &["relax", "calm", "play", "soft", "purr", "loose"],
    ),
]);

/// Vocalization `type subtype` strings
pub static VOCALIZATION_KEYWORDS: KeywordTable = KeywordTable::new(&[
    (
        Zone::Red,
        &[
            "distress", "alarm", "pain", "fear", "aggressive", "threat", "growl", "hiss", "scream",
        ],
    ),
    (
        Zone::Yellow,
        &[
            "demand", "frustrat", "alert", "complaint", "whine", "urgent", "bark", "excitement",
        ],
    ),
    (
        Zone::Green,
        &["play", "happy", "relax", "greeting", "friendly", "purr"],
    ),
]);

/// Maps a label (or an explicit tag) to a [`Zone`]
#[derive(Debug, Clone, Copy)]
pub struct ZoneClassifier {
    table: &'static KeywordTable,
}

impl ZoneClassifier {
    /// Classifier for behavioral and interpretation labels
    #[must_use]
    pub fn behavior() -> Self {
        Self {
            table: &BEHAVIOR_KEYWORDS,
        }
    }

    /// Classifier for vocalization type/subtype strings
    #[must_use]
    pub fn vocalization() -> Self {
        Self {
            table: &VOCALIZATION_KEYWORDS,
        }
    }

    /// Classify a label. A recognized explicit zone wins outright.
    #[must_use]
    pub fn classify(&self, label: &str, explicit: Option<&str>) -> Zone {
        if let Some(zone) = explicit.and_then(Zone::parse) {
            return zone;
        }
        self.table.lookup(label).unwrap_or_default()
    }
}

impl Default for ZoneClassifier {
    fn default() -> Self {
        Self::behavior()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_zone_wins() {
        let c = ZoneClassifier::behavior();
        assert_eq!(c.classify("growling at the door", Some("green")), Zone::Green);
        assert_eq!(c.classify("relaxed", Some("RED")), Zone::Red);
    }

    #[test]
    fn test_unknown_explicit_tag_falls_through() {
        let c = ZoneClassifier::behavior();
        assert_eq!(c.classify("soft eyes", Some("neutral")), Zone::Green);
    }

    #[test]
    fn test_priority_red_before_green() {
        // "play" (green) and "growl" (red) both hit; red is tested first
        let c = ZoneClassifier::behavior();
        assert_eq!(c.classify("Play growl", None), Zone::Red);
        assert_eq!(c.classify("Alert but relaxed", None), Zone::Yellow);
    }

    #[test]
    fn test_case_insensitive() {
        let c = ZoneClassifier::behavior();
        assert_eq!(c.classify("WHALE EYE", None), Zone::Red);
        assert_eq!(c.classify("Loose Body", None), Zone::Green);
    }

    #[test]
    fn test_miss_defaults_to_caution() {
        let c = ZoneClassifier::behavior();
        assert_eq!(c.classify("sniffing the carpet", None), Zone::Yellow);
        assert_eq!(c.classify("", None), Zone::Yellow);
    }

    #[test]
    fn test_vocalization_table() {
        let c = ZoneClassifier::vocalization();
        assert_eq!(c.classify("Growl ", None), Zone::Red);
        assert_eq!(c.classify("bark frustrated", None), Zone::Yellow);
        assert_eq!(c.classify("greeting whimper", None), Zone::Green);
        assert_eq!(c.classify("howl", None), Zone::Yellow);
    }

    #[test]
    fn test_score_banding() {
        assert_eq!(Zone::from_score(0.0), Zone::Green);
        assert_eq!(Zone::from_score(33.0), Zone::Green);
        assert_eq!(Zone::from_score(34.0), Zone::Yellow);
        assert_eq!(Zone::from_score(66.0), Zone::Yellow);
        assert_eq!(Zone::from_score(67.0), Zone::Red);
    }

    #[test]
    fn test_zone_serde() {
        let json = serde_json::to_string(&Zone::Red).unwrap();
        assert_eq!(json, "\"red\"");
        let zone: Zone = serde_json::from_str("\"green\"").unwrap();
        assert_eq!(zone, Zone::Green);
    }
}
