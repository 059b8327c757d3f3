//! Upstream observation records
//!
//! Each source list of the analysis result has its own record shape and its
//! own legacy field names. Every record type implements [`RawObservation`],
//! which turns it into a source-neutral [`Candidate`] using an explicit,
//! ordered field-precedence resolver. The fusion engine only ever sees
//! candidates.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::timecode::Timestamp;

/// Which upstream list a marker came from, in fusion priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Explicit `timeline[]` events
    Timeline,
    /// `interpret_lines[]`
    InterpretLine,
    /// `audio_analysis.vocalizations_detected[]`
    Vocalization,
    /// `visual_analysis.key_behavioral_moments[]`
    KeyMoment,
    /// `visual_analysis.facs_codes_detected[]`, used only when nothing else yields
    FacsFallback,
}

impl SourceKind {
    /// All sources, highest priority first
    pub const PRIORITY: [Self; 5] = [
        Self::Timeline,
        Self::InterpretLine,
        Self::Vocalization,
        Self::KeyMoment,
        Self::FacsFallback,
    ];
}

/// Kind of event a marker represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    #[default]
    Behavioral,
    Audio,
    Environmental,
}

impl EventType {
    /// Read an upstream `event_type` tag; anything unknown is behavioral
    #[must_use]
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(|t| t.trim().to_ascii_lowercase()).as_deref() {
            Some("audio") => Self::Audio,
            Some("environmental") => Self::Environmental,
            _ => Self::Behavioral,
        }
    }
}

/// How the fusion engine should score a candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreRule {
    /// Score supplied by the source (or the overall assessment)
    Fixed(f64),
    /// Representative score of whichever zone the candidate resolves to
    ZoneDefault,
    /// Keyword-biased vocalization severity
    AudioKeywords,
}

/// A source-neutral observation ready for fusion
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub time: f64,
    pub label: String,
    pub event_type: EventType,
    pub explicit_zone: Option<String>,
    pub score: ScoreRule,
    pub evidence: Vec<String>,
}

/// A record from one upstream source list
pub trait RawObservation {
    /// Source list this record belongs to
    const KIND: SourceKind;

    /// Resolve time, label, and scoring inputs. `None` when the resolved
    /// label is empty.
    fn candidate(&self, overall_score: f64) -> Option<Candidate>;
}

/// First non-blank field, in precedence order
fn first_present<'a, I>(fields: I) -> Option<&'a str>
where
    I: IntoIterator<Item = Option<&'a String>>,
{
    fields
        .into_iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
}

fn non_empty(field: Option<&String>) -> Option<String> {
    first_present([field]).map(str::to_string)
}

/// Entry of the explicit `timeline[]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TimelineEvent {
    pub timestamp: Timestamp,
    #[serde(deserialize_with = "lenient")]
    pub event_description: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub event: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub context_tag: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub observation: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub event_type: Option<String>,
    #[serde(deserialize_with = "lenient_score")]
    pub distress_score: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub zone: Option<String>,
    #[serde(deserialize_with = "lenient_vec")]
    pub evidence: Vec<String>,
}

impl RawObservation for TimelineEvent {
    const KIND: SourceKind = SourceKind::Timeline;

    fn candidate(&self, overall_score: f64) -> Option<Candidate> {
        let label = first_present([
            self.event_description.as_ref(),
            self.event.as_ref(),
            self.context_tag.as_ref(),
            self.observation.as_ref(),
        ])?;

        Some(Candidate {
            time: self.timestamp.seconds(),
            label: label.to_string(),
            event_type: EventType::from_tag(self.event_type.as_deref()),
            explicit_zone: self.zone.clone(),
            score: ScoreRule::Fixed(self.distress_score.unwrap_or(overall_score)),
            evidence: self.evidence.clone(),
        })
    }
}

/// Entry of `interpret_lines[]`: a first-person reading of a moment
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InterpretLine {
    pub timestamp: Timestamp,
    #[serde(deserialize_with = "lenient")]
    pub pet_pov: Option<String>,
    /// Legacy name for `pet_pov`
    #[serde(deserialize_with = "lenient")]
    pub first_person_interpretation: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub interpretation: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub text: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub trigger: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub zone: Option<String>,
}

impl InterpretLine {
    /// Subtitle text, newest field name first
    #[must_use]
    pub fn pov_text(&self) -> Option<&str> {
        first_present([
            self.pet_pov.as_ref(),
            self.first_person_interpretation.as_ref(),
            self.interpretation.as_ref(),
            self.text.as_ref(),
        ])
    }
}

impl RawObservation for InterpretLine {
    const KIND: SourceKind = SourceKind::InterpretLine;

    fn candidate(&self, _overall_score: f64) -> Option<Candidate> {
        let label = first_present([self.trigger.as_ref()]).or_else(|| self.pov_text())?;

        Some(Candidate {
            time: self.timestamp.seconds(),
            label: label.to_string(),
            event_type: EventType::Behavioral,
            explicit_zone: self.zone.clone(),
            score: ScoreRule::ZoneDefault,
            evidence: Vec::new(),
        })
    }
}

/// Entry of `audio_analysis.vocalizations_detected[]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Vocalization {
    pub timestamp_start: Timestamp,
    pub timestamp_end: Timestamp,
    #[serde(rename = "type", deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub subtype: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub interpretation: Option<String>,
}

impl Vocalization {
    /// `"type: subtype"`, or whichever half is present
    #[must_use]
    pub fn label(&self) -> Option<String> {
        match (non_empty(self.kind.as_ref()), non_empty(self.subtype.as_ref())) {
            (Some(kind), Some(subtype)) => Some(format!("{kind}: {subtype}")),
            (Some(kind), None) => Some(kind),
            (None, subtype) => subtype,
        }
    }
}

impl RawObservation for Vocalization {
    const KIND: SourceKind = SourceKind::Vocalization;

    fn candidate(&self, _overall_score: f64) -> Option<Candidate> {
        let label = self.label()?;

        Some(Candidate {
            time: self.timestamp_start.seconds(),
            label,
            event_type: EventType::Audio,
            explicit_zone: None,
            score: ScoreRule::AudioKeywords,
            evidence: non_empty(self.interpretation.as_ref()).into_iter().collect(),
        })
    }
}

/// Entry of `audio_analysis.environmental_sounds[]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EnvironmentalSound {
    pub timestamp: Timestamp,
    #[serde(deserialize_with = "lenient")]
    pub sound: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub pet_reaction: Option<String>,
}

/// Entry of `visual_analysis.key_behavioral_moments[]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KeyMoment {
    pub timestamp: Timestamp,
    #[serde(deserialize_with = "lenient")]
    pub behavior: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub significance: Option<String>,
}

impl RawObservation for KeyMoment {
    const KIND: SourceKind = SourceKind::KeyMoment;

    fn candidate(&self, overall_score: f64) -> Option<Candidate> {
        let label = first_present([self.behavior.as_ref()])?;

        Some(Candidate {
            time: self.timestamp.seconds(),
            label: label.to_string(),
            event_type: EventType::Behavioral,
            explicit_zone: None,
            score: ScoreRule::Fixed(overall_score),
            evidence: non_empty(self.significance.as_ref()).into_iter().collect(),
        })
    }
}

/// Entry of `visual_analysis.facs_codes_detected[]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FacsCode {
    #[serde(deserialize_with = "lenient")]
    pub code: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub valence: Option<String>,
    pub timestamp: Timestamp,
    /// Either a number or a word like `"high"`
    pub confidence: Option<Value>,
}

impl FacsCode {
    /// Zone implied by the code's valence
    #[must_use]
    pub fn valence_zone(&self) -> &'static str {
        match self.valence.as_deref().map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("negative") => "red",
            Some(v) if v.eq_ignore_ascii_case("positive") => "green",
            _ => "yellow",
        }
    }

    fn valence_score(&self) -> f64 {
        match self.valence_zone() {
            "red" => 60.0,
            "green" => 25.0,
            _ => 45.0,
        }
    }

    /// Confidence rendered for display, if present
    #[must_use]
    pub fn confidence_text(&self) -> Option<String> {
        match self.confidence.as_ref()? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl RawObservation for FacsCode {
    const KIND: SourceKind = SourceKind::FacsFallback;

    fn candidate(&self, _overall_score: f64) -> Option<Candidate> {
        let code = non_empty(self.code.as_ref());
        let description = non_empty(self.description.as_ref());
        let label = match (&code, &description) {
            (Some(code), Some(desc)) => format!("{code}: {desc}"),
            (Some(only), None) | (None, Some(only)) => only.clone(),
            (None, None) => return None,
        };

        Some(Candidate {
            time: self.timestamp.seconds(),
            label,
            event_type: EventType::Behavioral,
            explicit_zone: Some(self.valence_zone().to_string()),
            score: ScoreRule::Fixed(self.valence_score()),
            evidence: code.into_iter().collect(),
        })
    }
}

/// Deserialize any JSON into `T`, falling back to `T::default()` when the
/// shape is wrong
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Deserialize a score given as a number or a numeric string. Anything
/// else, non-finite values included, reads as absent.
pub(crate) fn lenient_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let score = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(score.filter(|s| s.is_finite()))
}

/// Deserialize a list, dropping malformed elements. Non-arrays are empty.
pub(crate) fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}
