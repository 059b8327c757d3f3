//! Event fusion engine
//!
//! Merges the prioritized observation lists of one analysis result into a
//! single deduplicated, zoned, time-sorted list of canonical markers.
//!
//! Deduplication is first-writer-wins: a candidate that lands within the
//! fusion window of an already accepted marker is dropped. Lower-priority
//! sources are restatements of the same moment, not independent evidence,
//! so nothing is averaged.

use serde::{Deserialize, Serialize};

use super::sources::{Candidate, EventType, RawObservation, ScoreRule, SourceKind};
use super::AnalysisResult;
use crate::zone::{Zone, ZoneClassifier};

/// Vocalization score before keyword bias
const AUDIO_BASE_SCORE: f64 = 45.0;

/// Keyword rows biasing a vocalization's score upward; first hit wins
const AUDIO_SCORE_RULES: &[(&[&str], f64)] = &[
    (&["growl", "hiss", "aggress", "threat", "scream"], 70.0),
    (&["demand", "frustrat", "whine", "bark"], 55.0),
];

/// Fusion tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Window for behavioral candidates (seconds)
    pub behavioral_window: f64,
    /// Window for audio and environmental candidates (seconds)
    pub audio_window: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            behavioral_window: 1.0,
            audio_window: 1.0,
        }
    }
}

/// The deduplicated, zoned record every renderer works from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalMarker {
    /// Seconds from the start of the video
    pub time: f64,
    pub label: String,
    pub event_type: EventType,
    pub zone: Zone,
    /// Severity in [0, 100]
    pub score: f64,
    #[serde(default)]
    pub evidence: Vec<String>,
    pub source: SourceKind,
}

/// Fusion engine for combining observation sources
#[derive(Debug, Clone, Default)]
pub struct FusionEngine {
    config: FusionConfig,
    classifier: ZoneClassifier,
}

impl FusionEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: FusionConfig) -> Self {
        Self {
            config,
            classifier: ZoneClassifier::behavior(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Fuse all sources into canonical markers, sorted by time
    #[must_use]
    pub fn fuse(&self, analysis: &AnalysisResult) -> Vec<CanonicalMarker> {
        let overall = analysis.distress_score();
        let mut accepted = Vec::new();

        // The explicit timeline is authoritative and never deduplicated
        self.ingest(&mut accepted, &analysis.timeline, overall, false);
        self.ingest(&mut accepted, &analysis.interpret_lines, overall, true);
        self.ingest(
            &mut accepted,
            &analysis.audio_analysis.vocalizations_detected,
            overall,
            true,
        );
        self.ingest(
            &mut accepted,
            &analysis.visual_analysis.key_behavioral_moments,
            overall,
            true,
        );

        if accepted.is_empty() {
            self.ingest(
                &mut accepted,
                &analysis.visual_analysis.facs_codes_detected,
                overall,
                false,
            );
        }

        accepted.sort_by(|a, b| a.time.total_cmp(&b.time));
        tracing::debug!("Fused {} canonical markers", accepted.len());
        accepted
    }

    /// Admit every usable record of one source
    fn ingest<O: RawObservation>(
        &self,
        accepted: &mut Vec<CanonicalMarker>,
        records: &[O],
        overall: f64,
        dedupe: bool,
    ) {
        let before = accepted.len();

        for candidate in records.iter().filter_map(|r| r.candidate(overall)) {
            if dedupe {
                let window = self.window_for(candidate.event_type);
                if let Some(existing) = accepted
                    .iter()
                    .find(|m| (m.time - candidate.time).abs() < window)
                {
                    tracing::debug!(
                        "Dropping {:?} '{}' at {:.2}s: within {window}s of '{}'",
                        O::KIND,
                        candidate.label,
                        candidate.time,
                        existing.label
                    );
                    continue;
                }
            }

            accepted.push(self.resolve(candidate, O::KIND));
        }

        tracing::debug!(
            "{:?}: accepted {} of {} records",
            O::KIND,
            accepted.len() - before,
            records.len()
        );
    }

    fn resolve(&self, candidate: Candidate, source: SourceKind) -> CanonicalMarker {
        let zone = self
            .classifier
            .classify(&candidate.label, candidate.explicit_zone.as_deref());

        let score = match candidate.score {
            ScoreRule::Fixed(score) => score,
            ScoreRule::ZoneDefault => zone.default_score(),
            ScoreRule::AudioKeywords => audio_score(&candidate.label),
        };

        CanonicalMarker {
            time: candidate.time,
            label: candidate.label,
            event_type: candidate.event_type,
            zone,
            score: if score.is_finite() { score.clamp(0.0, 100.0) } else { 0.0 },
            evidence: candidate.evidence,
            source,
        }
    }

    fn window_for(&self, event_type: EventType) -> f64 {
        match event_type {
            EventType::Behavioral => self.config.behavioral_window,
            EventType::Audio | EventType::Environmental => self.config.audio_window,
        }
    }
}

/// Severity of a vocalization label, biased upward by keyword hits
#[must_use]
pub fn audio_score(label: &str) -> f64 {
    let label = label.to_lowercase();
    AUDIO_SCORE_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| label.contains(k)))
        .map_or(AUDIO_BASE_SCORE, |(_, score)| *score)
}
