//! Analysis result ingestion and fusion
//!
//! Loads the structured result produced by the external behavior-analysis
//! service and derives everything the presentation layer renders:
//! - Canonical markers (multi-source fusion with deduplication)
//! - Behavior chips (verified markers or detected facial codes)
//! - Memoized chart, waveform, and subtitle-cue views

pub mod chips;
pub mod fusion;
pub mod report;
pub mod sources;

use once_cell::unsync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::annotate::chart::{ChartPoint, TimelineSampler};
use crate::annotate::narration::NarrationSink;
use crate::annotate::subtitle::CueTrack;
use crate::annotate::sync::PlaybackSyncController;
use crate::annotate::waveform::{LegendEntry, SoundInterval, WaveformBar, WaveformSynthesizer};
use crate::config::EthoConfig;
use crate::zone::Zone;

pub use chips::{behavior_chips, BehaviorChip, ReportedMarker};
pub use fusion::{CanonicalMarker, FusionConfig, FusionEngine};
pub use report::{AnnotationReport, ReportFormat};
pub use sources::{
    EnvironmentalSound, EventType, FacsCode, InterpretLine, KeyMoment, RawObservation,
    SourceKind, TimelineEvent, Vocalization,
};

use sources::{lenient, lenient_score, lenient_vec};

/// Overall score used when the assessment carries none
pub const DEFAULT_DISTRESS_SCORE: f64 = 50.0;

/// Upstream `error_type` for videos with no animal in frame
const NO_SUBJECT_ERROR: &str = "no_pet_detected";

/// Upstream `video_type` for videos stitched from several clips
const COMPILATION: &str = "compilation";

/// Analysis errors. Only raised at I/O boundaries; derivation is total.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Format error: {0}")]
    Format(#[from] std::fmt::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// `audio_analysis` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AudioAnalysis {
    #[serde(deserialize_with = "lenient_vec")]
    pub vocalizations_detected: Vec<Vocalization>,
    #[serde(deserialize_with = "lenient_vec")]
    pub environmental_sounds: Vec<EnvironmentalSound>,
}

/// `visual_analysis` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VisualAnalysis {
    #[serde(deserialize_with = "lenient_vec")]
    pub key_behavioral_moments: Vec<KeyMoment>,
    #[serde(deserialize_with = "lenient_vec")]
    pub facs_codes_detected: Vec<FacsCode>,
}

/// `overall_assessment` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OverallAssessment {
    /// 0-100
    #[serde(deserialize_with = "lenient_score")]
    pub distress_score: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub zone_label: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub summary: Option<String>,
}

/// One structured result per analyzed video. Every section is optional;
/// missing or malformed sections read as empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    #[serde(deserialize_with = "lenient_vec")]
    pub timeline: Vec<TimelineEvent>,
    #[serde(deserialize_with = "lenient_vec")]
    pub interpret_lines: Vec<InterpretLine>,
    #[serde(deserialize_with = "lenient")]
    pub audio_analysis: AudioAnalysis,
    #[serde(deserialize_with = "lenient")]
    pub visual_analysis: VisualAnalysis,
    #[serde(deserialize_with = "lenient")]
    pub overall_assessment: OverallAssessment,
    #[serde(deserialize_with = "lenient_vec")]
    pub behavioral_markers: Vec<ReportedMarker>,
    #[serde(deserialize_with = "lenient")]
    pub species: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub video_context: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub video_type: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub error: bool,
    #[serde(deserialize_with = "lenient")]
    pub error_type: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub message: Option<String>,
}

impl AnalysisResult {
    /// Parse a result from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a result from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Overall distress score in [0, 100]; missing scores read as 50
    #[must_use]
    pub fn distress_score(&self) -> f64 {
        match self.overall_assessment.distress_score {
            Some(score) if score.is_finite() => score.clamp(0.0, 100.0),
            _ => DEFAULT_DISTRESS_SCORE,
        }
    }

    #[must_use]
    pub fn overall_zone(&self) -> Zone {
        Zone::from_score(self.distress_score())
    }

    /// Headline label for the overall zone; the service's own label wins
    #[must_use]
    pub fn zone_label(&self) -> String {
        match non_blank(self.overall_assessment.zone_label.as_deref()) {
            Some(label) => label.to_string(),
            None => self.overall_zone().label().to_string(),
        }
    }

    /// One-sentence summary: the service's own, or one built from the
    /// video context, species, and overall zone
    #[must_use]
    pub fn summary(&self) -> String {
        let mut summary = match non_blank(self.overall_assessment.summary.as_deref()) {
            Some(upstream) => upstream.to_string(),
            None => {
                let subject = match non_blank(self.video_context.as_deref()) {
                    Some(context) => format!("While in a {}, your", context.to_lowercase()),
                    None => "Your".to_string(),
                };
                let species = non_blank(self.species.as_deref()).unwrap_or("pet");
                let demeanor = match self.overall_zone() {
                    Zone::Green => "calm, relaxed behavior",
                    Zone::Yellow => "alert, attentive behavior",
                    Zone::Red => "signs of distress",
                };
                format!("{subject} {species} shows {demeanor}.")
            }
        };

        if self.video_type.as_deref().map(str::trim) == Some(COMPILATION)
            && !summary.contains(COMPILATION)
        {
            summary.push_str(" This compilation shows multiple moments.");
        }
        summary
    }

    /// Upstream reported that no subject was found in the video
    #[must_use]
    pub fn no_subject_detected(&self) -> bool {
        self.error && self.error_type.as_deref() == Some(NO_SUBJECT_ERROR)
    }
}

fn non_blank(field: Option<&str>) -> Option<&str> {
    field.map(str::trim).filter(|s| !s.is_empty())
}

/// Terminal display state of one analyzed video
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Outcome {
    /// Passed through from the analysis service, not interpreted
    NoSubjectDetected { message: String },
    /// Fusion produced nothing to annotate
    NoMarkers,
    Annotated { markers: usize },
}

/// Memoized derivations of one (duration, analysis) pair
///
/// Every collection is computed on first access and dropped wholesale when
/// an input changes. Nothing is patched incrementally, so two readers of
/// the same inputs always see identical output.
pub struct AnalysisView {
    config: EthoConfig,
    analysis: AnalysisResult,
    duration: Option<f64>,
    markers: OnceCell<Vec<CanonicalMarker>>,
    chips: OnceCell<Vec<BehaviorChip>>,
    sounds: OnceCell<Vec<SoundInterval>>,
    cues: OnceCell<CueTrack>,
    chart: OnceCell<Vec<ChartPoint>>,
    waveform: OnceCell<Vec<WaveformBar>>,
}

impl AnalysisView {
    #[must_use]
    pub fn new(analysis: AnalysisResult) -> Self {
        Self::with_config(analysis, EthoConfig::default())
    }

    #[must_use]
    pub fn with_config(analysis: AnalysisResult, config: EthoConfig) -> Self {
        Self {
            config,
            analysis,
            duration: None,
            markers: OnceCell::new(),
            chips: OnceCell::new(),
            sounds: OnceCell::new(),
            cues: OnceCell::new(),
            chart: OnceCell::new(),
            waveform: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn analysis(&self) -> &AnalysisResult {
        &self.analysis
    }

    #[must_use]
    pub fn config(&self) -> &EthoConfig {
        &self.config
    }

    /// Replace the analysis result, invalidating every derived collection
    pub fn set_analysis(&mut self, analysis: AnalysisResult) {
        tracing::debug!("Analysis replaced, dropping derived views");
        self.analysis = analysis;
        self.markers.take();
        self.chips.take();
        self.sounds.take();
        self.cues.take();
        self.chart.take();
        self.waveform.take();
    }

    /// Record the video duration once playback knows it.
    ///
    /// Returns `true` when the duration changed and duration-dependent
    /// views were invalidated.
    pub fn set_duration(&mut self, duration: f64) -> bool {
        if self.duration.map(f64::to_bits) == Some(duration.to_bits()) {
            return false;
        }

        tracing::debug!("Duration changed to {duration:.2}s, dropping chart and waveform");
        self.duration = Some(duration);
        self.chart.take();
        self.waveform.take();
        true
    }

    /// Known duration, or the configured fallback while it is unknown
    #[must_use]
    pub fn duration(&self) -> f64 {
        match self.duration {
            Some(d) if d.is_finite() && d > 0.0 => d,
            _ => self.config.chart.fallback_duration,
        }
    }

    #[must_use]
    pub fn outcome(&self) -> Outcome {
        if self.analysis.no_subject_detected() {
            let message = self
                .analysis
                .message
                .clone()
                .unwrap_or_else(|| "No pet detected in this video".to_string());
            tracing::warn!("Analysis reported no subject: {message}");
            return Outcome::NoSubjectDetected { message };
        }

        match self.markers().len() {
            0 => Outcome::NoMarkers,
            markers => Outcome::Annotated { markers },
        }
    }

    #[must_use]
    pub fn markers(&self) -> &[CanonicalMarker] {
        self.markers.get_or_init(|| {
            FusionEngine::with_config(self.config.fusion.clone()).fuse(&self.analysis)
        })
    }

    #[must_use]
    pub fn chips(&self) -> &[BehaviorChip] {
        self.chips.get_or_init(|| behavior_chips(&self.analysis))
    }

    /// Vocalization and environmental-sound intervals
    #[must_use]
    pub fn sound_events(&self) -> &[SoundInterval] {
        self.sounds.get_or_init(|| {
            WaveformSynthesizer::with_config(self.config.waveform.clone()).intervals(
                &self.analysis.audio_analysis,
                self.analysis.video_context.as_deref(),
            )
        })
    }

    #[must_use]
    pub fn legend(&self) -> Vec<LegendEntry> {
        WaveformSynthesizer::legend(&self.analysis.audio_analysis)
    }

    #[must_use]
    pub fn cue_track(&self) -> &CueTrack {
        self.cues.get_or_init(|| {
            CueTrack::from_lines(&self.analysis.interpret_lines, self.config.sync.cue_duration)
        })
    }

    #[must_use]
    pub fn chart(&self) -> &[ChartPoint] {
        self.chart.get_or_init(|| {
            TimelineSampler::with_config(self.config.chart.clone()).sample(
                self.markers(),
                self.duration(),
                self.analysis.distress_score(),
            )
        })
    }

    #[must_use]
    pub fn waveform(&self) -> &[WaveformBar] {
        self.waveform.get_or_init(|| {
            WaveformSynthesizer::with_config(self.config.waveform.clone())
                .synthesize(self.sound_events(), self.duration())
        })
    }

    /// A playback controller over this video's subtitle cues
    #[must_use]
    pub fn sync_controller<S: NarrationSink>(&self, sink: S) -> PlaybackSyncController<S> {
        PlaybackSyncController::with_config(
            self.cue_track().clone(),
            sink,
            self.config.sync.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "overall_assessment": {"distress_score": 72},
        "timeline": [{"timestamp": "0:02", "event": "Ears flattened"}],
        "interpret_lines": [{"timestamp": "0:10", "pet_pov": "I feel safe"}],
        "audio_analysis": {"vocalizations_detected": [
            {"timestamp_start": "0:05", "timestamp_end": "0:08", "type": "Growl"}
        ]}
    }"#;

    #[test]
    fn test_distress_score_default_and_clamp() {
        assert_eq!(AnalysisResult::default().distress_score(), 50.0);

        let a = AnalysisResult::from_json(r#"{"overall_assessment": {"distress_score": 140}}"#)
            .unwrap();
        assert_eq!(a.distress_score(), 100.0);
        assert_eq!(a.overall_zone(), Zone::Red);

        let a = AnalysisResult::from_json(r#"{"overall_assessment": {"distress_score": "high"}}"#)
            .unwrap();
        assert_eq!(a.distress_score(), 50.0);

        let a = AnalysisResult::from_json(r#"{"overall_assessment": {"distress_score": " 72 "}}"#)
            .unwrap();
        assert_eq!(a.distress_score(), 72.0);
    }

    #[test]
    fn test_zone_label_prefers_upstream() {
        let a = AnalysisResult::from_json(
            r#"{"overall_assessment": {"distress_score": 20, "zone_label": "Relaxed"}}"#,
        )
        .unwrap();
        assert_eq!(a.zone_label(), "Relaxed");

        let a = AnalysisResult::from_json(
            r#"{"overall_assessment": {"distress_score": 20, "zone_label": "  "}}"#,
        )
        .unwrap();
        assert_eq!(a.zone_label(), "LOW");
        assert_eq!(AnalysisResult::default().zone_label(), "MODERATE");
    }

    #[test]
    fn test_summary_upstream_and_generated() {
        let a = AnalysisResult::from_json(
            r#"{"overall_assessment": {"summary": "Waiting patiently"}, "species": "cat"}"#,
        )
        .unwrap();
        assert_eq!(a.summary(), "Waiting patiently");

        let a = AnalysisResult::from_json(
            r#"{"species": "dog", "video_context": "Front Door", "overall_assessment": {"distress_score": 80}}"#,
        )
        .unwrap();
        assert_eq!(a.summary(), "While in a front door, your dog shows signs of distress.");

        let a = AnalysisResult::from_json(r#"{"overall_assessment": {"distress_score": 10}}"#)
            .unwrap();
        assert_eq!(a.summary(), "Your pet shows calm, relaxed behavior.");
    }

    #[test]
    fn test_summary_compilation_note() {
        let a = AnalysisResult::from_json(r#"{"video_type": "compilation"}"#).unwrap();
        assert_eq!(
            a.summary(),
            "Your pet shows alert, attentive behavior. This compilation shows multiple moments."
        );

        let a = AnalysisResult::from_json(
            r#"{"video_type": "compilation", "overall_assessment": {"summary": "A compilation of naps"}}"#,
        )
        .unwrap();
        assert_eq!(a.summary(), "A compilation of naps");
    }

    #[test]
    fn test_mistyped_fields_keep_markers_and_cues() {
        let a = AnalysisResult::from_json(
            r#"{
                "timeline": [
                    {"timestamp": "0:02", "event": "Ears back", "distress_score": "45"},
                    {"timestamp": "0:06", "event": "Tail wag", "zone": 2}
                ],
                "interpret_lines": [{"timestamp": "0:12", "pet_pov": "Who's there?", "trigger": 7}],
                "video_type": 3
            }"#,
        )
        .unwrap();
        let view = AnalysisView::new(a);

        let markers = view.markers();
        assert_eq!(markers.len(), 3);
        assert_eq!(markers[0].score, 45.0);
        assert_eq!(markers[2].label, "Who's there?");
        assert_eq!(view.cue_track().len(), 1);
        assert_eq!(view.analysis().video_type, None);
    }

    #[test]
    fn test_no_subject_outcome() {
        let a = AnalysisResult::from_json(
            r#"{"error": true, "error_type": "no_pet_detected", "message": "Only furniture here"}"#,
        )
        .unwrap();
        let view = AnalysisView::new(a);
        assert_eq!(
            view.outcome(),
            Outcome::NoSubjectDetected {
                message: "Only furniture here".to_string()
            }
        );
    }

    #[test]
    fn test_no_markers_outcome() {
        let view = AnalysisView::new(AnalysisResult::default());
        assert_eq!(view.outcome(), Outcome::NoMarkers);
    }

    #[test]
    fn test_view_memoizes_and_recomputes() {
        let mut view = AnalysisView::new(AnalysisResult::from_json(SAMPLE).unwrap());

        assert_eq!(view.duration(), 17.0);
        assert_eq!(view.chart().len(), 35);

        let first = view.chart().as_ptr();
        assert_eq!(view.chart().as_ptr(), first, "chart should be cached");

        assert!(view.set_duration(30.0));
        assert!(!view.set_duration(30.0));
        assert_eq!(view.chart().len(), 61);
        assert_eq!(view.waveform().len(), 150);
        assert_eq!(view.outcome(), Outcome::Annotated { markers: 3 });
    }

    #[test]
    fn test_identical_inputs_identical_output() {
        let mut a = AnalysisView::new(AnalysisResult::from_json(SAMPLE).unwrap());
        let mut b = AnalysisView::new(AnalysisResult::from_json(SAMPLE).unwrap());
        a.set_duration(30.0);
        b.set_duration(30.0);

        assert_eq!(a.markers(), b.markers());
        assert_eq!(a.chart(), b.chart());
        assert_eq!(a.waveform(), b.waveform());
    }

    #[test]
    fn test_set_analysis_invalidates() {
        let mut view = AnalysisView::new(AnalysisResult::from_json(SAMPLE).unwrap());
        assert_eq!(view.markers().len(), 3);

        view.set_analysis(AnalysisResult::default());
        assert!(view.markers().is_empty());
        assert!(view.cue_track().is_empty());
    }

    #[test]
    fn test_rejects_non_object_json() {
        assert!(matches!(
            AnalysisResult::from_json("42"),
            Err(AnalysisError::Json(_))
        ));
    }
}
