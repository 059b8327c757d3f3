//! `etho` - Behavioral annotation timeline for analyzed pet videos
//!
//! Turns the structured result of an external behavior-analysis service into
//! one consistent annotation stream synchronized to video playback.
//!
//! # Features
//!
//! - **Event fusion**: merges timeline, interpretation, audio, and visual
//!   observations into deduplicated canonical markers
//! - **Severity zones**: green / yellow / red classification with keyword tables
//! - **Score chart**: fixed-resolution severity curve
//! - **Waveform**: deterministic procedural audio-intensity bars
//! - **Playback sync**: subtitle cues with one-shot narration
//!
//! # Example
//!
//! ```rust,no_run
//! use etho::{AnalysisResult, AnalysisView};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut view = AnalysisView::new(AnalysisResult::load("analysis.json")?);
//!     view.set_duration(30.0);
//!
//!     for marker in view.markers() {
//!         println!("{} {} [{}]", etho::timecode::format(marker.time), marker.label, marker.zone);
//!     }
//!     Ok(())
//! }
//! ```

pub mod analyze;
pub mod annotate;
pub mod config;
pub mod timecode;
pub mod zone;

pub use analyze::{
    AnalysisError, AnalysisResult, AnalysisView, AnnotationReport, CanonicalMarker, FusionEngine,
    Outcome, ReportFormat,
};
pub use annotate::{
    CueTrack, PlaybackSyncController, SeekCommand, SubtitleFormat, TimelineSampler,
    WaveformSynthesizer,
};
pub use config::EthoConfig;
pub use timecode::Timestamp;
pub use zone::{Zone, ZoneClassifier};

/// Version of etho
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
