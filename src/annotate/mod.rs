//! Playback-synchronized annotation primitives
//!
//! Everything the presentation layer draws or triggers while a video plays.
//!
//! # Features
//!
//! - **Score chart** - fixed-resolution severity curve with clickable marker dots
//! - **Waveform** - procedural audio-intensity bars from labeled sound intervals
//! - **Subtitles** - interpretation cues, exportable as SRT or `WebVTT`
//! - **Sync** - cue selection and one-shot narration driven by playback time
//!
//! # Example
//!
//! ```rust,no_run
//! use etho::analyze::{AnalysisResult, AnalysisView};
//! use etho::annotate::RecordingNarrator;
//!
//! let mut view = AnalysisView::new(AnalysisResult::load("analysis.json")?);
//! view.set_duration(30.0);
//!
//! let mut sync = view.sync_controller(RecordingNarrator::new());
//! for bar in view.waveform() {
//!     sync.on_time_update(bar.time);
//! }
//! # Ok::<(), etho::analyze::AnalysisError>(())
//! ```

pub mod chart;
pub mod narration;
pub mod subtitle;
pub mod sync;
pub mod waveform;

use serde::Serialize;

pub use chart::{ChartConfig, ChartPoint, TimelineSampler};
pub use narration::{
    ChannelNarrator, NarrationCommand, NarrationEvent, NarrationRequest, NarrationSink,
    RecordingNarrator, TaskNarrator,
};
pub use subtitle::{CueSpan, CueTrack, SubtitleCue, SubtitleFormat};
pub use sync::{PlaybackSyncController, SyncConfig, SyncState, SyncTransition};
pub use waveform::{
    LegendEntry, SoundInterval, WaveformBar, WaveformConfig, WaveformSynthesizer,
};

/// One-way request to move the playhead
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeekCommand {
    /// Seconds
    pub target: f64,
    /// Start playback after seeking
    pub resume: bool,
}

impl SeekCommand {
    /// Seek to `target` and keep playing
    #[must_use]
    pub fn resume_at(target: f64) -> Self {
        Self {
            target,
            resume: true,
        }
    }
}
