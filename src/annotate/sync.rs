//! Playback synchronization
//!
//! A two-state machine driven by playback events. Time updates look up the
//! active cue; a cue with a new key replaces the displayed one and is
//! narrated exactly once. Keys are compared, never references, so a cue
//! re-entered after leaving it narrates again while one that stays active
//! across updates does not.

use serde::{Deserialize, Serialize};

use super::narration::{NarrationRequest, NarrationSink};
use super::subtitle::{CueTrack, SubtitleCue};

/// Controller tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Seconds a cue stays valid after its timestamp
    pub cue_duration: f64,
    pub subtitles_enabled: bool,
    pub narration_enabled: bool,
    pub rate: f64,
    pub pitch: f64,
    pub volume: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            cue_duration: 4.0,
            subtitles_enabled: true,
            narration_enabled: true,
            rate: 0.9,
            pitch: 1.1,
            volume: 0.8,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SyncState {
    #[default]
    Idle,
    CueActive(SubtitleCue),
}

/// Result of feeding one playback event to the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncTransition {
    Unchanged,
    Activated(SubtitleCue),
    Cleared,
}

pub struct PlaybackSyncController<S: NarrationSink> {
    track: CueTrack,
    sink: S,
    config: SyncConfig,
    state: SyncState,
}

impl<S: NarrationSink> PlaybackSyncController<S> {
    #[must_use]
    pub fn new(track: CueTrack, sink: S) -> Self {
        Self::with_config(track, sink, SyncConfig::default())
    }

    #[must_use]
    pub fn with_config(track: CueTrack, sink: S, config: SyncConfig) -> Self {
        Self {
            track,
            sink,
            config,
            state: SyncState::Idle,
        }
    }

    /// Playback position changed
    pub fn on_time_update(&mut self, t: f64) -> SyncTransition {
        if !self.config.subtitles_enabled {
            return self.clear();
        }

        let Some(cue) = self.track.active_at(t) else {
            return self.clear();
        };

        if self.current_cue().is_some_and(|shown| shown.key == cue.key) {
            return SyncTransition::Unchanged;
        }

        let cue = cue.clone();
        tracing::debug!("Cue {} active at {t:.2}s", cue.key);
        self.sink.cancel();
        if self.config.narration_enabled {
            self.sink.speak(NarrationRequest {
                text: cue.text.clone(),
                rate: self.config.rate,
                pitch: self.config.pitch,
                volume: self.config.volume,
                cue_key: cue.key.clone(),
            });
        }

        self.state = SyncState::CueActive(cue.clone());
        SyncTransition::Activated(cue)
    }

    /// Playback paused: silence narration, keep the cue on screen
    pub fn on_pause(&mut self) {
        self.sink.cancel();
    }

    /// Toggle subtitles. Disabling clears the displayed cue and silences
    /// narration.
    pub fn set_subtitles_enabled(&mut self, enabled: bool) -> SyncTransition {
        self.config.subtitles_enabled = enabled;
        if enabled {
            SyncTransition::Unchanged
        } else {
            self.sink.cancel();
            self.clear()
        }
    }

    /// Toggle narration. Muting silences the in-flight utterance; the cue
    /// stays on screen.
    pub fn set_narration_enabled(&mut self, enabled: bool) {
        self.config.narration_enabled = enabled;
        if !enabled {
            self.sink.cancel();
        }
    }

    fn clear(&mut self) -> SyncTransition {
        match std::mem::take(&mut self.state) {
            SyncState::Idle => SyncTransition::Unchanged,
            SyncState::CueActive(cue) => {
                tracing::debug!("Cue {} cleared", cue.key);
                SyncTransition::Cleared
            }
        }
    }

    #[must_use]
    pub fn current_cue(&self) -> Option<&SubtitleCue> {
        match &self.state {
            SyncState::Idle => None,
            SyncState::CueActive(cue) => Some(cue),
        }
    }

    #[must_use]
    pub fn state(&self) -> &SyncState {
        &self.state
    }

    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    #[must_use]
    pub fn into_sink(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::AnalysisResult;
    use crate::annotate::narration::{NarrationEvent, RecordingNarrator};

    fn controller(json: &str) -> PlaybackSyncController<RecordingNarrator> {
        let a = AnalysisResult::from_json(json).unwrap();
        PlaybackSyncController::new(
            CueTrack::from_lines(&a.interpret_lines, 4.0),
            RecordingNarrator::new(),
        )
    }

    const ONE_LINE: &str =
        r#"{"interpret_lines": [{"timestamp": "0:10", "pet_pov": "Is that for me?"}]}"#;

    #[test]
    fn test_sweep_activates_once_then_clears() {
        let mut sync = controller(ONE_LINE);

        assert_eq!(sync.on_time_update(9.9), SyncTransition::Unchanged);
        assert!(matches!(sync.on_time_update(10.0), SyncTransition::Activated(_)));
        for t in [10.5, 11.0, 12.0, 13.9] {
            assert_eq!(sync.on_time_update(t), SyncTransition::Unchanged);
        }
        assert_eq!(sync.on_time_update(14.1), SyncTransition::Cleared);
        assert_eq!(*sync.state(), SyncState::Idle);

        let spoken: Vec<_> = sync.sink().spoken().collect();
        assert_eq!(spoken.len(), 1);
        assert_eq!(spoken[0].text, "Is that for me?");
        assert_eq!(spoken[0].rate, 0.9);
        assert_eq!(spoken[0].pitch, 1.1);
        assert_eq!(spoken[0].volume, 0.8);
    }

    #[test]
    fn test_cancel_precedes_speak() {
        let mut sync = controller(ONE_LINE);
        sync.on_time_update(10.0);

        let events = sync.sink().events();
        assert_eq!(events[0], NarrationEvent::Cancelled);
        assert!(matches!(events[1], NarrationEvent::Spoke(_)));
    }

    #[test]
    fn test_reentry_narrates_again() {
        let mut sync = controller(ONE_LINE);
        sync.on_time_update(11.0);
        sync.on_time_update(20.0);
        sync.on_time_update(11.0);

        assert_eq!(sync.sink().spoken().count(), 2);
    }

    #[test]
    fn test_overlapping_cues_switch_to_latest() {
        let mut sync = controller(
            r#"{"interpret_lines": [
                {"timestamp": 10, "pet_pov": "first"},
                {"timestamp": 12, "pet_pov": "second"}
            ]}"#,
        );
        sync.on_time_update(11.0);
        sync.on_time_update(12.0);

        assert_eq!(sync.current_cue().unwrap().text, "second");
        let texts: Vec<_> = sync.sink().spoken().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn test_pause_cancels_but_keeps_cue() {
        let mut sync = controller(ONE_LINE);
        sync.on_time_update(10.0);
        sync.on_pause();

        assert_eq!(sync.sink().events().last(), Some(&NarrationEvent::Cancelled));
        assert!(sync.current_cue().is_some());
    }

    #[test]
    fn test_subtitles_disabled() {
        let mut sync = controller(ONE_LINE);
        sync.on_time_update(10.0);

        assert_eq!(sync.set_subtitles_enabled(false), SyncTransition::Cleared);
        assert_eq!(sync.on_time_update(11.0), SyncTransition::Unchanged);
        assert!(sync.current_cue().is_none());
        assert_eq!(sync.sink().spoken().count(), 1);

        sync.set_subtitles_enabled(true);
        assert!(matches!(sync.on_time_update(11.0), SyncTransition::Activated(_)));
    }

    #[test]
    fn test_narration_muted_still_shows_cue() {
        let mut sync = controller(ONE_LINE);
        sync.set_narration_enabled(false);

        assert!(matches!(sync.on_time_update(10.0), SyncTransition::Activated(_)));
        assert_eq!(sync.sink().spoken().count(), 0);
    }

    #[test]
    fn test_empty_track_stays_idle() {
        let mut sync = controller("{}");
        assert_eq!(sync.on_time_update(3.0), SyncTransition::Unchanged);
        assert!(sync.into_sink().events().is_empty());
    }
}
