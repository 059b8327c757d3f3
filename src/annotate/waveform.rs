//! Procedural audio-intensity waveform
//!
//! The analysis service reports sounds as discrete labeled intervals, not
//! signal data. This module turns those intervals into a bar sequence that
//! reads as continuous audio: an attack/sustain/release envelope per
//! interval, a couple of sine harmonics, and seeded noise. A low drifting
//! noise floor fills the gaps.
//!
//! All texture comes from a PRNG seeded per bar index, so identical inputs
//! always render identical bars.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::SeekCommand;
use crate::analyze::sources::{EnvironmentalSound, Vocalization};
use crate::analyze::AudioAnalysis;
use crate::zone::{Zone, ZoneClassifier};

const MIN_HEIGHT: f64 = 3.0;
const MAX_HEIGHT: f64 = 92.0;

/// Envelope attack share of an interval
const ATTACK: f64 = 0.1;
/// Envelope release share of an interval
const RELEASE: f64 = 0.2;

const ACTIVE_OPACITY: f64 = 0.95;
const AMBIENT_OPACITY: f64 = 0.25;

/// Loudness of environmental sounds
const ENVIRONMENTAL_LOUDNESS: f64 = 0.5;

/// Subtype keyword rows for vocalization loudness; first hit wins
const LOUDNESS_RULES: &[(&str, f64)] = &[
    ("aggressive", 1.0),
    ("demand", 0.85),
    ("frustrat", 0.8),
];
const DEFAULT_LOUDNESS: f64 = 0.65;

/// Video-context keywords and the suffix they add to event labels
const CONTEXT_SUFFIXES: &[(&[&str], &str)] = &[
    (&["door"], "at door"),
    (&["window"], "at window"),
    (&["person", "stranger"], "at person"),
    (&["cat", "dog", "animal"], "at animal"),
    (&["food", "treat"], "for food"),
    (&["play", "toy"], "during play"),
    (&["barrier", "gate"], "at barrier"),
    (&["camera", "close"], "at camera"),
];

/// Synthesizer tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveformConfig {
    pub total_bars: usize,
    /// Interval length (seconds) for sounds without a usable end
    pub default_span: f64,
    /// Texture seed
    pub seed: u64,
}

impl Default for WaveformConfig {
    fn default() -> Self {
        Self {
            total_bars: 150,
            default_span: 2.0,
            seed: 0x0E7A_0C0D,
        }
    }
}

/// A sound event expanded to an interval
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoundInterval {
    pub start: f64,
    pub end: f64,
    pub zone: Zone,
    /// In [0, 1]
    pub loudness: f64,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpretation: Option<String>,
    pub environmental: bool,
}

impl SoundInterval {
    #[must_use]
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t <= self.end
    }
}

/// One bar of the rendered waveform
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaveformBar {
    pub index: usize,
    /// Percent of the track height, in [3, 92]
    pub height: f64,
    /// `None` for ambient bars
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<Zone>,
    pub is_active: bool,
    pub time: f64,
    pub opacity: f64,
    /// Start of the owning event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seek_to: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl WaveformBar {
    /// Seek command issued when the bar is selected; ambient bars do nothing
    #[must_use]
    pub fn select(&self) -> Option<SeekCommand> {
        self.seek_to.map(SeekCommand::resume_at)
    }
}

/// Legend row: one per distinct sound kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub name: String,
    pub zone: Zone,
}

#[derive(Debug, Clone, Default)]
pub struct WaveformSynthesizer {
    config: WaveformConfig,
}

impl WaveformSynthesizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: WaveformConfig) -> Self {
        Self { config }
    }

    /// Override the bar count
    #[must_use]
    pub fn with_bars(mut self, total_bars: usize) -> Self {
        self.config.total_bars = total_bars;
        self
    }

    /// Expand vocalizations and environmental sounds into intervals.
    /// Vocalizations come first, so they win where intervals overlap.
    #[must_use]
    pub fn intervals(
        &self,
        audio: &AudioAnalysis,
        video_context: Option<&str>,
    ) -> Vec<SoundInterval> {
        let vocal = audio
            .vocalizations_detected
            .iter()
            .map(|v| self.vocal_interval(v, video_context));
        let ambient = audio
            .environmental_sounds
            .iter()
            .map(|e| self.environmental_interval(e));

        vocal.chain(ambient).collect()
    }

    fn vocal_interval(&self, v: &Vocalization, video_context: Option<&str>) -> SoundInterval {
        let kind = v.kind.as_deref().unwrap_or("").trim();
        let subtype = v.subtype.as_deref().unwrap_or("").trim();
        let start = v.timestamp_start.seconds();

        SoundInterval {
            start,
            end: self.resolve_end(start, v.timestamp_end.seconds()),
            zone: ZoneClassifier::vocalization().classify(&format!("{kind} {subtype}"), None),
            loudness: loudness(subtype),
            label: describe(kind, subtype, video_context.unwrap_or("")),
            interpretation: v.interpretation.clone().filter(|s| !s.trim().is_empty()),
            environmental: false,
        }
    }

    fn environmental_interval(&self, e: &EnvironmentalSound) -> SoundInterval {
        let start = e.timestamp.seconds();
        let sound = e.sound.as_deref().map(str::trim).unwrap_or("");

        SoundInterval {
            start,
            end: start + self.config.default_span,
            zone: Zone::Yellow,
            loudness: ENVIRONMENTAL_LOUDNESS,
            label: if sound.is_empty() {
                "sound".to_string()
            } else {
                format!("sound: {sound}")
            },
            interpretation: e.pet_reaction.clone().filter(|s| !s.trim().is_empty()),
            environmental: true,
        }
    }

    fn resolve_end(&self, start: f64, end: f64) -> f64 {
        if end > start {
            end
        } else {
            start + self.config.default_span
        }
    }

    /// Render `total_bars` bars spread evenly across `duration`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn synthesize(&self, events: &[SoundInterval], duration: f64) -> Vec<WaveformBar> {
        let total = self.config.total_bars;
        let duration = if duration.is_finite() && duration > 0.0 { duration } else { 0.0 };

        (0..total)
            .map(|i| {
                let t = i as f64 * duration / total as f64;
                let mut rng = self.texture_rng(i);
                match events.iter().find(|e| e.contains(t)) {
                    Some(event) => active_bar(i, t, event, &mut rng),
                    None => ambient_bar(i, t, &mut rng),
                }
            })
            .collect()
    }

    fn texture_rng(&self, index: usize) -> StdRng {
        let key = (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        StdRng::seed_from_u64(self.config.seed ^ key)
    }

    /// Distinct sound kinds in first-seen order; environmental sounds
    /// collapse into one entry
    #[must_use]
    pub fn legend(audio: &AudioAnalysis) -> Vec<LegendEntry> {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for v in &audio.vocalizations_detected {
            let kind = v.kind.as_deref().unwrap_or("").trim();
            let subtype = v.subtype.as_deref().unwrap_or("").trim();
            let name = if subtype.is_empty() { kind } else { subtype };
            if name.is_empty() || !seen.insert(name.to_string()) {
                continue;
            }
            entries.push(LegendEntry {
                name: name.replace('_', " "),
                zone: ZoneClassifier::vocalization().classify(&format!("{kind} {subtype}"), None),
            });
        }

        if !audio.environmental_sounds.is_empty() && seen.insert("environmental".to_string()) {
            entries.push(LegendEntry {
                name: "environmental".to_string(),
                zone: Zone::Yellow,
            });
        }

        entries
    }
}

#[allow(clippy::cast_precision_loss)]
fn active_bar(i: usize, t: f64, event: &SoundInterval, rng: &mut StdRng) -> WaveformBar {
    let span = event.end - event.start;
    let progress = if span > 0.0 { ((t - event.start) / span).clamp(0.0, 1.0) } else { 0.0 };

    let sustain: f64 = rng.gen();
    let envelope = if progress < ATTACK {
        progress / ATTACK
    } else if progress > 1.0 - RELEASE {
        (1.0 - progress) / RELEASE
    } else {
        0.85 + sustain * 0.15
    };

    let phase = i as f64;
    let noise: f64 = rng.gen();
    let texture = (phase * 1.2).sin() * 0.1 + (phase * 3.7).sin() * 0.05 + (noise - 0.5) * 0.08;
    let height = 25.0 + event.loudness * envelope * 60.0 + texture * 25.0;

    WaveformBar {
        index: i,
        height: height.clamp(MIN_HEIGHT, MAX_HEIGHT),
        zone: Some(event.zone),
        is_active: true,
        time: t,
        opacity: ACTIVE_OPACITY,
        seek_to: Some(event.start),
        label: Some(event.label.clone()),
    }
}

#[allow(clippy::cast_precision_loss)]
fn ambient_bar(i: usize, t: f64, rng: &mut StdRng) -> WaveformBar {
    let floor: f64 = rng.gen();
    let height = 5.0 + floor * 8.0 + (i as f64 * 0.5).sin() * 2.0;

    WaveformBar {
        index: i,
        height: height.clamp(MIN_HEIGHT, MAX_HEIGHT),
        zone: None,
        is_active: false,
        time: t,
        opacity: AMBIENT_OPACITY,
        seek_to: None,
        label: None,
    }
}

fn loudness(subtype: &str) -> f64 {
    let subtype = subtype.to_lowercase();
    LOUDNESS_RULES
        .iter()
        .find(|(keyword, _)| subtype.contains(keyword))
        .map_or(DEFAULT_LOUDNESS, |(_, level)| *level)
}

/// `"Bark - demand at door"` style label
fn describe(kind: &str, subtype: &str, video_context: &str) -> String {
    let context = video_context.to_lowercase();
    let suffix = CONTEXT_SUFFIXES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| context.contains(k)))
        .map(|(_, suffix)| *suffix);

    let base = match (kind.is_empty(), subtype.is_empty() || subtype == kind) {
        (false, false) => format!("{kind} - {}", subtype.replace('_', " ")),
        (false, true) => kind.to_string(),
        (true, _) => subtype.replace('_', " "),
    };

    match suffix {
        Some(suffix) if !base.is_empty() => format!("{base} {suffix}"),
        _ => base,
    }
}
