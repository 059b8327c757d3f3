//! Fixed-resolution score curve for the timeline chart
//!
//! Samples the canonical markers every half second. Nearby markers are
//! averaged; empty stretches fall back to the overall score. A small sine
//! jitter keeps the curve from rendering as flat segments. It carries no
//! information.

use serde::{Deserialize, Serialize};

use super::SeekCommand;
use crate::analyze::{CanonicalMarker, EventType, DEFAULT_DISTRESS_SCORE};
use crate::timecode;
use crate::zone::Zone;

const MIN_SCORE: f64 = 5.0;
const MAX_SCORE: f64 = 95.0;

/// Sampler tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Seconds between samples
    pub step: f64,
    /// Markers within this distance (seconds) feed a sample's score
    pub window: f64,
    /// Markers within this distance claim the sample as an annotation point
    pub exact_window: f64,
    /// Jitter amplitude around windowed marker scores
    pub marker_jitter: f64,
    /// Jitter amplitude around the fallback score
    pub fallback_jitter: f64,
    /// Duration assumed until playback reports the real one
    pub fallback_duration: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            step: 0.5,
            window: 2.0,
            exact_window: 0.5,
            marker_jitter: 5.0,
            fallback_jitter: 3.0,
            fallback_duration: 17.0,
        }
    }
}

/// One sample of the score curve
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub time_seconds: f64,
    /// `M:SS`
    pub time_label: String,
    /// In [5, 95]
    pub score: u8,
    /// Set only on annotation points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<Zone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<String>,
}

impl ChartPoint {
    /// Whether a marker claimed this sample (clickable dot)
    #[must_use]
    pub fn is_annotated(&self) -> bool {
        self.label.is_some()
    }

    /// Seek command for clicking this point's marker dot
    #[must_use]
    pub fn seek(&self) -> Option<SeekCommand> {
        self.is_annotated().then(|| SeekCommand::resume_at(self.time_seconds))
    }
}

/// Produces the chart's score curve from canonical markers
#[derive(Debug, Clone, Default)]
pub struct TimelineSampler {
    config: ChartConfig,
}

impl TimelineSampler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: ChartConfig) -> Self {
        Self { config }
    }

    /// Sample from 0 to `duration` inclusive
    ///
    /// Yields `floor(duration / step) + 1` points; a non-positive or
    /// non-finite duration yields the single point at 0. A non-finite
    /// fallback score reads as the default overall score.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn sample(
        &self,
        markers: &[CanonicalMarker],
        duration: f64,
        fallback_score: f64,
    ) -> Vec<ChartPoint> {
        let step = if self.config.step > 0.0 {
            self.config.step
        } else {
            0.5
        };
        let duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            0.0
        };
        let fallback_score = if fallback_score.is_finite() {
            fallback_score.clamp(0.0, 100.0)
        } else {
            DEFAULT_DISTRESS_SCORE
        };
        let samples = (duration / step).floor() as usize;

        (0..=samples)
            .map(|i| self.point(i, i as f64 * step, markers, fallback_score))
            .collect()
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn point(
        &self,
        i: usize,
        t: f64,
        markers: &[CanonicalMarker],
        fallback_score: f64,
    ) -> ChartPoint {
        let phase = i as f64;
        let (sum, count) = markers
            .iter()
            .filter(|m| (m.time - t).abs() < self.config.window)
            .fold((0.0, 0usize), |(sum, n), m| (sum + m.score, n + 1));

        let raw = if count > 0 {
            sum / count as f64 + (phase * 0.3).sin() * self.config.marker_jitter
        } else {
            fallback_score + (phase * 0.2).sin() * self.config.fallback_jitter
        };
        let score = if raw.is_finite() { raw } else { fallback_score };
        let score = score.clamp(MIN_SCORE, MAX_SCORE).round() as u8;

        let exact = markers
            .iter()
            .find(|m| (m.time - t).abs() < self.config.exact_window);

        ChartPoint {
            time_seconds: t,
            time_label: timecode::format(t),
            score,
            label: exact.map(|m| m.label.clone()),
            zone: exact.map(|m| m.zone),
            event_type: exact.map(|m| m.event_type),
            evidence: exact.map(|m| m.evidence.clone()).unwrap_or_default(),
        }
    }
}
