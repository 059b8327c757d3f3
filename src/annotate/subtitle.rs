//! Subtitle cues from interpretation lines
//!
//! Each interpretation line becomes a cue valid for a fixed span after its
//! timestamp. The track answers "which cue is showing at time t" for the
//! sync controller and exports to SRT or `WebVTT`.

use serde::Serialize;
use std::fmt::Write as FmtWrite;

use crate::analyze::{InterpretLine, Result};
use crate::zone::{Zone, ZoneClassifier};

/// Subtitle format type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum SubtitleFormat {
    /// `SubRip` format (.srt)
    #[default]
    Srt,
    /// `WebVTT` format (.vtt)
    Vtt,
}

impl SubtitleFormat {
    /// Get file extension for this format
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Vtt => "vtt",
        }
    }
}

/// The displayed subtitle/narration unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtitleCue {
    pub text: String,
    pub zone: Zone,
    /// `"{time}-{index}"`; identity for re-trigger suppression
    pub key: String,
}

/// A cue and the half-open span `[start, end)` it is valid on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CueSpan {
    pub start: f64,
    pub end: f64,
    pub cue: SubtitleCue,
}

impl CueSpan {
    #[must_use]
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t < self.end
    }
}

/// Time-ordered cues of one video
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CueTrack {
    spans: Vec<CueSpan>,
}

impl CueTrack {
    /// Build cues from interpretation lines. Lines without text are skipped.
    /// The key keeps the line's position in the source list.
    #[must_use]
    pub fn from_lines(lines: &[InterpretLine], cue_duration: f64) -> Self {
        let classifier = ZoneClassifier::behavior();
        let cue_duration = if cue_duration.is_finite() && cue_duration > 0.0 {
            cue_duration
        } else {
            0.0
        };

        let mut spans: Vec<CueSpan> = lines
            .iter()
            .enumerate()
            .filter_map(|(i, line)| {
                let text = line.pov_text()?;
                let start = line.timestamp.seconds();
                Some(CueSpan {
                    start,
                    end: start + cue_duration,
                    cue: SubtitleCue {
                        text: text.to_string(),
                        zone: classifier.classify(text, line.zone.as_deref()),
                        key: format!("{start}-{i}"),
                    },
                })
            })
            .collect();

        spans.sort_by(|a, b| a.start.total_cmp(&b.start));
        tracing::debug!("Built cue track with {} cues", spans.len());
        Self { spans }
    }

    /// The most recent cue whose span contains `t`
    #[must_use]
    pub fn active_at(&self, t: f64) -> Option<&SubtitleCue> {
        self.spans
            .iter()
            .rev()
            .find(|span| span.contains(t))
            .map(|span| &span.cue)
    }

    #[must_use]
    pub fn spans(&self) -> &[CueSpan] {
        &self.spans
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Render the track in the given format
    pub fn render(&self, format: SubtitleFormat) -> Result<String> {
        match format {
            SubtitleFormat::Srt => self.to_srt(),
            SubtitleFormat::Vtt => self.to_vtt(),
        }
    }

    /// `SubRip` rendering
    pub fn to_srt(&self) -> Result<String> {
        let mut output = String::new();

        for (i, span) in self.spans.iter().enumerate() {
            // Sequence number (1-indexed)
            writeln!(output, "{}", i + 1)?;
            writeln!(
                output,
                "{} --> {}",
                format_srt_time(to_millis(span.start)),
                format_srt_time(to_millis(span.end))
            )?;
            writeln!(output, "{}", span.cue.text)?;
            writeln!(output)?;
        }

        Ok(output)
    }

    /// `WebVTT` rendering; the zone rides along as a cue identifier
    pub fn to_vtt(&self) -> Result<String> {
        let mut output = String::from("WEBVTT\n\n");

        for span in &self.spans {
            writeln!(output, "{} {}", span.cue.key, span.cue.zone)?;
            writeln!(
                output,
                "{} --> {}",
                format_vtt_time(to_millis(span.start)),
                format_vtt_time(to_millis(span.end))
            )?;
            writeln!(output, "{}", span.cue.text)?;
            writeln!(output)?;
        }

        Ok(output)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_millis(seconds: f64) -> u64 {
    (seconds.max(0.0) * 1000.0).round() as u64
}

/// Format time as SRT timestamp (HH:MM:SS,mmm)
fn format_srt_time(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let millis = ms % 1000;
    format!("{hours:02}:{minutes:02}:{seconds:02},{millis:03}")
}

/// Format time as VTT timestamp (HH:MM:SS.mmm)
fn format_vtt_time(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let millis = ms % 1000;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}
