//! Annotation report generation
//!
//! Bundles every derived primitive of one analyzed video into a single
//! document: JSON for machines, Markdown for people.

use serde::Serialize;
use std::fmt::Write as FmtWrite;
use std::path::Path;

use super::{AnalysisView, BehaviorChip, CanonicalMarker, Outcome, Result};
use crate::annotate::{ChartPoint, CueSpan, LegendEntry, SoundInterval, WaveformBar};
use crate::timecode;
use crate::zone::Zone;

/// Report output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ReportFormat {
    /// JSON (default, machine-readable)
    #[default]
    Json,
    /// Markdown (human-readable)
    Markdown,
}

/// Everything derived from one (analysis, duration) pair
#[derive(Debug, Serialize)]
pub struct ReportBundle<'a> {
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<&'a str>,
    pub duration: f64,
    pub distress_score: f64,
    pub zone: Zone,
    pub zone_label: String,
    pub summary: String,
    pub markers: &'a [CanonicalMarker],
    pub chips: &'a [BehaviorChip],
    pub sound_events: &'a [SoundInterval],
    pub legend: Vec<LegendEntry>,
    pub cues: &'a [CueSpan],
    pub chart: &'a [ChartPoint],
    pub waveform: &'a [WaveformBar],
}

impl<'a> ReportBundle<'a> {
    #[must_use]
    pub fn from_view(view: &'a AnalysisView) -> Self {
        let analysis = view.analysis();
        Self {
            outcome: view.outcome(),
            species: analysis.species.as_deref(),
            duration: view.duration(),
            distress_score: analysis.distress_score(),
            zone: analysis.overall_zone(),
            zone_label: analysis.zone_label(),
            summary: analysis.summary(),
            markers: view.markers(),
            chips: view.chips(),
            sound_events: view.sound_events(),
            legend: view.legend(),
            cues: view.cue_track().spans(),
            chart: view.chart(),
            waveform: view.waveform(),
        }
    }
}

/// Annotation report generator
pub struct AnnotationReport;

impl AnnotationReport {
    /// Generate report in specified format
    pub fn generate(view: &AnalysisView, format: ReportFormat) -> Result<String> {
        let bundle = ReportBundle::from_view(view);
        match format {
            ReportFormat::Json => Self::to_json(&bundle),
            ReportFormat::Markdown => Self::to_markdown(&bundle),
        }
    }

    /// Save report to file
    pub fn save(view: &AnalysisView, format: ReportFormat, path: &Path) -> Result<()> {
        let content = Self::generate(view, format)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn to_json(bundle: &ReportBundle<'_>) -> Result<String> {
        Ok(serde_json::to_string_pretty(bundle)?)
    }

    fn to_markdown(bundle: &ReportBundle<'_>) -> Result<String> {
        let mut md = String::new();

        writeln!(md, "# Behavior Annotation Report\n")?;

        if let Outcome::NoSubjectDetected { message } = &bundle.outcome {
            writeln!(md, "> {message}")?;
            return Ok(md);
        }

        writeln!(md, "## Summary\n")?;
        writeln!(md, "{}\n", bundle.summary)?;
        if let Some(species) = bundle.species {
            writeln!(md, "- **Species**: {species}")?;
        }
        writeln!(md, "- **Duration**: {}", timecode::format(bundle.duration))?;
        writeln!(
            md,
            "- **Distress score**: {:.0} ({})",
            bundle.distress_score,
            bundle.zone_label
        )?;
        writeln!(md, "- **Markers**: {}", bundle.markers.len())?;
        writeln!(md)?;

        writeln!(md, "## Timeline\n")?;
        if bundle.markers.is_empty() {
            writeln!(md, "_No behavioral events to annotate._")?;
        } else {
            writeln!(md, "| Time | Event | Zone | Score |")?;
            writeln!(md, "|------|-------|------|-------|")?;
            for m in bundle.markers {
                writeln!(
                    md,
                    "| {} | {} | {} | {:.0} |",
                    timecode::format(m.time),
                    m.label.replace('|', "\\|"),
                    m.zone.badge(),
                    m.score
                )?;
            }
        }
        writeln!(md)?;

        if !bundle.chips.is_empty() {
            writeln!(md, "## Behavior Markers\n")?;
            for chip in bundle.chips {
                if chip.detail.is_empty() {
                    writeln!(md, "- **{}** ({})", chip.text, chip.zone)?;
                } else {
                    writeln!(md, "- **{}** ({}): {}", chip.text, chip.zone, chip.detail)?;
                }
            }
            writeln!(md)?;
        }

        if !bundle.sound_events.is_empty() {
            writeln!(md, "## Sounds\n")?;
            for sound in bundle.sound_events {
                write!(
                    md,
                    "- **{}-{}** {} ({})",
                    timecode::format(sound.start),
                    timecode::format(sound.end),
                    sound.label,
                    sound.zone
                )?;
                if let Some(ref interpretation) = sound.interpretation {
                    write!(md, ": {interpretation}")?;
                }
                writeln!(md)?;
            }
            writeln!(md)?;
        }

        if !bundle.cues.is_empty() {
            writeln!(md, "## Interpretation\n")?;
            for span in bundle.cues {
                writeln!(
                    md,
                    "**[{}]** _{}_\n> {}\n",
                    timecode::format(span.start),
                    span.cue.zone,
                    span.cue.text
                )?;
            }
        }

        Ok(md)
    }
}
