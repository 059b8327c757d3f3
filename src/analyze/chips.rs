//! Behavior chips
//!
//! Compact, verified behavior markers shown beside the timeline. Markers the
//! analysis service explicitly reported win; otherwise chips are derived
//! from detected facial action codes, one per code.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::sources::lenient;
use super::AnalysisResult;
use crate::timecode::Timestamp;
use crate::zone::Zone;

/// Cap on chips derived from facial codes
const MAX_FACS_CHIPS: usize = 8;

/// Entry of the upstream `behavioral_markers[]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReportedMarker {
    #[serde(deserialize_with = "lenient")]
    pub marker: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub code: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub zone: Option<String>,
    pub timestamp: Timestamp,
    /// `false` marks an observation the service could not confirm
    #[serde(deserialize_with = "lenient")]
    pub verified: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BehaviorChip {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub zone: Zone,
    /// Secondary line, e.g. `"EAD103 at 0:04 (high confidence)"`
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Build chips for one analysis result
#[must_use]
pub fn behavior_chips(analysis: &AnalysisResult) -> Vec<BehaviorChip> {
    let reported: Vec<BehaviorChip> = analysis
        .behavioral_markers
        .iter()
        .filter(|m| m.verified != Some(false))
        .filter_map(reported_chip)
        .collect();

    if !reported.is_empty() {
        return reported;
    }

    let mut seen = HashSet::new();
    analysis
        .visual_analysis
        .facs_codes_detected
        .iter()
        .filter_map(|f| {
            let code = f.code.as_deref().map(str::trim).filter(|c| !c.is_empty())?;
            if !seen.insert(code.to_string()) {
                return None;
            }

            let timestamp = f.timestamp.as_text().map(str::to_string);
            let mut detail = code.to_string();
            if let Some(ts) = &timestamp {
                detail.push_str(&format!(" at {ts}"));
            }
            if let Some(conf) = f.confidence_text() {
                detail.push_str(&format!(" ({conf} confidence)"));
            }

            let text = f
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .unwrap_or(code);

            Some(BehaviorChip {
                text: text.to_string(),
                code: Some(code.to_string()),
                zone: Zone::parse(f.valence_zone()).unwrap_or_default(),
                detail,
                timestamp,
            })
        })
        .take(MAX_FACS_CHIPS)
        .collect()
}

fn reported_chip(marker: &ReportedMarker) -> Option<BehaviorChip> {
    let text = marker.marker.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
    let code = marker
        .code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);
    let timestamp = (!marker.timestamp.is_missing()).then(|| marker.timestamp.display());

    let detail = match (&code, &timestamp) {
        (Some(code), Some(ts)) => format!("{code} at {ts}"),
        (Some(code), None) => code.clone(),
        (None, Some(ts)) => ts.clone(),
        (None, None) => String::new(),
    };

    Some(BehaviorChip {
        text: text.to_string(),
        code,
        zone: marker.zone.as_deref().and_then(Zone::parse).unwrap_or_default(),
        detail,
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reported_markers_win() {
        let a = AnalysisResult::from_json(
            r#"{
                "behavioral_markers": [
                    {"marker": "Whale Eye", "code": "AU5", "zone": "red", "timestamp": "0:03"},
                    {"marker": "Unconfirmed", "verified": false},
                    {"marker": "Soft Eyes", "zone": "green"}
                ],
                "visual_analysis": {"facs_codes_detected": [{"code": "EAD101"}]}
            }"#,
        )
        .unwrap();
        let chips = behavior_chips(&a);

        assert_eq!(chips.len(), 2);
        assert_eq!(chips[0].text, "Whale Eye");
        assert_eq!(chips[0].zone, Zone::Red);
        assert_eq!(chips[0].detail, "AU5 at 0:03");
        assert_eq!(chips[1].detail, "");
    }

    #[test]
    fn test_mistyped_marker_fields_keep_chip() {
        let a = AnalysisResult::from_json(
            r#"{"behavioral_markers": [{"marker": "Play bow", "code": 5, "verified": "yes"}]}"#,
        )
        .unwrap();
        let chips = behavior_chips(&a);

        assert_eq!(chips.len(), 1);
        assert_eq!(chips[0].text, "Play bow");
        assert_eq!(chips[0].code, None);
    }

    #[test]
    fn test_facs_chips_unique_and_capped() {
        let codes: Vec<String> = (0..12)
            .map(|i| format!(r#"{{"code": "C{i}", "valence": "positive"}}"#))
            .chain(std::iter::once(r#"{"code": "C0", "valence": "negative"}"#.to_string()))
            .collect();
        let json = format!(
            r#"{{"visual_analysis": {{"facs_codes_detected": [{}]}}}}"#,
            codes.join(",")
        );
        let chips = behavior_chips(&AnalysisResult::from_json(&json).unwrap());

        assert_eq!(chips.len(), MAX_FACS_CHIPS);
        assert!(chips.iter().all(|c| c.zone == Zone::Green));
    }

    #[test]
    fn test_facs_chip_detail() {
        let a = AnalysisResult::from_json(
            r#"{"visual_analysis": {"facs_codes_detected": [
                {"code": "AD137", "description": "Nose lick", "valence": "negative", "timestamp": "0:09", "confidence": "high"}
            ]}}"#,
        )
        .unwrap();
        let chips = behavior_chips(&a);

        assert_eq!(chips[0].text, "Nose lick");
        assert_eq!(chips[0].zone, Zone::Red);
        assert_eq!(chips[0].detail, "AD137 at 0:09 (high confidence)");
    }
}
