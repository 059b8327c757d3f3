//! Integration tests for basic CLI behavior.
//!
//! Tests that the binary exists, accepts standard flags, each subcommand
//! responds to `--help`, and the subcommands render the fixture analysis.

#![allow(deprecated)] // cargo_bin deprecation; replacement not yet stable

use assert_cmd::Command;
use predicates::prelude::*;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/analysis.json");
const NO_PET: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/no_pet.json");

/// Helper: get a Command for the `etho` binary, isolated from any user config.
fn etho() -> Command {
    let mut cmd = Command::cargo_bin("etho").expect("binary 'etho' should be built");
    cmd.args(["--config", "/nonexistent/etho/config.toml"]);
    cmd
}

// ─── Top-level flags ─────────────────────────────────────────────────────────

#[test]
fn help_flag_shows_usage() {
    etho()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: etho"))
        .stdout(predicate::str::contains("markers"))
        .stdout(predicate::str::contains("chart"))
        .stdout(predicate::str::contains("waveform"))
        .stdout(predicate::str::contains("subtitles"))
        .stdout(predicate::str::contains("replay"))
        .stdout(predicate::str::contains("report"));
}

#[test]
fn version_flag_shows_semver() {
    Command::cargo_bin("etho")
        .expect("binary 'etho' should be built")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^etho \d+\.\d+\.\d+\n$").unwrap());
}

#[test]
fn no_args_shows_error_and_usage() {
    Command::cargo_bin("etho")
        .expect("binary 'etho' should be built")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: etho"));
}

#[test]
fn invalid_subcommand_fails() {
    etho()
        .arg("this-is-not-a-real-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// ─── Subcommand help ─────────────────────────────────────────────────────────

#[test]
fn subtitles_help() {
    etho()
        .args(["subtitles", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Export interpretation cues"))
        .stdout(predicate::str::contains("<FILE>"))
        .stdout(predicate::str::contains("--format"));
}

#[test]
fn replay_help() {
    etho()
        .args(["replay", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Simulate playback"))
        .stdout(predicate::str::contains("--realtime"))
        .stdout(predicate::str::contains("--mute"));
}

#[test]
fn markers_missing_file_fails() {
    etho()
        .arg("markers")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<FILE>"));
}

// ─── Rendering ───────────────────────────────────────────────────────────────

#[test]
fn markers_table() {
    etho()
        .args(["markers", FIXTURE])
        .assert()
        .success()
        .stdout(predicate::str::contains("(yellow)  8 markers"))
        .stdout(predicate::str::contains("Alert, mildly frustrated waiting behavior"))
        .stdout(predicate::str::contains("Growl: low_warning"))
        .stdout(predicate::str::contains("Tail tucked"));
}

#[test]
fn markers_json_is_sorted_array() {
    let output = etho().args(["markers", FIXTURE, "--json"]).output().unwrap();
    assert!(output.status.success());

    let markers: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let times: Vec<f64> = markers
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["time"].as_f64().unwrap())
        .collect();
    assert_eq!(times.len(), 8);
    assert!(times.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn markers_no_pet_message() {
    etho()
        .args(["markers", NO_PET])
        .assert()
        .success()
        .stdout(predicate::str::contains("couldn't find a pet"));
}

#[test]
fn chart_json_point_count() {
    let output = etho()
        .args(["chart", FIXTURE, "--duration", "30", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let points: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(points.as_array().unwrap().len(), 61);
}

#[test]
fn waveform_bar_override() {
    let output = etho()
        .args(["waveform", FIXTURE, "--bars", "40", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let bars: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(bars.as_array().unwrap().len(), 40);
}

#[test]
fn waveform_text_shows_legend() {
    etho()
        .args(["waveform", FIXTURE])
        .assert()
        .success()
        .stdout(predicate::str::contains("Legend: low warning (red)"));
}

#[test]
fn subtitles_srt() {
    etho()
        .args(["subtitles", FIXTURE])
        .assert()
        .success()
        .stdout(predicate::str::contains("00:00:10,000 --> 00:00:14,000"))
        .stdout(predicate::str::contains("Is that for me?"));
}

#[test]
fn subtitles_vtt() {
    etho()
        .args(["subtitles", FIXTURE, "--format", "vtt"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("WEBVTT"));
}

#[test]
fn replay_shows_cues_in_order() {
    etho()
        .args(["replay", FIXTURE, "--duration", "20", "--mute"])
        .assert()
        .success()
        .stdout(
            predicate::str::is_match(r"(?s)Someone is out there.*Is that for me\?.*calm now")
                .unwrap(),
        );
}

#[test]
fn replay_rejects_bad_step() {
    etho()
        .args(["replay", FIXTURE, "--step", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--step"));
}

#[test]
fn report_markdown() {
    etho()
        .args(["report", FIXTURE, "--format", "markdown"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Behavior Annotation Report"))
        .stdout(predicate::str::contains("- **Species**: dog"));
}

#[test]
fn report_missing_file_fails() {
    etho()
        .args(["report", "/nonexistent/analysis.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load analysis"));
}

#[test]
fn bad_config_fails() {
    let path = std::env::temp_dir().join(format!("etho-bad-{}.toml", std::process::id()));
    std::fs::write(&path, "[waveform]\ntotal_bars = \"lots\"\n").unwrap();

    Command::cargo_bin("etho")
        .expect("binary 'etho' should be built")
        .args(["--config", path.to_str().unwrap(), "markers", FIXTURE])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid TOML"));

    std::fs::remove_file(&path).unwrap();
}
