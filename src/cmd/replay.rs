use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Result};

use etho::annotate::{SyncTransition, TaskNarrator};
use etho::{timecode, EthoConfig, Outcome};

use super::output::load_view;

pub async fn cmd_replay(
    file: &Path,
    mut config: EthoConfig,
    duration: Option<f64>,
    step: f64,
    realtime: bool,
    mute: bool,
) -> Result<()> {
    if !(step.is_finite() && step > 0.0) {
        bail!("--step must be a positive number of seconds, got {step}");
    }
    if mute {
        config.sync.narration_enabled = false;
    }

    let view = load_view(file, config, duration)?;
    if let Outcome::NoSubjectDetected { message } = view.outcome() {
        println!("⚠️  {message}");
        return Ok(());
    }

    let duration = view.duration();
    eprintln!("▶️  Replaying {duration:.1}s at {step}s steps");

    let mut sync = view.sync_controller(TaskNarrator::new());
    let mut activations = 0usize;

    for tick in 0..=last_tick(duration, step) {
        #[allow(clippy::cast_precision_loss)]
        let t = tick as f64 * step;

        match sync.on_time_update(t) {
            SyncTransition::Activated(cue) => {
                activations += 1;
                println!("{:>6}  [{}] {}", timecode::format(t), cue.zone, cue.text);
            }
            SyncTransition::Cleared => {
                println!("{:>6}  (clear)", timecode::format(t));
            }
            SyncTransition::Unchanged => {}
        }

        if realtime {
            tokio::time::sleep(Duration::from_secs_f64(step)).await;
        }
    }

    let mut narrator = sync.into_sink();
    if realtime {
        narrator.wait().await;
    }
    eprintln!(
        "⏹️  {activations} cues shown, {} narrations completed",
        narrator.finished().len()
    );

    Ok(())
}

/// Index of the last sample at or before `duration`. Saturates instead of
/// overflowing for huge ratios.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn last_tick(duration: f64, step: f64) -> u64 {
    (duration / step).floor() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_tick() {
        assert_eq!(last_tick(20.0, 0.25), 80);
        assert_eq!(last_tick(17.0, 0.3), 56);
        assert_eq!(last_tick(0.1, 0.25), 0);
    }

    #[test]
    fn test_last_tick_saturates() {
        assert_eq!(last_tick(1e300, 1e-300), u64::MAX);
        assert_eq!(last_tick(f64::MAX, f64::MIN_POSITIVE), u64::MAX);
    }
}
