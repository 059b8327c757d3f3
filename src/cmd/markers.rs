use std::path::Path;

use anyhow::Result;

use etho::{timecode, EthoConfig, Outcome};

use super::output::load_view;

pub async fn cmd_markers(file: &Path, config: EthoConfig, json: bool) -> Result<()> {
    let view = load_view(file, config, None)?;

    if json {
        println!("{}", serde_json::to_string_pretty(view.markers())?);
        return Ok(());
    }

    match view.outcome() {
        Outcome::NoSubjectDetected { message } => {
            println!("⚠️  {message}");
        }
        Outcome::NoMarkers => {
            println!("No behavioral events to annotate");
        }
        Outcome::Annotated { markers } => {
            let analysis = view.analysis();
            println!(
                "📊 Distress {:.0}/100 ({})  {markers} markers",
                analysis.distress_score(),
                analysis.zone_label()
            );
            println!("   {}\n", analysis.summary());
            for m in view.markers() {
                println!(
                    "{:>6}  {:<4}  {:>3.0}  {:<13}  {}",
                    timecode::format(m.time),
                    m.zone.badge(),
                    m.score,
                    format!("{:?}", m.event_type).to_lowercase(),
                    m.label
                );
            }
        }
    }

    let chips = view.chips();
    if !chips.is_empty() {
        println!("\n🏷️  Behavior markers");
        for chip in chips {
            println!("   {} [{}] {}", chip.text, chip.zone, chip.detail);
        }
    }

    Ok(())
}
