use std::path::Path;

use anyhow::Result;

use etho::{timecode, EthoConfig};

use super::output::{load_view, sparkline};

pub async fn cmd_waveform(
    file: &Path,
    mut config: EthoConfig,
    duration: Option<f64>,
    bars: Option<usize>,
    json: bool,
) -> Result<()> {
    if let Some(bars) = bars {
        config.waveform.total_bars = bars;
    }
    let view = load_view(file, config, duration)?;
    let waveform = view.waveform();

    if json {
        println!("{}", serde_json::to_string_pretty(waveform)?);
        return Ok(());
    }

    println!("{}", sparkline(waveform.iter().map(|b| b.height)));

    let events = view.sound_events();
    if events.is_empty() {
        println!("\nNo sound events");
        return Ok(());
    }

    println!();
    for event in events {
        println!(
            "{:>6}-{:<6} {:<6} {}",
            timecode::format(event.start),
            timecode::format(event.end),
            event.zone,
            event.label
        );
    }

    let legend = view.legend();
    if !legend.is_empty() {
        let entries: Vec<String> = legend
            .iter()
            .map(|e| format!("{} ({})", e.name, e.zone))
            .collect();
        println!("\nLegend: {}", entries.join(", "));
    }

    Ok(())
}
