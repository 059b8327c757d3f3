use std::path::Path;

use anyhow::Result;

use etho::EthoConfig;

use super::output::{load_view, sparkline};

pub async fn cmd_chart(
    file: &Path,
    config: EthoConfig,
    duration: Option<f64>,
    json: bool,
) -> Result<()> {
    let view = load_view(file, config, duration)?;
    let points = view.chart();

    if json {
        println!("{}", serde_json::to_string_pretty(points)?);
        return Ok(());
    }

    println!("{}", sparkline(points.iter().map(|p| f64::from(p.score))));
    println!();
    for p in points.iter().filter(|p| p.is_annotated()) {
        println!(
            "{:>6}  {:>2}  {}",
            p.time_label,
            p.score,
            p.label.as_deref().unwrap_or_default()
        );
    }
    eprintln!("   {} points over {:.1}s", points.len(), view.duration());

    Ok(())
}
