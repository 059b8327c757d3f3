use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use etho::{AnalysisResult, AnalysisView, EthoConfig};

/// Load an analysis result and wrap it in a view at the given duration
pub fn load_view(file: &Path, config: EthoConfig, duration: Option<f64>) -> Result<AnalysisView> {
    let analysis = AnalysisResult::load(file)
        .with_context(|| format!("failed to load analysis from {}", file.display()))?;

    let mut view = AnalysisView::with_config(analysis, config);
    if let Some(duration) = duration {
        view.set_duration(duration);
    }
    tracing::info!(
        "Loaded {} ({:.1}s, {} markers)",
        file.display(),
        view.duration(),
        view.markers().len()
    );
    Ok(view)
}

/// Write to a file if given, otherwise to stdout
pub async fn write_output(content: &str, output_file: Option<PathBuf>) -> Result<()> {
    if let Some(path) = output_file {
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("💾 Saved {} bytes to {}", content.len(), path.display());
        return Ok(());
    }

    print!("{content}");
    if !content.ends_with('\n') {
        println!();
    }
    Ok(())
}

/// Text sparkline of percent heights
pub fn sparkline(heights: impl Iterator<Item = f64>) -> String {
    const LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

    heights
        .map(|h| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let level = ((h.clamp(0.0, 100.0) / 100.0) * 7.0).round() as usize;
            LEVELS[level.min(LEVELS.len() - 1)]
        })
        .collect()
}
