use std::path::{Path, PathBuf};

use anyhow::Result;

use etho::{AnnotationReport, EthoConfig, ReportFormat};

use super::output::{load_view, write_output};

pub async fn cmd_report(
    file: &Path,
    config: EthoConfig,
    format: ReportFormat,
    duration: Option<f64>,
    output: Option<PathBuf>,
) -> Result<()> {
    let view = load_view(file, config, duration)?;

    let start = std::time::Instant::now();
    let report = AnnotationReport::generate(&view, format)?;
    tracing::info!(
        "Report generated in {:.1}ms",
        start.elapsed().as_secs_f64() * 1000.0
    );

    write_output(&report, output).await
}
