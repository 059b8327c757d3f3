use std::path::{Path, PathBuf};

use anyhow::Result;

use etho::{EthoConfig, SubtitleFormat};

use super::output::{load_view, write_output};

pub async fn cmd_subtitles(
    file: &Path,
    config: EthoConfig,
    format: SubtitleFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let view = load_view(file, config, None)?;
    let track = view.cue_track();

    if track.is_empty() {
        tracing::warn!("No interpretation lines, subtitle track is empty");
    }

    let content = track.render(format)?;
    write_output(&content, output).await
}
