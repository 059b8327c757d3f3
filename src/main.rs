//! `etho` CLI - Inspect the annotation primitives derived from an analysis result

mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use etho::{ReportFormat, SubtitleFormat};

use cmd::{cmd_chart, cmd_markers, cmd_replay, cmd_report, cmd_subtitles, cmd_waveform};

#[derive(Parser)]
#[command(name = "etho")]
#[command(about = "Behavioral annotation timeline for analyzed pet videos")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/etho/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List fused canonical markers
    Markers {
        /// Analysis result JSON file
        file: PathBuf,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Sample the severity chart
    Chart {
        /// Analysis result JSON file
        file: PathBuf,

        /// Video duration in seconds (default: configured fallback)
        #[arg(short, long)]
        duration: Option<f64>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Synthesize the audio-intensity waveform
    Waveform {
        /// Analysis result JSON file
        file: PathBuf,

        /// Video duration in seconds (default: configured fallback)
        #[arg(short, long)]
        duration: Option<f64>,

        /// Number of bars (default: configured)
        #[arg(short, long)]
        bars: Option<usize>,

        /// Emit JSON instead of a sparkline
        #[arg(long)]
        json: bool,
    },

    /// Export interpretation cues as subtitles
    Subtitles {
        /// Analysis result JSON file
        file: PathBuf,

        /// Subtitle format
        #[arg(short, long, value_enum, default_value = "srt")]
        format: SubtitleFormat,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Simulate playback and drive subtitle sync with narration
    Replay {
        /// Analysis result JSON file
        file: PathBuf,

        /// Video duration in seconds (default: configured fallback)
        #[arg(short, long)]
        duration: Option<f64>,

        /// Seconds between time updates
        #[arg(long, default_value = "0.25")]
        step: f64,

        /// Sleep between updates as real playback would
        #[arg(long)]
        realtime: bool,

        /// Disable narration
        #[arg(long)]
        mute: bool,
    },

    /// Generate a full annotation report
    Report {
        /// Analysis result JSON file
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: ReportFormat,

        /// Video duration in seconds (default: configured fallback)
        #[arg(short, long)]
        duration: Option<f64>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; RUST_LOG overrides
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let config = etho::config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Markers { file, json } => {
            cmd_markers(&file, config, json).await?;
        }
        Commands::Chart {
            file,
            duration,
            json,
        } => {
            cmd_chart(&file, config, duration, json).await?;
        }
        Commands::Waveform {
            file,
            duration,
            bars,
            json,
        } => {
            cmd_waveform(&file, config, duration, bars, json).await?;
        }
        Commands::Subtitles {
            file,
            format,
            output,
        } => {
            cmd_subtitles(&file, config, format, output).await?;
        }
        Commands::Replay {
            file,
            duration,
            step,
            realtime,
            mute,
        } => {
            cmd_replay(&file, config, duration, step, realtime, mute).await?;
        }
        Commands::Report {
            file,
            format,
            duration,
            output,
        } => {
            cmd_report(&file, config, format, duration, output).await?;
        }
    }

    Ok(())
}
