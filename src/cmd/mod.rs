mod chart;
mod markers;
mod output;
mod replay;
mod report;
mod subtitles;
mod waveform;

pub use chart::cmd_chart;
pub use markers::cmd_markers;
pub use replay::cmd_replay;
pub use report::cmd_report;
pub use subtitles::cmd_subtitles;
pub use waveform::cmd_waveform;
