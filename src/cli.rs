use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rttstream")]
#[command(author, version, about = "Stream local videos as HLS, transcoding segments on demand")]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Directory that served videos are confined to (defaults to the
    /// working directory)
    pub root: Option<PathBuf>,

    /// Path to config file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Nominal segment length in seconds
    #[arg(short = 't', long = "segment-time", visible_alias = "st", value_name = "SECS")]
    pub segment_time: Option<String>,

    /// Segment planning strategy: fixed or keyframe
    #[arg(long)]
    pub strategy: Option<String>,

    /// Maximum number of concurrent transcodes
    #[arg(long, value_name = "N")]
    pub max_transcodes: Option<usize>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that ffmpeg and ffprobe are available
    CheckTools,

    /// Probe a video and print what the playlist would be built from
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
