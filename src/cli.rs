use clap::{Args, Parser, Subcommand};
use prerollforge_common::ProResProfile;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "prerollforge")]
#[command(author, version, about = "Preroll leader generator: title card, sync pop and tone")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a 10-second preroll into the output directory
    Generate(GenerateArgs),

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Frames per second, e.g. 23.976 or 25 [default: from config]
    #[arg(long)]
    pub frame_rate: Option<String>,

    /// Frame size as WIDTHxHEIGHT [default: from config]
    #[arg(long)]
    pub resolution: Option<String>,

    /// Film title shown on the intro card
    #[arg(long, required = true)]
    pub title: String,

    /// Version label shown below the title
    #[arg(long)]
    pub version_text: Option<String>,

    /// Starting timecode of the preroll [default: from config]
    #[arg(long)]
    pub timecode: Option<String>,

    /// Directory the .mov is written to [default: from config]
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Render without the audio track
    #[arg(long)]
    pub no_audio: bool,

    /// ProRes profile (proxy, lt, standard, hq, 4444, 4444xq)
    #[arg(long)]
    pub profile: Option<ProResProfile>,

    /// TrueType font for overlay text
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Show the encoder commands without running ffmpeg
    #[arg(long)]
    pub dry_run: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
