// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "cinematic")]
#[command(about = "Excel Service Hub 3D cinematic promo", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// `play` with default options when no subcommand is given
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Play(PlayArgs::default()))
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Open a window and play the cinematic
    Play(PlayArgs),
    /// Render the cinematic to a PNG sequence and optionally a WAV file
    Export(ExportArgs),
    /// Print scene weights over the timeline
    Timeline(TimelineArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct PlayArgs {
    /// JSON config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Disable the ambient soundtrack
    #[arg(long)]
    pub mute: bool,

    /// Disable the voice-over
    #[arg(long = "no-voice")]
    pub no_voice: bool,

    /// Free camera (WASD, Space/Shift, Q/E) instead of the fixed view
    #[arg(long)]
    pub inspect: bool,

    /// Internal resolution relative to the window, in (0, 1]
    #[arg(long = "render-scale")]
    pub render_scale: Option<f32>,

    /// Hide the frame rate counter
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Directory receiving frame_00000.png, frame_00001.png, ...
    #[arg(long)]
    pub out: PathBuf,

    #[arg(long, default_value_t = 30)]
    pub fps: u32,

    #[arg(long, default_value_t = 960)]
    pub width: u32,

    #[arg(long, default_value_t = 540)]
    pub height: u32,

    /// Also write the soundtrack as a WAV file
    #[arg(long)]
    pub audio: Option<PathBuf>,

    /// JSON config file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct TimelineArgs {
    /// Milliseconds between rows
    #[arg(long, default_value_t = 500.0)]
    pub step: f64,

    /// JSON config file
    #[arg(long)]
    pub config: Option<PathBuf>,
}
