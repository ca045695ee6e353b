use anyhow::Context;
use clap::Parser;

use cinematic::cli::{Cli, Command, ExportArgs, PlayArgs, TimelineArgs};
use cinematic::export::{self, ExportOptions};
use cinematic::player::{self, PlayerOptions};
use cinematic::Config;

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    Config::load_or_default(path).with_context(|| match path {
        Some(p) => format!("failed to load config {}", p.display()),
        None => "invalid default config".to_string(),
    })
}

fn run_play(args: PlayArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if args.mute {
        config.audio.enabled = false;
    }
    if args.no_voice {
        config.voice.enabled = false;
    }
    if let Some(scale) = args.render_scale {
        config.render.render_scale = scale;
    }
    config.validate().context("invalid options")?;

    println!("Excel Service Hub - Enter starts, Escape quits");
    if args.inspect {
        println!("Inspect mode: WASD, Space/Shift, Q/E, R to reset");
    }

    let options = PlayerOptions {
        inspect: args.inspect,
        show_fps: !args.no_ui,
    };
    player::run(&config, options).context("player failed")
}

fn run_export(args: ExportArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let options = ExportOptions {
        out_dir: args.out,
        fps: args.fps,
        width: args.width,
        height: args.height,
        audio: args.audio,
    };
    let summary = export::export(&config, &options).context("export failed")?;
    println!(
        "Wrote {} frames to {}{}",
        summary.frames,
        options.out_dir.display(),
        match &options.audio {
            Some(p) => format!(" and {}", p.display()),
            None => String::new(),
        }
    );
    Ok(())
}

fn run_timeline(args: TimelineArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.step > 0.0, "--step must be positive");
    let config = load_config(args.config.as_deref())?;
    let timeline = config.timeline;

    println!("{:>8}  {:>6}  {:>8}", "ms", "office", "services");
    let mut t = 0.0;
    while t <= timeline.total_duration_ms {
        let w = timeline.blend(t);
        println!("{:>8.0}  {:>6.3}  {:>8.3}", t, w.office, w.services);
        t += args.step;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command() {
        Command::Play(args) => run_play(args),
        Command::Export(args) => run_export(args),
        Command::Timeline(args) => run_timeline(args),
    }
}
