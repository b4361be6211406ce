//! Pulseframe - frame loop player
//!
//! Runs the procedural gradient and tone loop against the default audio
//! output device and any connected gamepads. There is no window: the
//! backbuffer can be written out as a PNG when the loop ends.
//!
//! # Usage
//!
//! ```bash
//! pulseframe --frames 600
//! pulseframe --frames 120 --screenshot gradient.png
//! pulseframe --null-audio --unpaced --frames 1000
//! ```
//!
//! Without `--frames` the loop runs until the process is killed, which skips
//! the shutdown summary; `--screenshot` therefore requires a frame limit.
//!
//! Left stick scrolls the gradient (X: blue, Y: green) and bends the tone.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use pulseframe_core::audio::SoundOutput;
use pulseframe_core::config::{self, Config};
use pulseframe_core::framebuffer::FrameBuffer;
use pulseframe_core::input::GamepadBackend;
use pulseframe_core::platform::{Collaborators, SystemClock};
use pulseframe_core::runtime::{Runtime, RuntimeConfig};

mod audio_output;
mod headless;
mod platform;

use headless::{HeadlessEvents, SnapshotPresenter};
use platform::{PlayerAudio, PlayerPlatform};

#[derive(Parser)]
#[command(name = "pulseframe")]
#[command(
    author,
    version,
    about = "Pulseframe - procedural gradient and ring buffer audio loop"
)]
struct Args {
    /// Quit after this many frames (0 = run until the process is killed)
    #[arg(long, short = 'n', default_value = "0")]
    frames: u64,

    /// Backbuffer width override
    #[arg(long)]
    width: Option<u32>,

    /// Backbuffer height override
    #[arg(long)]
    height: Option<u32>,

    /// Config file to use instead of the platform config directory
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Skip the audio device and use a silent wall-clock ring
    #[arg(long)]
    null_audio: bool,

    /// Write the final backbuffer to this PNG file (needs --frames)
    #[arg(long, value_name = "FILE")]
    screenshot: Option<PathBuf>,

    /// Run frames back to back without pacing
    #[arg(long)]
    unpaced: bool,
}

/// Frame limit for the event source, `None` to run until killed
fn frame_limit(args: &Args) -> Result<Option<u64>> {
    if args.frames == 0 && args.screenshot.is_some() {
        anyhow::bail!("--screenshot requires --frames N");
    }
    Ok((args.frames > 0).then_some(args.frames))
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => config::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => config::load(),
    };
    if let Some(width) = args.width {
        config.video.width = width;
    }
    if let Some(height) = args.height {
        config.video.height = height;
    }
    if args.unpaced {
        config.runtime.tick_rate = 0;
    }
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let frame_limit = frame_limit(&args)?;
    let config = load_config(&args)?;

    let backbuffer = FrameBuffer::new(config.video.width, config.video.height)
        .context("Failed to allocate backbuffer")?;
    let sound = SoundOutput::from_config(&config.audio).context("Invalid audio settings")?;

    let audio = PlayerAudio::open(&sound, args.null_audio);
    tracing::info!("Audio: {}", audio.describe());

    let controllers = GamepadBackend::detect();
    if !controllers.is_present() {
        tracing::info!("Gamepads unavailable; controller slots report disconnected");
    }

    let platform = Collaborators::<PlayerPlatform> {
        events: HeadlessEvents::new(frame_limit),
        controllers,
        audio,
        presenter: SnapshotPresenter::new(
            config.video.width,
            config.video.height,
            args.screenshot.is_some(),
        ),
        clock: SystemClock::new(),
    };

    let mut runtime = Runtime::new(
        platform,
        RuntimeConfig::from_config(&config),
        backbuffer,
        sound,
    )
    .context("Failed to set up frame loop")?;

    let frames = runtime.run().context("Failed to start frame loop")?;

    if let Some(path) = &args.screenshot {
        runtime.platform().presenter.save_last(path)?;
    }

    let history = &runtime.context().history;
    if let (Some(average), Some(worst)) = (history.average_ms(), history.worst_ms()) {
        tracing::info!(
            "{} frames, last {} averaged {:.02}ms/f (worst {:.02}ms)",
            frames,
            history.len(),
            average,
            worst
        );
    }

    Ok(())
}
