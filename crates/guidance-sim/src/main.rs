//! guidance-sim - replay recorded detections through spatial guidance

use anyhow::{Context, Result};
use announcer::LogSynthesizer;
use clap::{Parser, ValueEnum};
use guidance::{GuidanceMode, GuidanceTracker};
use guidance_sim::{init_logging, parse_recording, replay, Pacing, SimSettings};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::info;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Direction,
    Threat,
}

impl From<ModeArg> for GuidanceMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Direction => GuidanceMode::Direction,
            ModeArg::Threat => GuidanceMode::Threat,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Settings file (TOML); `SIM__*` environment variables override it.
    #[arg(long, env = "SIM_CONFIG")]
    config: Option<PathBuf>,
    /// JSON-lines recording, `-` for stdin.
    #[arg(long, default_value = "-")]
    input: String,
    /// Guidance mode.
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
    /// Only guide towards objects with this label (direction mode).
    #[arg(long)]
    target: Option<String>,
    /// Ignore recorded timestamps and replay back to back.
    #[arg(long)]
    fast: bool,
    /// Detector frame width.
    #[arg(long)]
    frame_width: Option<u32>,
    /// Detector frame height.
    #[arg(long)]
    frame_height: Option<u32>,
    /// Sensor orientation in degrees.
    #[arg(long, allow_hyphen_values = true)]
    orientation: Option<i32>,
}

impl Args {
    fn apply(&self, settings: &mut SimSettings) {
        if let Some(mode) = self.mode {
            settings.guidance.mode = mode.into();
        }
        if let Some(target) = &self.target {
            settings.guidance.target_label = Some(target.clone());
        }
        if let Some(width) = self.frame_width {
            settings.frame.width = width;
        }
        if let Some(height) = self.frame_height {
            settings.frame.height = height;
        }
        if let Some(orientation) = self.orientation {
            settings.frame.sensor_orientation = orientation;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings =
        SimSettings::load(args.config.as_deref()).context("failed to load settings")?;
    args.apply(&mut settings);
    init_logging(&settings.log_level)?;

    info!("=== Guidance Simulator v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Mode {:?}, frame {}x{} @ {} deg",
        settings.guidance.mode,
        settings.frame.width,
        settings.frame.height,
        settings.frame.sensor_orientation
    );

    let frames = if args.input == "-" {
        parse_recording(io::stdin().lock())?
    } else {
        let file = File::open(&args.input)
            .with_context(|| format!("failed to open recording {}", args.input))?;
        parse_recording(BufReader::new(file))?
    };

    let tracker = GuidanceTracker::new(
        settings.guidance.clone(),
        Arc::new(LogSynthesizer),
        Handle::current(),
    )?;
    tracker.set_frame_configuration(
        settings.frame.width,
        settings.frame.height,
        settings.frame.sensor_orientation,
    )?;

    let pacing = if args.fast {
        Pacing::Fast
    } else {
        Pacing::Recorded
    };
    let stdout = io::stdout();
    let summary = replay(&tracker, &frames, pacing, &mut stdout.lock()).await?;
    if pacing == Pacing::Recorded {
        // Let the last cooldown elapse before shutting down
        tracker.wait_idle().await;
    }
    tracker.shutdown();

    info!(
        "Processed {} frames ({} skipped): {} announced, {} dropped",
        summary.frames, summary.skipped, summary.announcements, summary.dropped
    );
    Ok(())
}
