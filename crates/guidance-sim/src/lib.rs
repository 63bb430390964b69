//! Guidance Simulator
//!
//! Replays JSON-lines detection recordings through a `GuidanceTracker` and
//! prints one frame report per line.

pub mod replay;
pub mod settings;

pub use replay::{parse_recording, replay, FrameRecord, Pacing, ReplayError, ReplaySummary};
pub use settings::{FrameSettings, SimSettings};

use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Initialize logging on stderr, keeping stdout for reports
pub fn init_logging(level: &str) -> anyhow::Result<()> {
    let level = Level::from_str(level)
        .map_err(|_| anyhow::anyhow!("unknown log level '{}'", level))?;
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("failed to set tracing subscriber: {}", e))
}
