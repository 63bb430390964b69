//! Recording replay

use frame_geometry::DisplaySurface;
use guidance::{AnnouncementOutcome, Detection, GuidanceTracker};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Replay error types
#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Line {line}: invalid frame record: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Report serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One recorded frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Detector timestamp (nanoseconds)
    pub timestamp_ns: u64,
    /// Display surface at draw time
    pub surface: DisplaySurface,
    #[serde(default)]
    pub detections: Vec<Detection>,
}

/// How frames are spaced in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Sleep for the gap between recorded timestamps
    Recorded,
    /// Back to back
    Fast,
}

/// Totals for a replay run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub frames: usize,
    pub skipped: usize,
    pub announcements: usize,
    pub dropped: usize,
}

/// Parse a JSON-lines recording; blank lines and `#` comments are ignored
pub fn parse_recording<R: BufRead>(reader: R) -> Result<Vec<FrameRecord>, ReplayError> {
    let mut frames = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let record = serde_json::from_str(trimmed).map_err(|source| ReplayError::Parse {
            line: index + 1,
            source,
        })?;
        frames.push(record);
    }
    debug!("Parsed {} frame records", frames.len());
    Ok(frames)
}

/// Feed `frames` through `tracker`, writing one JSON report per processed frame
pub async fn replay<W: Write>(
    tracker: &GuidanceTracker,
    frames: &[FrameRecord],
    pacing: Pacing,
    out: &mut W,
) -> Result<ReplaySummary, ReplayError> {
    let mut summary = ReplaySummary::default();
    let mut previous_ts: Option<u64> = None;

    for frame in frames {
        if pacing == Pacing::Recorded {
            if let Some(prev) = previous_ts {
                let gap = frame.timestamp_ns.saturating_sub(prev);
                tokio::time::sleep(Duration::from_nanos(gap)).await;
            }
        }
        previous_ts = Some(frame.timestamp_ns);
        summary.frames += 1;

        let report = match tracker.track_results(&frame.detections, frame.timestamp_ns, frame.surface) {
            Ok(report) => report,
            Err(e) => {
                // Frame-local; the next frame may succeed
                warn!("Frame {} skipped: {}", frame.timestamp_ns, e);
                summary.skipped += 1;
                continue;
            }
        };

        match &report.outcome {
            AnnouncementOutcome::Announced(_) => summary.announcements += 1,
            AnnouncementOutcome::Dropped => summary.dropped += 1,
            AnnouncementOutcome::Silent => {}
        }

        serde_json::to_writer(&mut *out, &report)?;
        out.write_all(b"\n")?;
    }

    out.flush()?;
    info!(
        "Replay finished: {} frames, {} skipped, {} announced, {} dropped",
        summary.frames, summary.skipped, summary.announcements, summary.dropped
    );
    Ok(summary)
}
