//! Guidance session: per-frame classification, zone evaluation, and announcement

use announcer::Synthesizer;
use frame_geometry::{CoordinateTransform, DisplaySurface};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::analysis::FrameReport;
use crate::config::{GuidanceConfig, GuidanceMode};
use crate::object::{classify, DebugRect, Detection, TrackedObject};
use crate::overlay::OverlayItem;
use crate::state::{AnnouncementOutcome, GuidanceState, GuidanceStateMachine};
use crate::zone::{evaluate, GuidanceFlags, ThreatFlags};
use crate::GuidanceError;

/// Frame-scoped state, guarded as a unit
#[derive(Debug, Default)]
struct FrameState {
    transform: CoordinateTransform,
    tracked: Vec<TrackedObject>,
    debug: Vec<DebugRect>,
}

/// Guidance session shared by the detector callback and the renderer.
///
/// Frame state sits behind one mutex; announcements are requested after the
/// lock is released.
pub struct GuidanceTracker {
    config: RwLock<GuidanceConfig>,
    frame: Mutex<FrameState>,
    state_machine: GuidanceStateMachine,
}

impl GuidanceTracker {
    pub fn new(
        config: GuidanceConfig,
        synthesizer: Arc<dyn Synthesizer>,
        runtime: Handle,
    ) -> Result<Self, GuidanceError> {
        config.validate()?;
        info!(
            "Creating guidance tracker: mode={:?}, aggregation={:?}",
            config.mode, config.aggregation
        );
        Ok(Self {
            state_machine: GuidanceStateMachine::new(&config, synthesizer, runtime),
            frame: Mutex::new(FrameState::default()),
            config: RwLock::new(config),
        })
    }

    /// Set detector frame geometry (on camera configuration)
    pub fn set_frame_configuration(
        &self,
        width: u32,
        height: u32,
        sensor_orientation: i32,
    ) -> Result<(), GuidanceError> {
        self.lock_frame()
            .transform
            .configure(width, height, sensor_orientation)?;
        Ok(())
    }

    /// Process one frame of detections against the current display surface
    pub fn track_results(
        &self,
        detections: &[Detection],
        timestamp_ns: u64,
        surface: DisplaySurface,
    ) -> Result<FrameReport, GuidanceError> {
        debug!("Processing {} results from {}", detections.len(), timestamp_ns);
        let config = self.config();

        let (overlay, guide) = {
            let mut frame = self.lock_frame();
            let mapping = frame.transform.compute_mapping(surface).map_err(|e| {
                warn!("Skipping frame {}: {}", timestamp_ns, e);
                e
            })?;

            let classification = classify(detections, &mapping, config.min_size);
            frame.tracked = classification.tracked;
            frame.debug = classification.debug;

            let overlay: Vec<OverlayItem> =
                frame.tracked.iter().map(OverlayItem::from_tracked).collect();
            let guide = Self::pick_guide(&frame.tracked, &config, surface);
            (overlay, guide)
        };

        let flags = guide.map(|(_, rect)| evaluate(&rect, surface, config.mode, &config.zones));
        let outcome = match &flags {
            Some(flags) => self.state_machine.request(flags),
            None => AnnouncementOutcome::Silent,
        };

        Ok(FrameReport {
            timestamp_ns,
            overlay,
            guide: guide.map(|(index, _)| index),
            flags,
            outcome,
        })
    }

    /// Index and screen rectangle of the object that drives guidance.
    ///
    /// Direction mode honours the target label; Threat mode only considers
    /// objects that evaluate as a threat.
    fn pick_guide(
        tracked: &[TrackedObject],
        config: &GuidanceConfig,
        surface: DisplaySurface,
    ) -> Option<(usize, frame_geometry::Rect)> {
        let target = config.target_label.as_deref();
        let is_threat = |obj: &TrackedObject| {
            matches!(
                evaluate(&obj.screen_rect, surface, GuidanceMode::Threat, &config.zones),
                GuidanceFlags::Threat(ThreatFlags {
                    threat_present: true,
                    ..
                })
            )
        };
        let candidates = tracked.iter().filter(|obj| match config.mode {
            GuidanceMode::Direction => target.map_or(true, |label| obj.matches_label(label)),
            GuidanceMode::Threat => is_threat(*obj),
        });
        let chosen = config.aggregation.select(candidates)?;
        let index = tracked.iter().position(|obj| std::ptr::eq(obj, chosen))?;
        Some((index, chosen.screen_rect))
    }

    /// Re-project the current tracked set onto the surface sampled at draw time
    pub fn draw(&self, surface: DisplaySurface) -> Result<Vec<OverlayItem>, GuidanceError> {
        let mut frame = self.lock_frame();
        let mapping = frame.transform.compute_mapping(surface)?;
        Ok(frame
            .tracked
            .iter_mut()
            .map(|obj| {
                obj.remap(&mapping);
                OverlayItem::from_tracked(obj)
            })
            .collect())
    }

    /// Raw rectangles of the last frame, degenerate ones included
    pub fn draw_debug(&self) -> Vec<DebugRect> {
        self.lock_frame().debug.clone()
    }

    pub fn tracked_objects(&self) -> Vec<TrackedObject> {
        self.lock_frame().tracked.clone()
    }

    /// Switch guidance mode at runtime.
    ///
    /// Only the mode changes; the aggregation policy stays as configured.
    /// Build the tracker from `GuidanceConfig::threat()` to get `Closest`.
    pub fn set_mode(&self, mode: GuidanceMode) {
        info!("Guidance mode set to {:?}", mode);
        self.config_mut().mode = mode;
    }

    /// Label to guide towards in Direction mode; blank clears it
    pub fn set_target_label(&self, label: Option<String>) {
        let label = label
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
        info!("Target label set to {:?}", label);
        self.config_mut().target_label = label;
    }

    pub fn config(&self) -> GuidanceConfig {
        self.config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn state(&self) -> GuidanceState {
        self.state_machine.state()
    }

    /// Resolve once the current announcement cooldown has elapsed
    pub async fn wait_idle(&self) {
        self.state_machine.wait_idle().await
    }

    /// End the session: cancel any cooldown and drop tracked objects
    pub fn shutdown(&self) {
        self.state_machine.cancel();
        let mut frame = self.lock_frame();
        frame.tracked.clear();
        frame.debug.clear();
        info!("Guidance tracker shut down");
    }

    fn lock_frame(&self) -> MutexGuard<'_, FrameState> {
        self.frame
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn config_mut(&self) -> std::sync::RwLockWriteGuard<'_, GuidanceConfig> {
        self.config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
