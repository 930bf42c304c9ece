//! Gesture service: one time-boxed attempt at a time, reported to a
//! completion handler.
//!
//! Each [`GestureService::recognize`] call subscribes to the [`FrameHub`],
//! so frames from before the call are never seen.  The attempt lasts the
//! catalog duration times `duration_scale`; the handler then receives the
//! verdict exactly once.

use std::time::{Duration, Instant};

use hand_gesture::{GestureCatalog, Verdict};
use tracing::{info, warn};

use crate::config::Config;
use crate::source::FrameHub;
use crate::Result;

pub struct GestureService {
    catalog:        GestureCatalog,
    hub:            FrameHub,
    duration_scale: f32,
}

impl GestureService {
    pub fn new(catalog: GestureCatalog, hub: FrameHub) -> Self {
        GestureService { catalog, hub, duration_scale: 1.0 }
    }

    /// Build a service with the validated settings of `config`.
    pub fn from_config(catalog: GestureCatalog, hub: FrameHub, config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(GestureService { duration_scale: config.service.duration_scale, ..GestureService::new(catalog, hub) })
    }

    pub fn hub(&self) -> &FrameHub {
        &self.hub
    }

    pub fn duration_scale(&self) -> f32 {
        self.duration_scale
    }

    /// Run one attempt at `id` against live frames and hand the result to
    /// `on_complete`.  An unknown id fails before the handler is involved.
    pub fn recognize(&mut self, id: &str, on_complete: impl FnOnce(bool)) -> Result<Verdict> {
        let duration = self.attempt_duration(id)?;
        let frames = self.hub.subscribe();
        let session = self.catalog.session_for(id, duration, Instant::now())?;
        info!(gesture = id, ?duration, "attempt started");

        let verdict = session.run(&frames);
        drop(frames);

        if verdict.frames_processed == 0 {
            warn!(gesture = id, "no frames arrived during the attempt");
        }
        on_complete(verdict.recognized);
        Ok(verdict)
    }

    /// Scaled attempt window for `id`.
    pub fn attempt_duration(&self, id: &str) -> Result<Duration> {
        let base = self.catalog
            .duration(id)
            .ok_or_else(|| hand_gesture::Error::UnknownGesture(id.to_string()))?;
        Ok(base.mul_f32(self.duration_scale))
    }

    /// Unscaled catalog duration.
    pub fn duration(&self, id: &str) -> Option<Duration> {
        self.catalog.duration(id)
    }

    pub fn illustration(&self, id: &str) -> Option<&str> {
        self.catalog.illustration(id)
    }

    pub fn gesture_ids(&self) -> Vec<&str> {
        self.catalog.ids().collect()
    }

    pub fn catalog(&self) -> &GestureCatalog {
        &self.catalog
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
