//! State shared between the tracking thread and its readers.
//!
//! Who writes what:
//! - **Consumers** write controls, parameters, the capture region, and the
//!   run flag. Updates are last-write-wins; a reader may see one field of
//!   a multi-field update before another.
//! - **The tracking loop** writes the published snapshot and timings. The
//!   snapshot is replaced whole under one lock, so every field a reader
//!   sees comes from the same cycle. The timings entry is pushed while that
//!   lock is held and carries the same cycle number, so a ring read after a
//!   snapshot always contains that snapshot's entry (unless it was already
//!   overwritten) and `TimingsRing::for_cycle` finds it.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use kickbot_tracking_model::{
    CaptureRegion, ControlSettings, Detection, FrameStats, Parameters, Status, Timings, Velocity,
};

use crate::timings::TimingsRing;

/// Loop controls, one atomic per field.
#[derive(Debug)]
pub struct SharedControls {
    tracking: AtomicBool,
    smart_click: AtomicBool,
    always_click: AtomicBool,
    use_predictor: AtomicBool,
    click_padding: AtomicU32,
}

impl SharedControls {
    pub fn new(settings: ControlSettings) -> Self {
        Self {
            tracking: AtomicBool::new(settings.tracking),
            smart_click: AtomicBool::new(settings.smart_click),
            always_click: AtomicBool::new(settings.always_click),
            use_predictor: AtomicBool::new(settings.use_predictor),
            click_padding: AtomicU32::new(settings.click_padding),
        }
    }

    /// Read every field. Fields are read independently.
    pub fn snapshot(&self) -> ControlSettings {
        ControlSettings {
            tracking: self.tracking.load(Ordering::Relaxed),
            smart_click: self.smart_click.load(Ordering::Relaxed),
            always_click: self.always_click.load(Ordering::Relaxed),
            use_predictor: self.use_predictor.load(Ordering::Relaxed),
            click_padding: self.click_padding.load(Ordering::Relaxed),
        }
    }

    /// Overwrite every field.
    pub fn apply(&self, settings: ControlSettings) {
        self.set_tracking(settings.tracking);
        self.set_smart_click(settings.smart_click);
        self.set_always_click(settings.always_click);
        self.set_use_predictor(settings.use_predictor);
        self.set_click_padding(settings.click_padding);
    }

    pub fn set_tracking(&self, enabled: bool) {
        self.tracking.store(enabled, Ordering::Relaxed);
    }

    pub fn set_smart_click(&self, enabled: bool) {
        self.smart_click.store(enabled, Ordering::Relaxed);
    }

    pub fn set_always_click(&self, enabled: bool) {
        self.always_click.store(enabled, Ordering::Relaxed);
    }

    pub fn set_use_predictor(&self, enabled: bool) {
        self.use_predictor.store(enabled, Ordering::Relaxed);
    }

    pub fn set_click_padding(&self, pixels: u32) {
        self.click_padding.store(pixels, Ordering::Relaxed);
    }

    /// Flip tracking and return the new value.
    pub fn toggle_tracking(&self) -> bool {
        !self.tracking.fetch_xor(true, Ordering::Relaxed)
    }

    /// Flip smart clicking and return the new value.
    pub fn toggle_smart_click(&self) -> bool {
        !self.smart_click.fetch_xor(true, Ordering::Relaxed)
    }

    /// Flip always-clicking and return the new value.
    pub fn toggle_always_click(&self) -> bool {
        !self.always_click.fetch_xor(true, Ordering::Relaxed)
    }

    /// Flip predictor use and return the new value.
    pub fn toggle_use_predictor(&self) -> bool {
        !self.use_predictor.fetch_xor(true, Ordering::Relaxed)
    }
}

impl Default for SharedControls {
    fn default() -> Self {
        Self::new(ControlSettings::default())
    }
}

/// Everything one cycle publishes, as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PublishedState {
    /// Number of the cycle that produced this state (0 = none yet).
    pub cycle: u64,
    pub raw: Detection,
    pub filtered: Detection,
    pub velocity: Velocity,
    pub status: Status,
    pub frame: FrameStats,
}

/// The publication point between the tracking loop and its readers.
#[derive(Debug)]
pub struct TrackingShared {
    running: AtomicBool,
    controls: SharedControls,
    parameters: RwLock<Parameters>,
    region: Mutex<CaptureRegion>,
    published: RwLock<PublishedState>,
    timings: Mutex<TimingsRing>,
}

impl TrackingShared {
    /// Create shared state. The loop starts paused.
    pub fn new(
        parameters: Parameters,
        controls: ControlSettings,
        region: CaptureRegion,
        timings_capacity: usize,
    ) -> Self {
        Self {
            running: AtomicBool::new(false),
            controls: SharedControls::new(controls),
            parameters: RwLock::new(parameters),
            region: Mutex::new(region),
            published: RwLock::new(PublishedState::default()),
            timings: Mutex::new(TimingsRing::new(timings_capacity)),
        }
    }

    /// Latest published state, all fields from one cycle.
    pub fn snapshot(&self) -> PublishedState {
        *self.published.read()
    }

    pub fn raw_prediction(&self) -> Detection {
        self.published.read().raw
    }

    pub fn filtered_prediction(&self) -> Detection {
        self.published.read().filtered
    }

    pub fn velocity(&self) -> Velocity {
        self.published.read().velocity
    }

    pub fn status(&self) -> Status {
        self.published.read().status
    }

    /// Live controls; writes take effect on the next cycle.
    pub fn controls(&self) -> &SharedControls {
        &self.controls
    }

    pub fn parameters(&self) -> Parameters {
        *self.parameters.read()
    }

    pub fn set_parameters(&self, parameters: Parameters) {
        *self.parameters.write() = parameters;
    }

    /// Modify parameters in place under the write lock.
    pub fn update_parameters(&self, f: impl FnOnce(&mut Parameters)) {
        f(&mut self.parameters.write());
    }

    /// Copy of the timings ring.
    pub fn timings(&self) -> TimingsRing {
        self.timings.lock().clone()
    }

    pub fn set_capture_region(&self, top: i32, left: i32) {
        *self.region.lock() = CaptureRegion::new(top, left);
    }

    pub fn capture_region(&self) -> CaptureRegion {
        *self.region.lock()
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Flip the run flag and return the new value.
    pub fn toggle_running(&self) -> bool {
        !self.running.fetch_xor(true, Ordering::SeqCst)
    }

    /// Record one cycle. Called only by the tracking loop.
    pub(crate) fn publish(&self, state: PublishedState, timings: Timings) {
        let mut published = self.published.write();
        self.timings.lock().push(state.cycle, timings);
        *published = state;
    }
}

impl Default for TrackingShared {
    fn default() -> Self {
        Self::new(
            Parameters::default(),
            ControlSettings::default(),
            CaptureRegion::default(),
            128,
        )
    }
}
