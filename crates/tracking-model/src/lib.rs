//! Kickbot Tracking Model
//!
//! Defines the data contracts shared by every Kickbot crate:
//! - **Detections:** Per-frame model output and the filtered estimate
//! - **Parameters:** Tunable physics and trigger thresholds
//! - **Controls:** User-facing switches read by the tracking loop
//! - **Telemetry:** Status flags, per-cycle timings, and frame statistics
//! - **Region:** Capture region origin, frame sizes, and screen points
//!
//! Positions are normalized to `[0.0, 1.0]` relative to the capture region,
//! with `y` measured upward from the bottom edge.

pub mod controls;
pub mod detection;
pub mod params;
pub mod region;
pub mod telemetry;

pub use controls::*;
pub use detection::*;
pub use params::*;
pub use region::*;
pub use telemetry::*;
