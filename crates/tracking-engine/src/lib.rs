//! Kickbot Tracking Engine
//!
//! Runs the acquire → infer → filter → decide → act cycle on a dedicated
//! thread and publishes each cycle's results for readers on other threads
//! (UI, telemetry, tests) without stalling the loop.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────── TrackingController (thread) ───────────────────┐
//! │                                                                    │
//! │  ScreenCapture ─▶ FrameTransform ─▶ Detector ─▶ Predictor          │
//! │                                                   │                │
//! │                                                   ▼                │
//! │                     PointerControl ◀──────── TriggerEngine         │
//! │                                                   │                │
//! └───────────────────────────────────────────────────┼────────────────┘
//!                                                     ▼
//!                  TrackingShared (controls, parameters, region,
//!                  published snapshot, timings ring)  ◀── readers
//! ```

pub mod backend;
pub mod controller;
pub mod shared;
pub mod timings;
pub mod tracking_loop;
pub mod transform;

pub use controller::TrackingController;
pub use shared::{PublishedState, SharedControls, TrackingShared};
pub use timings::{CycleTimings, TimingsRing};
pub use tracking_loop::{CycleReport, TrackingLoop};
pub use transform::FrameTransform;
