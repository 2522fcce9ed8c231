//! Kickbot Processing Core
//!
//! Turns noisy, delayed per-frame detections into decisions:
//! - **Predictor:** Confidence gating, lost-frame hysteresis, velocity
//!   estimation, latency extrapolation with gravity, and wall bounces
//! - **Trigger Engine:** Soft/hard fall thresholds with an off-screen cutout
//!
//! This crate is pure computation with no I/O or platform dependencies.
//! Parameters are passed into every call so callers can retune them live.

pub mod predictor;
pub mod trigger;

pub use predictor::{reflect_off_walls, Predictor, PredictorState};
pub use trigger::{TriggerEngine, TriggerState};
