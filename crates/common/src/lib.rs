//! Kickbot Common Utilities
//!
//! Shared infrastructure for all Kickbot crates:
//! - Error types and result aliases
//! - Clock and timing helpers for per-stage telemetry
//! - Tracing/logging initialization
//! - Configuration loading and validation

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
