//! Collaborator backends.
//!
//! Real OS capture, pointer injection and neural inference live outside
//! this crate. What is here runs anywhere: a simulated game with a matching
//! pointer, a brightness detector that can track it, and scripted stubs for
//! tests.

pub mod color;
pub mod stub;
pub mod synthetic;

pub use color::ColorCentroidDetector;
pub use stub::{PointerLog, RecordingPointer, ScriptedDetector, StubCapture};
pub use synthetic::{SceneConfig, SceneHandle, ScenePointer, SceneStats, SyntheticScene};

/// Default brightness a pixel must reach to count toward the target.
pub const DEFAULT_BRIGHTNESS_THRESHOLD: f32 = 0.8;
