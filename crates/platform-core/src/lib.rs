//! Kickbot platform core contracts.
//!
//! This crate contains the interfaces of the external collaborators the
//! tracking loop drives (screen capture, object detector, pointer) along
//! with the frame types they exchange, without coupling to a concrete
//! OS backend or inference runtime.

pub mod frame;
pub mod geometry;

pub use frame::{Frame, ModelInput};
pub use geometry::{clamp_inward, to_screen_point};

use serde::{Deserialize, Serialize};

use kickbot_common::error::KickbotResult;
use kickbot_tracking_model::{CaptureRegion, Detection, FrameSize, ScreenPoint};

/// An object detector mapping one model input to one detection.
///
/// Implementations are synchronous, single-input and single-output.
pub trait Detector: Send {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Size of the image the detector expects.
    fn input_shape(&self) -> FrameSize;

    /// Run inference on a prepared input.
    fn parse(&mut self, input: &ModelInput) -> KickbotResult<Detection>;
}

/// Grabs a region of the screen into a reusable frame buffer.
pub trait ScreenCapture: Send {
    /// Capture the region whose top-left corner is `origin`.
    ///
    /// The returned frame may be smaller than `max_size()` near screen
    /// edges; see [`Frame`] for the crop convention.
    fn grab(&mut self, origin: CaptureRegion) -> KickbotResult<&Frame>;

    /// Size of a capture when nothing is cropped.
    fn max_size(&self) -> FrameSize;
}

/// Mouse buttons the pointer collaborator can press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Moves the system pointer and injects clicks.
pub trait PointerControl: Send {
    /// Move the pointer to an absolute screen position.
    fn move_to(&mut self, point: ScreenPoint) -> KickbotResult<()>;

    /// Click at an absolute screen position.
    fn click(&mut self, point: ScreenPoint, button: MouseButton) -> KickbotResult<()>;
}
