//! Scripted collaborators for tests and dry runs.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use kickbot_common::error::{KickbotError, KickbotResult};
use kickbot_platform_core::{
    Detector, Frame, ModelInput, MouseButton, PointerControl, ScreenCapture,
};
use kickbot_tracking_model::{CaptureRegion, Detection, FrameSize, ScreenPoint};

/// Detector that replays a fixed list of detections.
///
/// Once the list is exhausted the last detection repeats.
pub struct ScriptedDetector {
    shape: FrameSize,
    queue: VecDeque<Detection>,
    last: Detection,
    calls: usize,
    fail_at: Option<usize>,
}

impl ScriptedDetector {
    pub fn new(shape: FrameSize, detections: Vec<Detection>) -> Self {
        Self {
            shape,
            queue: detections.into(),
            last: Detection::LOST,
            calls: 0,
            fail_at: None,
        }
    }

    /// Fail on the call with this zero-based index.
    pub fn failing_at(mut self, call: usize) -> Self {
        self.fail_at = Some(call);
        self
    }
}

impl Detector for ScriptedDetector {
    fn name(&self) -> &str {
        "scripted"
    }

    fn input_shape(&self) -> FrameSize {
        self.shape
    }

    fn parse(&mut self, _input: &ModelInput) -> KickbotResult<Detection> {
        let call = self.calls;
        self.calls += 1;
        if self.fail_at == Some(call) {
            return Err(KickbotError::inference(format!(
                "scripted failure on call {call}"
            )));
        }
        if let Some(next) = self.queue.pop_front() {
            self.last = next;
        }
        Ok(self.last)
    }
}

/// Capture that hands out a blank frame.
pub struct StubCapture {
    frame: Frame,
    delay: Option<Duration>,
    grabs: usize,
    fail_after: Option<usize>,
}

impl StubCapture {
    pub fn new(size: FrameSize) -> Self {
        Self {
            frame: Frame::new(size),
            delay: None,
            grabs: 0,
            fail_after: None,
        }
    }

    /// Sleep this long inside every grab.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Succeed `grabs` times, then fail.
    pub fn failing_after(mut self, grabs: usize) -> Self {
        self.fail_after = Some(grabs);
        self
    }

    /// Report a visible size smaller than the buffer, as at a screen edge.
    pub fn cropped_to(mut self, size: FrameSize) -> Self {
        self.frame.size = FrameSize::new(
            size.width.min(self.frame.buffer_size.width),
            size.height.min(self.frame.buffer_size.height),
        );
        self
    }
}

impl ScreenCapture for StubCapture {
    fn grab(&mut self, _origin: CaptureRegion) -> KickbotResult<&Frame> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if self.fail_after.is_some_and(|n| self.grabs >= n) {
            return Err(KickbotError::capture("stub capture source went away"));
        }
        self.grabs += 1;
        Ok(&self.frame)
    }

    fn max_size(&self) -> FrameSize {
        self.frame.buffer_size
    }
}

/// Everything a [`RecordingPointer`] was asked to do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointerLog {
    pub moves: Vec<ScreenPoint>,
    pub clicks: Vec<(ScreenPoint, MouseButton)>,
}

/// Pointer that records calls into a log shared with its clones.
#[derive(Debug, Clone, Default)]
pub struct RecordingPointer {
    log: Arc<Mutex<PointerLog>>,
}

impl RecordingPointer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the log so far.
    pub fn log(&self) -> PointerLog {
        self.log.lock().clone()
    }

    pub fn clear(&self) {
        *self.log.lock() = PointerLog::default();
    }
}

impl PointerControl for RecordingPointer {
    fn move_to(&mut self, point: ScreenPoint) -> KickbotResult<()> {
        self.log.lock().moves.push(point);
        Ok(())
    }

    fn click(&mut self, point: ScreenPoint, button: MouseButton) -> KickbotResult<()> {
        self.log.lock().clicks.push((point, button));
        Ok(())
    }
}
