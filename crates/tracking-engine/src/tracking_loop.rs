//! The capture → detect → filter → decide → act cycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use kickbot_common::clock::{micros_between, micros_to_secs};
use kickbot_common::error::KickbotResult;
use kickbot_platform_core::{
    clamp_inward, to_screen_point, Detector, MouseButton, PointerControl, ScreenCapture,
};
use kickbot_processing_core::{Predictor, TriggerEngine};
use kickbot_tracking_model::{
    Detection, FilteredEstimate, FrameStats, ScreenPoint, Status, Timings,
};

use crate::shared::{PublishedState, TrackingShared};
use crate::transform::FrameTransform;

/// Default pause between run-flag checks while idle.
pub const DEFAULT_IDLE_SLEEP: Duration = Duration::from_millis(10);

/// What one cycle saw and did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    pub cycle: u64,
    pub raw: Detection,
    pub estimate: FilteredEstimate,
    pub status: Status,
    pub timings: Timings,
    pub frame: FrameStats,
    /// Where the pointer was moved, if tracking acted this cycle.
    pub aimed_at: Option<ScreenPoint>,
    pub clicked: bool,
}

/// Owns the collaborators and per-track state, and runs cycles.
pub struct TrackingLoop {
    capture: Box<dyn ScreenCapture>,
    detector: Box<dyn Detector>,
    pointer: Box<dyn PointerControl>,
    transform: FrameTransform,
    predictor: Predictor,
    trigger: TriggerEngine,
    shared: Arc<TrackingShared>,
    stop_flag: Arc<AtomicBool>,
    idle_sleep: Duration,
    /// End of the previous cycle, or the last idle tick.
    frame_baseline: Instant,
    cycles: u64,
}

impl TrackingLoop {
    pub fn new(
        capture: Box<dyn ScreenCapture>,
        detector: Box<dyn Detector>,
        pointer: Box<dyn PointerControl>,
        shared: Arc<TrackingShared>,
    ) -> Self {
        let transform = FrameTransform::new(detector.input_shape());
        Self {
            capture,
            detector,
            pointer,
            transform,
            predictor: Predictor::new(),
            trigger: TriggerEngine::new(),
            shared,
            stop_flag: Arc::new(AtomicBool::new(false)),
            idle_sleep: DEFAULT_IDLE_SLEEP,
            frame_baseline: Instant::now(),
            cycles: 0,
        }
    }

    /// Set the pause between run-flag checks while idle.
    pub fn with_idle_sleep(mut self, idle_sleep: Duration) -> Self {
        self.idle_sleep = idle_sleep;
        self
    }

    pub fn shared(&self) -> Arc<TrackingShared> {
        self.shared.clone()
    }

    /// Get the stop flag for external coordination.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Cycles completed so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run one full cycle and publish its results.
    ///
    /// Collaborator failures are returned as-is; nothing is published for
    /// a failed cycle.
    pub fn step(&mut self) -> KickbotResult<CycleReport> {
        let params = self.shared.parameters();
        let controls = self.shared.controls().snapshot();
        let region = self.shared.capture_region();

        let cycle_start = Instant::now();
        let frame = self.capture.grab(region)?;
        let captured = frame.size;
        let capture_end = Instant::now();

        self.transform.resize(frame)?;
        let resize_end = Instant::now();

        let input = self.transform.convert();
        let convert_end = Instant::now();

        let raw = self.detector.parse(input)?;
        let inference_end = Instant::now();

        let pipeline_delay_us = micros_between(capture_end, inference_end);
        let estimate = self
            .predictor
            .filter(&params, raw, micros_to_secs(pipeline_delay_us));
        let decision = self
            .trigger
            .evaluate(&params, &estimate.position, estimate.velocity);

        let is_tracking = estimate.position.confidence > params.confidence_threshold;
        let status = Status::new(is_tracking, decision);

        let mut aimed_at = None;
        let mut clicked = false;
        if controls.tracking && is_tracking {
            let target = if controls.use_predictor {
                estimate.position
            } else {
                raw
            };
            let point = clamp_inward(
                to_screen_point(&target, region, captured),
                region,
                captured,
                controls.click_padding,
            );
            self.pointer.move_to(point)?;
            aimed_at = Some(point);

            if controls.should_click(status.is_clicking) {
                self.pointer.click(point, MouseButton::Left)?;
                clicked = true;
            }
        }

        let cycle_end = Instant::now();
        let timings = Timings {
            capture_us: micros_between(cycle_start, capture_end),
            resize_us: micros_between(capture_end, resize_end),
            convert_us: micros_between(resize_end, convert_end),
            inference_us: micros_between(convert_end, inference_end),
        };
        let frame = FrameStats {
            frame_us: micros_between(self.frame_baseline, cycle_end),
            pipeline_delay_us,
            cycle_us: micros_between(cycle_start, cycle_end),
        };
        self.frame_baseline = cycle_end;
        self.cycles += 1;

        self.shared.publish(
            PublishedState {
                cycle: self.cycles,
                raw,
                filtered: estimate.position,
                velocity: self.trigger.velocity(),
                status,
                frame,
            },
            timings,
        );
        tracing::trace!(
            cycle = self.cycles,
            frame_us = frame.frame_us,
            tracking = is_tracking,
            clicked,
            "Cycle complete"
        );

        Ok(CycleReport {
            cycle: self.cycles,
            raw,
            estimate,
            status,
            timings,
            frame,
            aimed_at,
            clicked,
        })
    }

    /// Run cycles until the stop flag is set.
    ///
    /// The stop flag is checked between cycles, never mid-cycle. While the
    /// shared run flag is off the loop sleeps and keeps moving its frame
    /// baseline forward, so a long pause does not show up as one long
    /// frame on resume.
    pub fn run(&mut self) -> KickbotResult<u64> {
        tracing::info!(detector = %self.detector.name(), "Tracking loop started");

        let mut was_running = false;
        while !self.stop_flag.load(Ordering::Relaxed) {
            if !self.shared.is_running() {
                if was_running {
                    tracing::info!(cycles = self.cycles, "Tracking paused");
                    was_running = false;
                }
                std::thread::sleep(self.idle_sleep);
                self.frame_baseline = Instant::now();
                continue;
            }

            if !was_running {
                tracing::info!(cycles = self.cycles, "Tracking resumed");
                was_running = true;
            }

            if let Err(e) = self.step() {
                tracing::warn!(
                    error = %e,
                    collaborator = e.is_collaborator_failure(),
                    cycles = self.cycles,
                    "Tracking cycle failed"
                );
                return Err(e);
            }
        }

        tracing::info!(cycles = self.cycles, "Tracking loop stopped");
        Ok(self.cycles)
    }

    /// Set the stop flag.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::stub::{RecordingPointer, ScriptedDetector, StubCapture};
    use kickbot_common::error::KickbotError;
    use kickbot_tracking_model::{CaptureRegion, ControlSettings, FrameSize, Parameters};

    fn build(detections: Vec<Detection>) -> (TrackingLoop, RecordingPointer) {
        build_with(
            StubCapture::new(FrameSize::new(100, 200)),
            ControlSettings::default(),
            detections,
        )
    }

    fn build_with(
        capture: StubCapture,
        controls: ControlSettings,
        detections: Vec<Detection>,
    ) -> (TrackingLoop, RecordingPointer) {
        let shared = Arc::new(TrackingShared::new(
            Parameters::default(),
            controls,
            CaptureRegion::new(100, 200),
            16,
        ));
        let pointer = RecordingPointer::new();
        let tracking = TrackingLoop::new(
            Box::new(capture),
            Box::new(ScriptedDetector::new(FrameSize::new(10, 10), detections)),
            Box::new(pointer.clone()),
            shared,
        );
        (tracking, pointer)
    }

    #[test]
    fn test_confident_detection_moves_pointer() {
        let (mut tracking, pointer) = build(vec![Detection::new(0.5, 0.25, 0.9)]);
        let report = tracking.step().unwrap();

        assert!(report.status.is_tracking);
        // First frame has no velocity, so filtered == raw
        assert_eq!(report.aimed_at, Some(ScreenPoint::new(250, 250)));
        assert_eq!(pointer.log().moves, vec![ScreenPoint::new(250, 250)]);
        // y = 0.25 is below the hard height
        assert!(report.status.is_hard_trigger);
        assert!(report.clicked);
        assert_eq!(pointer.log().clicks.len(), 1);
    }

    #[test]
    fn test_cropped_capture_flips_y_over_visible_height() {
        // 80 rows cut off the top at a screen edge
        let (mut tracking, pointer) = build_with(
            StubCapture::new(FrameSize::new(100, 200)).cropped_to(FrameSize::new(100, 120)),
            ControlSettings {
                click_padding: 0,
                ..ControlSettings::default()
            },
            vec![Detection::new(0.5, 0.25, 0.9)],
        );
        let report = tracking.step().unwrap();

        // top 100 + visible 120 - 0.25 * 120, not top + 200 - 0.25 * 200
        assert_eq!(report.aimed_at, Some(ScreenPoint::new(250, 190)));
        assert_eq!(pointer.log().moves, vec![ScreenPoint::new(250, 190)]);
    }

    #[test]
    fn test_cropped_capture_clamps_to_visible_area() {
        let (mut tracking, _pointer) = build_with(
            StubCapture::new(FrameSize::new(100, 200)).cropped_to(FrameSize::new(60, 120)),
            ControlSettings {
                use_predictor: false,
                smart_click: false,
                click_padding: 2,
                ..ControlSettings::default()
            },
            vec![Detection::new(0.0, 0.0, 0.9)],
        );
        let report = tracking.step().unwrap();
        assert_eq!(report.aimed_at, Some(ScreenPoint::new(202, 217)));
    }

    #[test]
    fn test_out_of_range_raw_detection_stays_in_region() {
        let (mut tracking, pointer) = build_with(
            StubCapture::new(FrameSize::new(100, 200)),
            ControlSettings {
                use_predictor: false,
                smart_click: false,
                click_padding: 0,
                ..ControlSettings::default()
            },
            vec![
                Detection::new(3.0e7, 0.5, 0.9),
                Detection::new(-3.0e7, -3.0e7, 0.9),
            ],
        );

        let first = tracking.step().unwrap();
        assert_eq!(first.aimed_at, Some(ScreenPoint::new(299, 200)));
        let second = tracking.step().unwrap();
        assert_eq!(second.aimed_at, Some(ScreenPoint::new(200, 299)));
        assert_eq!(pointer.log().moves.len(), 2);
    }

    #[test]
    fn test_low_confidence_does_not_act() {
        let (mut tracking, pointer) = build(vec![Detection::new(0.5, 0.25, 0.2)]);
        let report = tracking.step().unwrap();

        assert!(!report.status.is_tracking);
        assert!(!report.status.is_clicking);
        assert_eq!(report.aimed_at, None);
        assert!(pointer.log().moves.is_empty());
    }

    #[test]
    fn test_exact_threshold_is_not_tracking() {
        let (mut tracking, pointer) = build(vec![Detection::new(0.5, 0.5, 0.5)]);
        let report = tracking.step().unwrap();
        assert_eq!(report.estimate.position.confidence, 0.5);
        assert!(!report.status.is_tracking);
        assert!(pointer.log().moves.is_empty());
    }

    #[test]
    fn test_publishes_each_cycle() {
        let (mut tracking, _pointer) = build(vec![Detection::new(0.5, 0.9, 0.9)]);
        let shared = tracking.shared();
        tracking.step().unwrap();
        tracking.step().unwrap();

        let snap = shared.snapshot();
        assert_eq!(snap.cycle, 2);
        assert_eq!(snap.raw, Detection::new(0.5, 0.9, 0.9));
        let timings = shared.timings();
        assert_eq!(timings.len(), 2);
        assert_eq!(timings.iter().map(|e| e.cycle).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(tracking.cycles(), 2);
    }

    #[test]
    fn test_detector_failure_propagates() {
        let shared = Arc::new(TrackingShared::default());
        let mut tracking = TrackingLoop::new(
            Box::new(StubCapture::new(FrameSize::new(8, 8))),
            Box::new(
                ScriptedDetector::new(FrameSize::new(8, 8), vec![Detection::LOST])
                    .failing_at(0),
            ),
            Box::new(RecordingPointer::new()),
            shared.clone(),
        );

        let err = tracking.step().unwrap_err();
        assert!(matches!(err, KickbotError::Inference { .. }));
        assert_eq!(shared.snapshot().cycle, 0);
    }

    #[test]
    fn test_run_returns_when_stopped() {
        let (mut tracking, _pointer) = build(vec![Detection::LOST]);
        tracking.stop();
        assert_eq!(tracking.run().unwrap(), 0);
    }
}
