//! Latency-compensating position predictor.
//!
//! Each accepted detection is extrapolated forward by the time the pipeline
//! took to produce it, so the pointer lands where the target *is* rather
//! than where it was when the frame was captured.
//!
//! # Algorithm
//!
//! 1. **Gate** on confidence. Rejected frames count toward the lost-frame
//!    limit; reaching it drops the seed so the next track starts fresh.
//! 2. **Seed** on the first accepted frame so it reports zero velocity.
//! 3. **Velocity** from the previous raw detection and wall-clock `dt`.
//! 4. **Extrapolate** by the pipeline delay plus the configured slack,
//!    subtracting `½·a·t²` while the target is in flight.
//! 5. **Bounce** the horizontal position off the side walls.

use std::time::Instant;

use kickbot_tracking_model::{Detection, FilteredEstimate, Parameters, Velocity};

/// Mutable predictor state carried between frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct PredictorState {
    /// Last accepted raw detection (not the extrapolated one).
    pub last_detection: Detection,
    /// Whether a valid detection has been seen since the last reset.
    pub seeded: bool,
    /// Consecutive frames below the confidence threshold.
    pub lost_frames: u32,
    /// When `filter` was last called.
    pub last_time: Option<Instant>,
}

/// Stateful filter producing latency-compensated estimates.
#[derive(Debug, Default)]
pub struct Predictor {
    state: PredictorState,
}

impl Predictor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current internal state.
    pub fn state(&self) -> &PredictorState {
        &self.state
    }

    /// Filter a detection, measuring `dt` against the current instant.
    pub fn filter(
        &mut self,
        params: &Parameters,
        detection: Detection,
        pipeline_delay_secs: f32,
    ) -> FilteredEstimate {
        self.filter_at(params, detection, pipeline_delay_secs, Instant::now())
    }

    /// Filter a detection observed at `now`.
    pub fn filter_at(
        &mut self,
        params: &Parameters,
        detection: Detection,
        pipeline_delay_secs: f32,
        now: Instant,
    ) -> FilteredEstimate {
        let dt = self
            .state
            .last_time
            .map(|last| now.saturating_duration_since(last).as_secs_f32());
        self.state.last_time = Some(now);

        if !detection.is_confident(params.confidence_threshold) {
            self.state.lost_frames = self.state.lost_frames.saturating_add(1);
            if self.state.seeded && self.state.lost_frames >= params.max_lost_frames {
                self.state.seeded = false;
                tracing::debug!(lost_frames = self.state.lost_frames, "Track lost");
            }
            return FilteredEstimate::LOST;
        }

        self.state.lost_frames = 0;
        if !self.state.seeded {
            self.state.seeded = true;
            self.state.last_detection = detection;
            tracing::debug!(x = detection.x, y = detection.y, "Track acquired");
        }

        let last = self.state.last_detection;
        let velocity = match dt {
            Some(dt) if dt > 0.0 => {
                Velocity::new((detection.x - last.x) / dt, (detection.y - last.y) / dt)
            }
            _ => Velocity::ZERO,
        };

        let net_delay = pipeline_delay_secs + params.additional_model_delay;
        let mut x = detection.x + velocity.x * net_delay;
        let mut y = detection.y + velocity.y * net_delay;

        // A static detection is resting, not falling
        if velocity.is_moving() {
            y -= params.acceleration * 0.5 * net_delay * net_delay;
        }

        x = reflect_off_walls(x, params.ball_radius());

        self.state.last_detection = detection;

        FilteredEstimate {
            position: Detection::new(x, y, detection.confidence),
            velocity,
        }
    }
}

/// Reflect a horizontal position off walls inset by `radius`.
///
/// A single reflection is applied; overshoots larger than the field width
/// are not folded back a second time.
pub fn reflect_off_walls(x: f32, radius: f32) -> f32 {
    let right_border = 1.0 - radius;
    let left_border = radius;

    if x > right_border {
        right_border - (x - right_border)
    } else if x < left_border {
        left_border + (left_border - x)
    } else {
        x
    }
}
