//! Tunable physics and trigger parameters.

use serde::{Deserialize, Serialize};

/// Parameters consumed by the predictor and trigger engine.
///
/// Owned outside the tracking loop and read once per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    /// Gravity-like downward acceleration (normalized units per second²).
    pub acceleration: f32,

    /// Target width relative to the capture width.
    pub relative_ball_width: f32,

    /// Extra latency added on top of the measured pipeline delay (seconds).
    pub additional_model_delay: f32,

    /// Minimum confidence for a detection to be accepted.
    pub confidence_threshold: f32,

    /// Consecutive rejected frames tolerated before the track resets.
    pub max_lost_frames: u32,

    /// Soft trigger: maximum height (both height and speed must hold).
    pub height_trigger_soft: f32,

    /// Hard trigger: height at or below which we fire regardless of speed.
    pub height_trigger_hard: f32,

    /// Soft trigger: minimum fall speed.
    pub fall_speed_trigger_soft: f32,

    /// Hard trigger: fall speed at or above which we fire regardless of height.
    pub fall_speed_trigger_hard: f32,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            acceleration: 2.5,
            relative_ball_width: 0.24,
            additional_model_delay: 0.0,
            confidence_threshold: 0.5,
            max_lost_frames: 2,
            height_trigger_soft: 0.70,
            height_trigger_hard: 0.45,
            fall_speed_trigger_soft: 1.0,
            fall_speed_trigger_hard: 4.0,
        }
    }
}

impl Parameters {
    /// Half the relative target width.
    pub fn ball_radius(&self) -> f32 {
        self.relative_ball_width / 2.0
    }

    /// Names of float fields that are NaN or infinite.
    pub fn non_finite_fields(&self) -> Vec<&'static str> {
        [
            ("acceleration", self.acceleration),
            ("relative_ball_width", self.relative_ball_width),
            ("additional_model_delay", self.additional_model_delay),
            ("confidence_threshold", self.confidence_threshold),
            ("height_trigger_soft", self.height_trigger_soft),
            ("height_trigger_hard", self.height_trigger_hard),
            ("fall_speed_trigger_soft", self.fall_speed_trigger_soft),
            ("fall_speed_trigger_hard", self.fall_speed_trigger_hard),
        ]
        .into_iter()
        .filter(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let params: Parameters = serde_json::from_str(r#"{"acceleration": 3.0}"#).unwrap();
        assert_eq!(params.acceleration, 3.0);
        assert_eq!(params.max_lost_frames, 2);
        assert!((params.ball_radius() - 0.12).abs() < 1e-6);
    }

    #[test]
    fn test_non_finite_fields_reported() {
        let params = Parameters {
            acceleration: f32::NAN,
            fall_speed_trigger_hard: f32::INFINITY,
            ..Parameters::default()
        };
        assert_eq!(
            params.non_finite_fields(),
            vec!["acceleration", "fall_speed_trigger_hard"]
        );
        assert!(Parameters::default().non_finite_fields().is_empty());
    }
}
