//! Detections and filtered estimates.

use serde::{Deserialize, Serialize};

/// One model inference for a single frame.
///
/// `x` and `y` are nominally in `[0.0, 1.0]`; `(0.0, 0.0)` is the
/// bottom-left corner of the capture region.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Detection {
    pub x: f32,
    pub y: f32,
    pub confidence: f32,
}

impl Detection {
    /// A detection with zero position and zero confidence.
    pub const LOST: Detection = Detection {
        x: 0.0,
        y: 0.0,
        confidence: 0.0,
    };

    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }

    /// Whether the confidence clears the given threshold (inclusive).
    pub fn is_confident(&self, threshold: f32) -> bool {
        self.confidence >= threshold
    }

    /// Whether the position lies strictly inside the unit square.
    pub fn is_inside_unit(&self) -> bool {
        self.x > 0.0 && self.x < 1.0 && self.y > 0.0 && self.y < 1.0
    }
}

/// Velocity in normalized units per second.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
}

impl Velocity {
    pub const ZERO: Velocity = Velocity { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// True when both components are non-zero, i.e. the target is in flight.
    pub fn is_moving(&self) -> bool {
        self.x != 0.0 && self.y != 0.0
    }
}

/// Latency-compensated position plus the velocity it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FilteredEstimate {
    pub position: Detection,
    pub velocity: Velocity,
}

impl FilteredEstimate {
    /// The estimate reported for a rejected frame.
    pub const LOST: FilteredEstimate = FilteredEstimate {
        position: Detection::LOST,
        velocity: Velocity::ZERO,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_bounds_are_exclusive() {
        assert!(Detection::new(0.5, 0.5, 1.0).is_inside_unit());
        assert!(!Detection::new(1.0, 0.5, 1.0).is_inside_unit());
        assert!(!Detection::new(0.5, 0.0, 1.0).is_inside_unit());
    }

    #[test]
    fn test_static_velocity_is_not_moving() {
        assert!(!Velocity::new(0.0, -1.0).is_moving());
        assert!(Velocity::new(0.1, -1.0).is_moving());
    }
}
