//! Status flags and timing telemetry published by the tracking loop.

use serde::{Deserialize, Serialize};

/// Outcome of one trigger evaluation. At most one flag is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TriggerDecision {
    pub soft: bool,
    pub hard: bool,
}

impl TriggerDecision {
    pub const NONE: TriggerDecision = TriggerDecision {
        soft: false,
        hard: false,
    };

    pub const SOFT: TriggerDecision = TriggerDecision {
        soft: true,
        hard: false,
    };

    pub const HARD: TriggerDecision = TriggerDecision {
        soft: false,
        hard: true,
    };

    /// Whether either trigger fired.
    pub fn fires(&self) -> bool {
        self.soft || self.hard
    }
}

/// Per-cycle status flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Status {
    pub is_tracking: bool,
    pub is_clicking: bool,
    pub is_soft_trigger: bool,
    pub is_hard_trigger: bool,
}

impl Status {
    pub fn new(is_tracking: bool, trigger: TriggerDecision) -> Self {
        Self {
            is_tracking,
            is_clicking: trigger.fires(),
            is_soft_trigger: trigger.soft,
            is_hard_trigger: trigger.hard,
        }
    }
}

/// Stage durations of one cycle, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Timings {
    pub capture_us: u64,
    pub resize_us: u64,
    pub convert_us: u64,
    pub inference_us: u64,
}

impl Timings {
    /// Time spent turning a captured frame into a detection.
    pub fn forward_us(&self) -> u64 {
        self.resize_us + self.convert_us + self.inference_us
    }
}

/// Whole-cycle statistics, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameStats {
    /// Time since the previous cycle ended (or since tracking resumed).
    pub frame_us: u64,
    /// End of capture to end of inference; fed to the predictor.
    pub pipeline_delay_us: u64,
    /// Duration of this cycle alone.
    pub cycle_us: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_trigger() {
        let status = Status::new(true, TriggerDecision::HARD);
        assert!(status.is_clicking);
        assert!(status.is_hard_trigger);
        assert!(!status.is_soft_trigger);

        let idle = Status::new(true, TriggerDecision::NONE);
        assert!(!idle.is_clicking);
    }

    #[test]
    fn test_forward_excludes_capture() {
        let t = Timings {
            capture_us: 1000,
            resize_us: 10,
            convert_us: 20,
            inference_us: 300,
        };
        assert_eq!(t.forward_us(), 330);
    }
}
