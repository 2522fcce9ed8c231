//! Clock and timing utilities for per-stage telemetry.
//!
//! The tracking loop measures every stage against a monotonic clock. This
//! module provides:
//! - A session clock anchored at loop start (with wall-clock epoch for logs)
//! - Conversions between microseconds and seconds

use std::time::Instant;

/// A session clock that provides monotonic timestamps relative to
/// a fixed epoch (the moment the tracking session started).
#[derive(Debug, Clone)]
pub struct SessionClock {
    /// The instant the session started.
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339 string).
    epoch_wall: String,
}

impl SessionClock {
    /// Create a new session clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Seconds elapsed since session start.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at session start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }
}

/// Microseconds from `start` to `end`, saturating at zero.
pub fn micros_between(start: Instant, end: Instant) -> u64 {
    end.saturating_duration_since(start).as_micros() as u64
}

/// Convert microseconds to seconds.
pub fn micros_to_secs(us: u64) -> f32 {
    us as f32 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_clock_elapsed() {
        let clock = SessionClock::start();
        // Should be very small but non-negative
        assert!(clock.elapsed_secs() < 1.0);
        assert!(!clock.epoch_wall().is_empty());
    }

    #[test]
    fn test_micros_between_saturates() {
        let start = Instant::now();
        let later = start + Duration::from_millis(3);
        assert_eq!(micros_between(start, later), 3_000);
        assert_eq!(micros_between(later, start), 0);
    }

    #[test]
    fn test_micros_to_secs() {
        assert!((micros_to_secs(1_500_000) - 1.5).abs() < 1e-6);
    }
}
