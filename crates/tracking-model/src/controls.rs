//! User-facing switches for the tracking loop.

use serde::{Deserialize, Serialize};

/// A plain copy of the loop controls.
///
/// The live, concurrently mutable version lives in the tracking engine;
/// this type is what gets configured, snapshotted, and serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSettings {
    /// Move the pointer onto the target while it is tracked.
    pub tracking: bool,

    /// Click when the trigger engine fires.
    pub smart_click: bool,

    /// Click on every tracked cycle.
    pub always_click: bool,

    /// Aim at the filtered estimate instead of the raw detection.
    pub use_predictor: bool,

    /// Pixels kept clear of the capture region border when aiming.
    pub click_padding: u32,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            tracking: true,
            smart_click: true,
            always_click: false,
            use_predictor: true,
            click_padding: 0,
        }
    }
}

impl ControlSettings {
    /// Whether a tracked cycle should click, given the trigger outcome.
    pub fn should_click(&self, triggered: bool) -> bool {
        (self.smart_click && triggered) || self.always_click
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_rule() {
        let mut controls = ControlSettings::default();
        assert!(controls.should_click(true));
        assert!(!controls.should_click(false));

        controls.smart_click = false;
        assert!(!controls.should_click(true));

        controls.always_click = true;
        assert!(controls.should_click(false));
    }
}
