//! Soft/hard trigger decisions.
//!
//! Classifies the current estimate as "act now" or not, using
//! instantaneous thresholds on fall speed and height:
//!
//! - **Soft:** falling at least `fall_speed_trigger_soft` *and* at or below
//!   `height_trigger_soft`.
//! - **Hard:** falling at least `fall_speed_trigger_hard` *or* at or below
//!   `height_trigger_hard`.
//!
//! Soft is checked first, so a value satisfying both reports soft only.
//! Estimates outside the unit square never trigger.

use kickbot_tracking_model::{Detection, Parameters, TriggerDecision, Velocity};

/// Mutable trigger state carried between frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerState {
    /// Previous accepted estimate; seeded on the first confident call.
    pub previous: Option<Detection>,
    pub soft: bool,
    pub hard: bool,
    /// Velocity seen on the last evaluation (zeroed on rejection).
    pub velocity: Velocity,
}

/// Stateful trigger decision logic.
#[derive(Debug, Default)]
pub struct TriggerEngine {
    state: TriggerState,
}

impl TriggerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &TriggerState {
        &self.state
    }

    /// Velocity snapshot from the last evaluation.
    pub fn velocity(&self) -> Velocity {
        self.state.velocity
    }

    /// Current flags as a decision.
    pub fn decision(&self) -> TriggerDecision {
        TriggerDecision {
            soft: self.state.soft,
            hard: self.state.hard,
        }
    }

    /// Evaluate a filtered position and its velocity.
    pub fn evaluate(
        &mut self,
        params: &Parameters,
        position: &Detection,
        velocity: Velocity,
    ) -> TriggerDecision {
        if !position.is_confident(params.confidence_threshold) {
            return self.reject();
        }

        if self.state.previous.is_none() {
            self.state.previous = Some(*position);
        }

        if !position.is_inside_unit() {
            return self.reject();
        }

        let decision = if velocity.y <= -params.fall_speed_trigger_soft
            && position.y <= params.height_trigger_soft
        {
            TriggerDecision::SOFT
        } else if velocity.y <= -params.fall_speed_trigger_hard
            || position.y <= params.height_trigger_hard
        {
            TriggerDecision::HARD
        } else {
            TriggerDecision::NONE
        };

        if decision != self.decision() {
            tracing::debug!(
                soft = decision.soft,
                hard = decision.hard,
                y = position.y,
                vy = velocity.y,
                "Trigger changed"
            );
        }

        self.state.soft = decision.soft;
        self.state.hard = decision.hard;
        self.state.velocity = velocity;
        self.state.previous = Some(*position);
        decision
    }

    fn reject(&mut self) -> TriggerDecision {
        self.state.soft = false;
        self.state.hard = false;
        self.state.velocity = Velocity::ZERO;
        TriggerDecision::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn params() -> Parameters {
        Parameters {
            confidence_threshold: 0.5,
            height_trigger_soft: 0.7,
            height_trigger_hard: 0.45,
            fall_speed_trigger_soft: 1.0,
            fall_speed_trigger_hard: 4.0,
            ..Parameters::default()
        }
    }

    fn at(y: f32) -> Detection {
        Detection::new(0.5, y, 0.9)
    }

    #[test]
    fn test_soft_requires_speed_and_height() {
        let mut engine = TriggerEngine::new();
        let p = params();

        let d = engine.evaluate(&p, &at(0.6), Velocity::new(0.0, -1.5));
        assert_eq!(d, TriggerDecision::SOFT);

        // Too high
        let d = engine.evaluate(&p, &at(0.8), Velocity::new(0.0, -1.5));
        assert!(!d.soft);

        // Too slow
        let d = engine.evaluate(&p, &at(0.6), Velocity::new(0.0, -0.5));
        assert!(!d.soft);
    }

    #[test]
    fn test_hard_fires_on_speed_alone() {
        let mut engine = TriggerEngine::new();
        let d = engine.evaluate(&params(), &at(0.9), Velocity::new(0.0, -4.5));
        assert_eq!(d, TriggerDecision::HARD);
    }

    #[test]
    fn test_hard_fires_on_height_alone() {
        let mut engine = TriggerEngine::new();
        let d = engine.evaluate(&params(), &at(0.3), Velocity::new(0.0, 0.01));
        assert_eq!(d, TriggerDecision::HARD);
    }

    #[test]
    fn test_soft_wins_when_both_hold() {
        let mut engine = TriggerEngine::new();
        // Satisfies soft and both hard conditions
        let d = engine.evaluate(&params(), &at(0.3), Velocity::new(0.0, -5.0));
        assert_eq!(d, TriggerDecision::SOFT);
        assert!(engine.state().soft);
        assert!(!engine.state().hard);
    }

    #[test]
    fn test_rising_high_target_does_not_trigger() {
        let mut engine = TriggerEngine::new();
        let d = engine.evaluate(&params(), &at(0.8), Velocity::new(0.2, 2.0));
        assert_eq!(d, TriggerDecision::NONE);
        assert_eq!(engine.velocity(), Velocity::new(0.2, 2.0));
    }

    #[test]
    fn test_boundary_position_suppresses_and_zeroes_velocity() {
        let mut engine = TriggerEngine::new();
        let p = params();

        engine.evaluate(&p, &at(0.6), Velocity::new(0.0, -1.5));
        assert!(engine.decision().fires());

        let edge = Detection::new(1.0, 0.3, 0.9);
        let d = engine.evaluate(&p, &edge, Velocity::new(0.0, -9.0));
        assert_eq!(d, TriggerDecision::NONE);
        assert_eq!(engine.decision(), TriggerDecision::NONE);
        assert_eq!(engine.velocity(), Velocity::ZERO);
    }

    #[test]
    fn test_low_confidence_clears_state() {
        let mut engine = TriggerEngine::new();
        let p = params();

        engine.evaluate(&p, &at(0.3), Velocity::new(0.0, -2.0));
        let d = engine.evaluate(&p, &Detection::new(0.5, 0.3, 0.1), Velocity::new(0.0, -2.0));
        assert_eq!(d, TriggerDecision::NONE);
        assert_eq!(engine.velocity(), Velocity::ZERO);
    }

    #[test]
    fn test_first_confident_call_seeds_previous() {
        let mut engine = TriggerEngine::new();
        let p = params();
        engine.evaluate(&p, &Detection::new(0.5, 0.5, 0.1), Velocity::ZERO);
        assert!(engine.state().previous.is_none());

        engine.evaluate(&p, &Detection::new(1.2, 0.5, 0.9), Velocity::ZERO);
        assert_eq!(engine.state().previous, Some(Detection::new(1.2, 0.5, 0.9)));

        engine.evaluate(&p, &at(0.6), Velocity::ZERO);
        assert_eq!(engine.state().previous, Some(at(0.6)));
    }

    proptest! {
        #[test]
        fn prop_flags_are_mutually_exclusive(
            x in -0.5f32..1.5,
            y in -0.5f32..1.5,
            vy in -10.0f32..10.0,
            confidence in 0.0f32..1.0,
        ) {
            let mut engine = TriggerEngine::new();
            let d = engine.evaluate(&params(), &Detection::new(x, y, confidence), Velocity::new(0.0, vy));
            prop_assert!(!(d.soft && d.hard));
            prop_assert_eq!(d, engine.decision());
        }
    }
}
