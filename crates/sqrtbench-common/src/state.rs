//! Benchmark phase state machine.
//!
//! The run is strictly sequential with no way back:
//! BOOT → INIT → POPULATE → MEASURE → REPORT → IDLE
//!
//! IDLE is terminal; the driver stays there mirroring switches to LEDs.

use crate::error::{BenchError, BenchResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phases of a benchmark run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BenchState {
    /// Register blocks acquired, nothing touched yet.
    #[default]
    Boot,
    /// Timer configured and period captured.
    Init,
    /// Test vector built.
    Populate,
    /// Batch computed and timestamped.
    Measure,
    /// Results validated and handed to the console.
    Report,
    /// Terminal switch-to-LED mirroring.
    Idle,
}

impl fmt::Display for BenchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boot => write!(f, "BOOT"),
            Self::Init => write!(f, "INIT"),
            Self::Populate => write!(f, "POPULATE"),
            Self::Measure => write!(f, "MEASURE"),
            Self::Report => write!(f, "REPORT"),
            Self::Idle => write!(f, "IDLE"),
        }
    }
}

impl BenchState {
    /// Check if a transition to `target` is valid from the current state.
    #[must_use]
    pub fn can_transition_to(&self, target: BenchState) -> bool {
        use BenchState::{Boot, Idle, Init, Measure, Populate, Report};

        matches!(
            (self, target),
            (Boot, Init)
                | (Init, Populate)
                | (Populate, Measure)
                | (Measure, Report)
                | (Report, Idle)
        )
    }
}

/// State machine wrapper that rejects out-of-order phases.
#[derive(Debug, Clone)]
pub struct StateMachine {
    current: BenchState,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// Create a new state machine starting in BOOT.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: BenchState::Boot,
        }
    }

    /// Get the current state.
    #[must_use]
    pub fn state(&self) -> BenchState {
        self.current
    }

    /// Attempt a state transition.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::InvalidStateTransition`] when `target` is not the next phase.
    pub fn transition(&mut self, target: BenchState) -> BenchResult<()> {
        if self.current.can_transition_to(target) {
            self.current = target;
            Ok(())
        } else {
            Err(BenchError::InvalidStateTransition {
                from: self.current.to_string(),
                to: target.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_forward_transitions() {
        let mut sm = StateMachine::new();
        assert_eq!(sm.state(), BenchState::Boot);

        for next in [
            BenchState::Init,
            BenchState::Populate,
            BenchState::Measure,
            BenchState::Report,
            BenchState::Idle,
        ] {
            assert!(sm.transition(next).is_ok());
            assert_eq!(sm.state(), next);
        }
        assert_eq!(sm.state(), BenchState::Idle);
    }

    #[test]
    fn test_skipping_a_phase_is_rejected() {
        let mut sm = StateMachine::new();
        sm.transition(BenchState::Init).unwrap();

        let err = sm.transition(BenchState::Measure).unwrap_err();
        assert_eq!(
            err,
            BenchError::InvalidStateTransition {
                from: "INIT".into(),
                to: "MEASURE".into(),
            }
        );
        assert_eq!(sm.state(), BenchState::Init);
    }

    #[test]
    fn test_no_way_back() {
        let mut sm = StateMachine::new();
        sm.transition(BenchState::Init).unwrap();
        sm.transition(BenchState::Populate).unwrap();
        sm.transition(BenchState::Measure).unwrap();

        assert!(sm.transition(BenchState::Populate).is_err());
        assert!(sm.transition(BenchState::Measure).is_err());
        assert_eq!(sm.state(), BenchState::Measure);
    }

    #[test]
    fn test_idle_is_terminal() {
        for target in [
            BenchState::Boot,
            BenchState::Init,
            BenchState::Populate,
            BenchState::Measure,
            BenchState::Report,
            BenchState::Idle,
        ] {
            assert!(!BenchState::Idle.can_transition_to(target));
        }
    }

}
