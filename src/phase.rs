//! Cooking session phases
//!
//! PREPARATION (gather ingredients) -> COOKING (follow steps) -> COMPLETED.
//! Transitions are forward-only and fire at most once each; a transition
//! currently being acted on suppresses re-evaluation until the caller
//! acknowledges it with `finish_transition`.

use crate::checklist::Checklist;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Preparation,
    Cooking,
    Completed,
}

/// A transition the caller must act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseTransition {
    /// All ingredients ready: announce, reset step history, start cooking
    BeginCooking {
        /// Spoken transition announcement naming the first incomplete step
        announcement: String,
    },
    /// All steps completed: finalize the session
    Complete,
}

#[derive(Debug)]
pub struct PhaseMachine {
    phase: Phase,
    transitioning: bool,
}

impl PhaseMachine {
    pub fn new() -> Self {
        Self {
            phase: Phase::Preparation,
            transitioning: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Inspect checklist completion and advance if a transition trigger holds.
    ///
    /// Advances the phase immediately and returns the transition for the
    /// caller to act on; further calls return `None` until the caller invokes
    /// `finish_transition`, so a trigger firing mid-transition is suppressed.
    pub fn evaluate(&mut self, ingredients: &Checklist, steps: &Checklist) -> Option<PhaseTransition> {
        if self.transitioning {
            return None;
        }

        match self.phase {
            Phase::Preparation if ingredients.all_ready() => {
                self.phase = Phase::Cooking;
                self.transitioning = true;

                let first_step = steps
                    .next_incomplete()
                    .map(|step| step.text.clone())
                    .unwrap_or_else(|| "enjoy your dish".to_string());

                Some(PhaseTransition::BeginCooking {
                    announcement: format!(
                        "Great! You have all the ingredients ready. Let's start cooking! \
                         Your first step is to {}.",
                        first_step
                    ),
                })
            }
            Phase::Cooking if steps.all_ready() => {
                self.phase = Phase::Completed;
                self.transitioning = true;
                Some(PhaseTransition::Complete)
            }
            _ => None,
        }
    }

    /// Acknowledge that the pending transition's actions have run
    pub fn finish_transition(&mut self) {
        self.transitioning = false;
    }
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self::new()
    }
}
