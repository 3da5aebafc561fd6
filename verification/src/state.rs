//! Per-attempt verification state.

use serde::{Deserialize, Serialize};

use crate::requirements::{Step, StepRequirements};
use crate::VerificationError;

/// Which factors have succeeded in the current attempt.
///
/// Transient: one instance per check-in attempt, never persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationStatus {
    pub location: bool,
    pub network: bool,
    pub photo: bool,
}

impl VerificationStatus {
    pub fn get(&self, step: Step) -> bool {
        match step {
            Step::Location => self.location,
            Step::Network => self.network,
            Step::Photo => self.photo,
        }
    }

    pub fn set(&mut self, step: Step, verified: bool) {
        match step {
            Step::Location => self.location = verified,
            Step::Network => self.network = verified,
            Step::Photo => self.photo = verified,
        }
    }

    /// Required steps that have succeeded.
    pub fn completed(&self, requirements: &StepRequirements) -> usize {
        requirements
            .steps()
            .into_iter()
            .filter(|s| self.get(*s))
            .count()
    }

    /// `round(100 * completed / required)`. Only successes count, skipped
    /// steps never raise the percentage.
    pub fn progress_percent(&self, requirements: &StepRequirements) -> u8 {
        let total = requirements.count();
        if total == 0 {
            return 0;
        }
        let done = self.completed(requirements);
        ((done * 100 + total / 2) / total) as u8
    }
}

/// Where the orchestrator currently stands.
#[derive(Clone, Debug, PartialEq)]
pub enum Phase {
    /// Waiting to run this step.
    AtStep(Step),
    /// The step failed; the attempt waits for retry, skip, back or cancel.
    Failed { step: Step, error: VerificationError },
    /// Terminal.
    Complete,
}

impl Phase {
    pub fn step(&self) -> Option<Step> {
        match self {
            Self::AtStep(step) | Self::Failed { step, .. } => Some(*step),
            Self::Complete => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::AtStep(step) => format!("at the {step} step"),
            Self::Failed { step, .. } => format!("the {step} step has failed"),
            Self::Complete => "verification is complete".to_string(),
        }
    }
}
