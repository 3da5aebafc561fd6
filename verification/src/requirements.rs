//! Which verification steps a security mode requires, and in what order.

use clockin_types::SecurityMode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One verification factor. Steps always run in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Location,
    Network,
    Photo,
}

impl Step {
    pub const ORDER: [Step; 3] = [Step::Location, Step::Network, Step::Photo];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Network => "network",
            Self::Photo => "photo",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Require-flags derived from a [`SecurityMode`] and the global photo setting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRequirements {
    pub location: bool,
    pub network: bool,
    pub photo: bool,
}

impl StepRequirements {
    pub fn for_mode(mode: SecurityMode, photo_enabled: bool) -> Self {
        Self {
            location: mode.requires_location(),
            network: mode.requires_network(),
            photo: mode.requires_photo(photo_enabled),
        }
    }

    pub fn requires(&self, step: Step) -> bool {
        match step {
            Step::Location => self.location,
            Step::Network => self.network,
            Step::Photo => self.photo,
        }
    }

    /// Required steps in execution order.
    pub fn steps(&self) -> Vec<Step> {
        Step::ORDER
            .into_iter()
            .filter(|s| self.requires(*s))
            .collect()
    }

    pub fn count(&self) -> usize {
        self.steps().len()
    }

    pub fn first(&self) -> Option<Step> {
        self.steps().into_iter().next()
    }

    /// The next required step strictly after `step`.
    pub fn after(&self, step: Step) -> Option<Step> {
        self.steps().into_iter().find(|s| *s > step)
    }

    /// The last required step strictly before `step`.
    pub fn before(&self, step: Step) -> Option<Step> {
        self.steps().into_iter().rev().find(|s| *s < step)
    }
}
