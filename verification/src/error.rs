use clockin_types::TypesError;
use thiserror::Error;

use crate::requirements::Step;

/// Why a verification step (or an orchestrator operation) failed.
///
/// Every variant is terminal for the step that produced it. None are retried
/// automatically; [`VerificationError::recovery_actions`] lists what the
/// employee may do next.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VerificationError {
    #[error("location permission denied, allow location access and try again")]
    PermissionDenied,

    #[error("location information is unavailable")]
    PositionUnavailable,

    #[error("location request timed out")]
    Timeout,

    #[error("GPS accuracy is {accuracy_m:.0}m, at most {required_m:.0}m is required")]
    AccuracyTooLow { accuracy_m: f64, required_m: f64 },

    #[error("no office locations are configured")]
    NoOfficeConfigured,

    #[error(
        "you are {distance_m:.0}m from {office}, {over:.0}m outside the {radius_m:.0}m check-in radius",
        over = .distance_m - .radius_m
    )]
    OutOfRange {
        office: String,
        distance_m: f64,
        radius_m: f64,
    },

    #[error("not connected to an office network{}", observed_suffix(.observed))]
    NetworkMismatch { observed: Option<String> },

    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("no office was selected")]
    SelectionCancelled,

    #[error("{0} capability is not available on this device")]
    CapabilityMissing(Capability),

    #[error("security mode requires no verification steps")]
    NoRequiredSteps,

    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: String,
    },

    #[error(transparent)]
    InvalidInput(#[from] TypesError),
}

fn observed_suffix(observed: &Option<String>) -> String {
    match observed {
        Some(ssid) => format!(" (connected to '{ssid}')"),
        None => String::new(),
    }
}

/// A device capability the orchestrator depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Geolocation,
    Network,
    Camera,
    OfficeSelection,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Geolocation => "geolocation",
            Self::Network => "network",
            Self::Camera => "camera",
            Self::OfficeSelection => "office selection",
        })
    }
}

/// What the employee can do after a failed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Run the failed step again.
    Retry,
    /// Pick the office from a list instead of GPS detection.
    SelectManually,
    /// Abandon the whole attempt.
    Cancel,
}

impl VerificationError {
    /// Map a platform geolocation error code (1, 2, 3) to an error.
    pub fn from_geolocation_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(Self::PermissionDenied),
            2 => Some(Self::PositionUnavailable),
            3 => Some(Self::Timeout),
            _ => None,
        }
    }

    /// Errors raised by the location step.
    pub fn is_location_error(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied
                | Self::PositionUnavailable
                | Self::Timeout
                | Self::AccuracyTooLow { .. }
                | Self::NoOfficeConfigured
                | Self::OutOfRange { .. }
                | Self::SelectionCancelled
                | Self::CapabilityMissing(Capability::Geolocation)
                | Self::CapabilityMissing(Capability::OfficeSelection)
        )
    }

    /// Recovery actions offered for this error when it occurred at `step`
    /// under automatic office detection (`automatic == true`).
    pub fn recovery_actions(&self, step: Step, automatic: bool) -> Vec<RecoveryAction> {
        if matches!(self, Self::NoRequiredSteps | Self::InvalidTransition { .. }) {
            return vec![RecoveryAction::Cancel];
        }
        let mut actions = vec![RecoveryAction::Retry];
        if step == Step::Location && automatic && self.is_location_error() {
            actions.push(RecoveryAction::SelectManually);
        }
        actions.push(RecoveryAction::Cancel);
        actions
    }
}
