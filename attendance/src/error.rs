use chrono::NaiveDate;
use clockin_store::StoreError;
use clockin_types::{SecurityMode, Timestamp};
use clockin_verification::Step;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid attendance settings: {}", .0.join("; "))]
    InvalidSettings(Vec<String>),

    #[error("attendance tracking is disabled")]
    Disabled,

    #[error("verification incomplete, skipped: {}", join_steps(.skipped))]
    NotVerified { skipped: Vec<Step> },

    #[error("already checked in on {0}")]
    AlreadyCheckedIn(NaiveDate),

    #[error("already checked out on {0}")]
    AlreadyCheckedOut(NaiveDate),

    #[error("no open check-in on {0}")]
    NotCheckedIn(NaiveDate),

    #[error("security mode {0} is not available to employees")]
    ModeNotAllowed(SecurityMode),

    #[error("timestamp {0} cannot be placed on the local calendar")]
    InvalidTimestamp(Timestamp),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

fn join_steps(steps: &[Step]) -> String {
    steps
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
