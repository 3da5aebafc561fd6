//! Attendance on top of verification.
//!
//! - [`settings`]: the administrator's attendance configuration (offices,
//!   security modes, working hours), loaded from TOML and validated.
//! - [`preference`]: which security mode applies to this employee device.
//! - [`service`]: turns a completed verification into a check-in record and
//!   closes it on check-out.
//! - [`summary`]: monthly attendance statistics.

pub mod error;
pub mod preference;
pub mod service;
pub mod settings;
pub mod summary;

pub use error::AttendanceError;
pub use preference::SecurityModePreference;
pub use service::AttendanceService;
pub use settings::{AttendanceSettings, OfficeConfig};
pub use summary::AttendanceSummary;
