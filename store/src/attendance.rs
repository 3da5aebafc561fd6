//! Attendance record storage trait.

use chrono::NaiveDate;
use clockin_types::{EmployeeId, SecurityMode, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::StoreError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttendanceStatus {
    Present,
    Late,
    HalfDay,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Late => "late",
            Self::HalfDay => "half-day",
            Self::Absent => "absent",
        }
    }

    /// The employee showed up that day.
    pub fn is_attended(&self) -> bool {
        !matches!(self, Self::Absent)
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One employee's attendance for one local calendar date.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub employee: EmployeeId,
    pub date: NaiveDate,
    pub check_in: Option<Timestamp>,
    pub check_out: Option<Timestamp>,
    pub status: AttendanceStatus,
    pub total_hours: f64,
    /// Mode the check-in was verified under.
    pub security_mode: Option<SecurityMode>,
    pub office_id: Option<String>,
    /// BLAKE2b-256 hex digest of the check-in photo.
    pub photo_digest: Option<String>,
}

impl AttendanceRecord {
    pub fn is_open(&self) -> bool {
        self.check_in.is_some() && self.check_out.is_none()
    }
}

/// Trait for attendance record storage, keyed by employee + date.
pub trait AttendanceStore {
    fn get_record(
        &self,
        employee: &EmployeeId,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError>;

    /// Insert or replace the record for `(record.employee, record.date)`.
    fn put_record(&self, record: &AttendanceRecord) -> Result<(), StoreError>;

    /// All records of one employee, ordered by date.
    fn records_for(&self, employee: &EmployeeId) -> Result<Vec<AttendanceRecord>, StoreError>;
}
