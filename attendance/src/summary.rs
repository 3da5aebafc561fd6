//! Monthly attendance statistics.

use chrono::Datelike;
use clockin_store::{AttendanceRecord, AttendanceStatus};
use serde::Serialize;

/// Aggregate attendance over a set of days.
///
/// `present_days` counts every attended day, late and half days included.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AttendanceSummary {
    pub total_days: u32,
    pub present_days: u32,
    pub late_days: u32,
    pub half_days: u32,
    pub absent_days: u32,
    pub total_hours: f64,
    /// Mean hours over attended days.
    pub average_hours: f64,
    /// `present_days / total_days` as a percentage, zero when there are no days.
    pub attendance_rate: f64,
}

impl AttendanceSummary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a AttendanceRecord>) -> Self {
        let mut s = Self::default();
        for r in records {
            s.total_days += 1;
            match r.status {
                AttendanceStatus::Present => {}
                AttendanceStatus::Late => s.late_days += 1,
                AttendanceStatus::HalfDay => s.half_days += 1,
                AttendanceStatus::Absent => s.absent_days += 1,
            }
            if r.status.is_attended() {
                s.present_days += 1;
            }
            s.total_hours += r.total_hours;
        }
        if s.present_days > 0 {
            s.average_hours = round2(s.total_hours / f64::from(s.present_days));
        }
        if s.total_days > 0 {
            s.attendance_rate =
                round2(f64::from(s.present_days) * 100.0 / f64::from(s.total_days));
        }
        s.total_hours = round2(s.total_hours);
        s
    }

    /// Summary of the records dated in `year`-`month`.
    pub fn for_month(records: &[AttendanceRecord], year: i32, month: u32) -> Self {
        Self::from_records(
            records
                .iter()
                .filter(|r| r.date.year() == year && r.date.month() == month),
        )
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
