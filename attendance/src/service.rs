//! Check-in and check-out on top of a completed verification.

use chrono::{Days, NaiveDate};
use clockin_store::{AttendanceRecord, AttendanceStatus, AttendanceStore};
use clockin_types::{EmployeeId, Timestamp};
use clockin_verification::VerificationOutcome;
use tracing::{info, warn};

use crate::{AttendanceError, AttendanceSettings, AttendanceSummary};

/// Writes attendance records for verified check-ins.
///
/// Records are keyed by the office-local calendar date of the check-in, so
/// a night shift that ends after midnight still closes the record it opened.
pub struct AttendanceService<'a, S: AttendanceStore + ?Sized> {
    store: &'a S,
    settings: &'a AttendanceSettings,
}

impl<'a, S: AttendanceStore + ?Sized> AttendanceService<'a, S> {
    pub fn new(store: &'a S, settings: &'a AttendanceSettings) -> Self {
        Self { store, settings }
    }

    /// Record a check-in at `outcome.completed_at`.
    pub fn check_in(
        &self,
        employee: &EmployeeId,
        outcome: &VerificationOutcome,
    ) -> Result<AttendanceRecord, AttendanceError> {
        if !self.settings.enabled {
            return Err(AttendanceError::Disabled);
        }
        if !outcome.is_fully_verified() && !self.settings.accept_skipped_steps {
            warn!(
                employee = %employee.as_str(),
                skipped = outcome.skipped.len(),
                "check-in refused, verification incomplete"
            );
            return Err(AttendanceError::NotVerified {
                skipped: outcome.skipped.clone(),
            });
        }

        let at = outcome.completed_at;
        let local = self.settings.local_datetime(at)?;
        let date = local.date();

        if let Some(existing) = self.store.get_record(employee, date)? {
            if existing.check_in.is_some() {
                return Err(AttendanceError::AlreadyCheckedIn(date));
            }
        }

        let late = matches!(self.settings.late_after()?, Some(limit) if local.time() > limit);
        let status = if late {
            AttendanceStatus::Late
        } else {
            AttendanceStatus::Present
        };

        let record = AttendanceRecord {
            employee: employee.clone(),
            date,
            check_in: Some(at),
            check_out: None,
            status,
            total_hours: 0.0,
            security_mode: Some(outcome.mode),
            office_id: outcome.office.as_ref().map(|m| m.office.id.clone()),
            photo_digest: outcome.photo.as_ref().map(|p| p.digest.clone()),
        };
        self.store.put_record(&record)?;

        info!(
            employee = %employee.as_str(),
            %date,
            %status,
            mode = %outcome.mode,
            office = record.office_id.as_deref().unwrap_or("-"),
            "checked in"
        );
        Ok(record)
    }

    /// Close the open check-in at `at`.
    ///
    /// Looks at today's record first, then at yesterday's when it is still
    /// open.
    pub fn check_out(
        &self,
        employee: &EmployeeId,
        at: Timestamp,
    ) -> Result<AttendanceRecord, AttendanceError> {
        if !self.settings.enabled {
            return Err(AttendanceError::Disabled);
        }
        let local = self.settings.local_datetime(at)?;
        let today = local.date();

        let mut record = match self.store.get_record(employee, today)? {
            Some(r) if r.is_open() => r,
            Some(r) if r.check_out.is_some() => {
                return Err(AttendanceError::AlreadyCheckedOut(today))
            }
            _ => match self.open_record_before(employee, today)? {
                Some(r) => r,
                None => return Err(AttendanceError::NotCheckedIn(today)),
            },
        };

        let checked_in = record.check_in.unwrap_or(at);
        let hours = worked_hours(checked_in, at);
        record.check_out = Some(at);
        record.total_hours = hours;
        if hours < self.settings.shift_hours()? / 2.0 {
            record.status = AttendanceStatus::HalfDay;
        }
        self.store.put_record(&record)?;

        info!(
            employee = %employee.as_str(),
            date = %record.date,
            hours = record.total_hours,
            status = %record.status,
            "checked out"
        );
        Ok(record)
    }

    /// Today's record for `employee`, if any.
    pub fn today(
        &self,
        employee: &EmployeeId,
        now: Timestamp,
    ) -> Result<Option<AttendanceRecord>, AttendanceError> {
        let date = self.local_date(now)?;
        Ok(self.store.get_record(employee, date)?)
    }

    /// Statistics for one calendar month.
    pub fn summary(
        &self,
        employee: &EmployeeId,
        year: i32,
        month: u32,
    ) -> Result<AttendanceSummary, AttendanceError> {
        let records = self.store.records_for(employee)?;
        Ok(AttendanceSummary::for_month(&records, year, month))
    }

    pub fn local_date(&self, at: Timestamp) -> Result<NaiveDate, AttendanceError> {
        self.settings.local_datetime(at).map(|dt| dt.date())
    }

    fn open_record_before(
        &self,
        employee: &EmployeeId,
        today: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, AttendanceError> {
        let Some(yesterday) = today.checked_sub_days(Days::new(1)) else {
            return Ok(None);
        };
        Ok(self
            .store
            .get_record(employee, yesterday)?
            .filter(AttendanceRecord::is_open))
    }
}

/// Hours between two timestamps, rounded to two decimals.
fn worked_hours(from: Timestamp, to: Timestamp) -> f64 {
    let secs = from.elapsed_since(to) as f64;
    (secs / 36.0).round() / 100.0
}
