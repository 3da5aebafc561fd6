//! LMDB implementation of AttendanceStore.
//!
//! Records use composite keys `employee_bytes ++ 0x00 ++ "YYYY-MM-DD"`, so the
//! records of one employee are a prefix range-scan already ordered by date.

use std::sync::Arc;

use chrono::NaiveDate;
use heed::types::Bytes;
use heed::{Database, Env};

use clockin_store::{AttendanceRecord, AttendanceStore, StoreError};
use clockin_types::EmployeeId;

use crate::LmdbError;

pub struct LmdbAttendanceStore {
    pub(crate) env: Arc<Env>,
    pub(crate) attendance_db: Database<Bytes, Bytes>,
}

fn employee_prefix(employee: &EmployeeId) -> Vec<u8> {
    let mut key = employee.as_str().as_bytes().to_vec();
    key.push(0);
    key
}

/// Build composite key `employee_bytes ++ 0x00 ++ date`.
fn record_key(employee: &EmployeeId, date: NaiveDate) -> Vec<u8> {
    let mut key = employee_prefix(employee);
    key.extend_from_slice(date.format("%Y-%m-%d").to_string().as_bytes());
    key
}

impl AttendanceStore for LmdbAttendanceStore {
    fn get_record(
        &self,
        employee: &EmployeeId,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .attendance_db
            .get(&rtxn, &record_key(employee, date))
            .map_err(LmdbError::from)?;
        match val {
            Some(bytes) => {
                let record = bincode::deserialize(bytes).map_err(LmdbError::from)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn put_record(&self, record: &AttendanceRecord) -> Result<(), StoreError> {
        let bytes = bincode::serialize(record).map_err(LmdbError::from)?;
        let key = record_key(&record.employee, record.date);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.attendance_db
            .put(&mut wtxn, &key, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn records_for(&self, employee: &EmployeeId) -> Result<Vec<AttendanceRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let prefix = employee_prefix(employee);
        let iter = self
            .attendance_db
            .prefix_iter(&rtxn, &prefix)
            .map_err(LmdbError::from)?;
        let mut records = Vec::new();
        for result in iter {
            let (_key, val) = result.map_err(LmdbError::from)?;
            let record: AttendanceRecord =
                bincode::deserialize(val).map_err(LmdbError::from)?;
            records.push(record);
        }
        Ok(records)
    }
}
