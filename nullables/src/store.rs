//! Nullable stores: thread-safe in-memory storage for testing.

use chrono::NaiveDate;
use clockin_store::{AttendanceRecord, AttendanceStore, PreferenceStore, StoreError};
use clockin_types::EmployeeId;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// An in-memory preference store.
#[derive(Default)]
pub struct NullPreferenceStore {
    values: Mutex<HashMap<String, String>>,
}

impl NullPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key.
    pub fn with(self, key: &str, value: &str) -> Self {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        self
    }
}

impl PreferenceStore for NullPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

/// An in-memory attendance store.
#[derive(Default)]
pub struct NullAttendanceStore {
    records: Mutex<BTreeMap<(EmployeeId, NaiveDate), AttendanceRecord>>,
}

impl NullAttendanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AttendanceStore for NullAttendanceStore {
    fn get_record(
        &self,
        employee: &EmployeeId,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&(employee.clone(), date))
            .cloned())
    }

    fn put_record(&self, record: &AttendanceRecord) -> Result<(), StoreError> {
        self.records
            .lock()
            .unwrap()
            .insert((record.employee.clone(), record.date), record.clone());
        Ok(())
    }

    fn records_for(&self, employee: &EmployeeId) -> Result<Vec<AttendanceRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|((e, _), _)| e == employee)
            .map(|(_, r)| r.clone())
            .collect())
    }
}
