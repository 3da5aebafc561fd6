//! Per-device key-value preferences.

use crate::StoreError;

/// Key under which the employee's chosen security mode is stored.
pub const SECURITY_MODE_KEY: &str = "employeeSecurityMode";

/// Local key-value storage for client preferences. Values are plain strings.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}
