//! Abstract storage traits for clockin.
//!
//! Every storage backend (LMDB, the hosted row store, in-memory for testing)
//! implements these traits. The rest of the codebase depends only on the traits.

pub mod attendance;
pub mod error;
pub mod office;
pub mod preference;

pub use attendance::{AttendanceRecord, AttendanceStatus, AttendanceStore};
pub use error::StoreError;
pub use office::OfficeDirectory;
pub use preference::{PreferenceStore, SECURITY_MODE_KEY};
