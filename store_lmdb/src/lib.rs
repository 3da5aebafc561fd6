//! LMDB storage backend for clockin.
//!
//! Implements the storage traits from `clockin-store` using the `heed` LMDB
//! bindings. Each logical store maps to one LMDB database within a single
//! environment.

pub mod attendance;
pub mod environment;
pub mod error;
pub mod preference;

pub use attendance::LmdbAttendanceStore;
pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use preference::LmdbPreferenceStore;
