//! Nullable infrastructure for deterministic testing.
//!
//! Every external capability (clock, geolocation, WiFi, camera, office
//! picker, storage) is abstracted behind a trait. This crate provides
//! test-friendly implementations that:
//! - Return deterministic, scripted values
//! - Record how often they were called
//! - Never touch the filesystem, the network or real hardware
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod device;
pub mod store;

pub use clock::NullClock;
pub use device::{NullCamera, NullGeolocation, NullNetworkProbe, NullOfficeSelector};
pub use store::{NullAttendanceStore, NullPreferenceStore};
