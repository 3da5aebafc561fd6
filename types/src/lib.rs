//! Fundamental types for clockin.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! timestamps, geographic points, office and network configuration, security modes
//! and employee identifiers.

pub mod employee;
pub mod error;
pub mod geo;
pub mod mode;
pub mod office;
pub mod time;

pub use employee::EmployeeId;
pub use error::TypesError;
pub use geo::GeoPoint;
pub use mode::{LocationMethod, SecurityMode};
pub use office::{NetworkDescriptor, OfficeLocation};
pub use time::Timestamp;
