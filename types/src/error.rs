//! Top-level error type for malformed domain values.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypesError {
    #[error("invalid coordinate: lat {lat}, lng {lng}")]
    InvalidCoordinate { lat: f64, lng: f64 },

    #[error("office {office}: radius must be greater than zero, got {radius}")]
    InvalidRadius { office: String, radius: f64 },

    #[error("unknown security mode: {0}")]
    UnknownSecurityMode(String),

    #[error("employee id must not be empty")]
    EmptyEmployeeId,

    #[error("employee id must not contain control characters: {0:?}")]
    InvalidEmployeeId(String),
}
