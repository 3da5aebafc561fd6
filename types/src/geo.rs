//! WGS84 coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypesError;

/// A latitude/longitude pair in decimal degrees.
///
/// Constructed through [`GeoPoint::new`], which rejects values outside the
/// WGS84 ranges. The fields stay public for pattern matching and serde.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Result<Self, TypesError> {
        let point = Self { lat, lng };
        if point.is_valid() {
            Ok(point)
        } else {
            Err(TypesError::InvalidCoordinate { lat, lng })
        }
    }

    /// Finite, `-90 <= lat <= 90` and `-180 <= lng <= 180`.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}
