//! Office resolver: nearest configured office and the in-range decision.
//!
//! Distances are great-circle (haversine) on a spherical Earth of radius
//! [`EARTH_RADIUS_METERS`]. The resolver is a pure function of its inputs.

use clockin_types::{GeoPoint, OfficeLocation};
use serde::{Deserialize, Serialize};

use crate::VerificationError;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance between two points, in meters.
pub fn haversine_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1.0 for antipodal points.
    let c = 2.0 * h.sqrt().min(1.0).asin();
    EARTH_RADIUS_METERS * c
}

/// The office a position was measured against.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OfficeMatch {
    pub office: OfficeLocation,
    pub distance_meters: f64,
    pub is_within_range: bool,
}

impl OfficeMatch {
    /// Measure `point` against one specific office. The boundary is inclusive.
    pub fn measure(point: GeoPoint, office: &OfficeLocation) -> Self {
        let distance_meters = haversine_distance(point, office.point());
        Self {
            office: office.clone(),
            distance_meters,
            is_within_range: distance_meters <= office.radius_meters,
        }
    }

    /// How far outside the radius the point is (zero when in range).
    pub fn overshoot_meters(&self) -> f64 {
        (self.distance_meters - self.office.radius_meters).max(0.0)
    }

    /// `Ok(self)` when in range, `OutOfRange` otherwise.
    pub fn into_in_range(self) -> Result<Self, VerificationError> {
        if self.is_within_range {
            Ok(self)
        } else {
            Err(VerificationError::OutOfRange {
                office: self.office.name,
                distance_m: self.distance_meters,
                radius_m: self.office.radius_meters,
            })
        }
    }
}

/// Find the office nearest to `point`.
///
/// Ties are broken by list order: the earliest office at the minimal distance
/// wins. Offices with malformed coordinates or radius are skipped. An invalid
/// coordinate, or no usable office, is an error.
pub fn resolve_nearest_office(
    point: GeoPoint,
    offices: &[OfficeLocation],
) -> Result<OfficeMatch, VerificationError> {
    GeoPoint::new(point.lat, point.lng)?;

    let mut best: Option<(usize, f64)> = None;
    for (i, office) in offices.iter().enumerate() {
        if office.validate().is_err() {
            continue;
        }
        let d = haversine_distance(point, office.point());
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((i, d)),
        }
    }

    let (index, _) = best.ok_or(VerificationError::NoOfficeConfigured)?;
    Ok(OfficeMatch::measure(point, &offices[index]))
}
