//! Office configuration: position, check-in radius and WiFi allow-list.

use serde::{Deserialize, Serialize};

use crate::{GeoPoint, TypesError};

/// A WiFi network accepted as proof of presence at an office.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDescriptor {
    pub ssid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bssid: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl NetworkDescriptor {
    pub fn new(ssid: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            bssid: None,
            description: String::new(),
        }
    }

    pub fn with_bssid(mut self, bssid: impl Into<String>) -> Self {
        self.bssid = Some(bssid.into());
        self
    }

    /// SSIDs compare exactly. A descriptor that pins a BSSID only matches an
    /// observation carrying the same BSSID (case-insensitive).
    pub fn matches(&self, ssid: &str, bssid: Option<&str>) -> bool {
        if self.ssid != ssid {
            return false;
        }
        match (&self.bssid, bssid) {
            (None, _) => true,
            (Some(pinned), Some(seen)) => pinned.eq_ignore_ascii_case(seen),
            (Some(_), None) => false,
        }
    }
}

/// A configured office. Read-only to the verification flow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OfficeLocation {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
    #[serde(default)]
    pub networks: Vec<NetworkDescriptor>,
}

impl OfficeLocation {
    pub fn point(&self) -> GeoPoint {
        GeoPoint {
            lat: self.latitude,
            lng: self.longitude,
        }
    }

    pub fn validate(&self) -> Result<(), TypesError> {
        GeoPoint::new(self.latitude, self.longitude)?;
        if !(self.radius_meters.is_finite() && self.radius_meters > 0.0) {
            return Err(TypesError::InvalidRadius {
                office: self.name.clone(),
                radius: self.radius_meters,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn office(radius: f64) -> OfficeLocation {
        OfficeLocation {
            id: "arusha".into(),
            name: "Arusha Main Office".into(),
            address: "Main Office, Arusha, Tanzania".into(),
            latitude: -3.359178,
            longitude: 36.661366,
            radius_meters: radius,
            networks: vec![],
        }
    }

    #[test]
    fn radius_must_be_positive() {
        assert!(office(100.0).validate().is_ok());
        assert!(matches!(
            office(0.0).validate(),
            Err(TypesError::InvalidRadius { .. })
        ));
        assert!(office(f64::NAN).validate().is_err());
    }

    #[test]
    fn unpinned_descriptor_matches_on_ssid() {
        let d = NetworkDescriptor::new("Office_Guest");
        assert!(d.matches("Office_Guest", None));
        assert!(d.matches("Office_Guest", Some("aa:bb:cc:dd:ee:ff")));
        assert!(!d.matches("office_guest", None));
    }

    #[test]
    fn pinned_descriptor_requires_bssid() {
        let d = NetworkDescriptor::new("Office_WiFi").with_bssid("00:11:22:33:44:55");
        assert!(d.matches("Office_WiFi", Some("00:11:22:33:44:55")));
        assert!(d.matches("Office_WiFi", Some("00:11:22:33:44:55".to_uppercase().as_str())));
        assert!(!d.matches("Office_WiFi", Some("00:11:22:33:44:56")));
        assert!(!d.matches("Office_WiFi", None));
    }
}
