//! Security modes selecting which verification factors a check-in requires.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// A preset determining which of location, network and photo verification
/// are mandatory for a check-in.
///
/// Serialized in kebab-case (`"location-and-wifi"`), which is also the form
/// persisted in the employee's preference store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecurityMode {
    /// GPS fix resolved to the nearest office automatically.
    AutoLocation,
    /// Employee picks the office, the GPS fix is checked against it.
    ManualLocation,
    /// Office WiFi association only.
    WifiOnly,
    /// GPS and WiFi.
    LocationAndWifi,
    /// Photo evidence only.
    PhotoOnly,
    /// Every factor.
    AllSecurity,
}

/// How the location step establishes which office the employee is at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationMethod {
    Automatic,
    Manual,
}

impl SecurityMode {
    pub const ALL: [SecurityMode; 6] = [
        SecurityMode::AutoLocation,
        SecurityMode::ManualLocation,
        SecurityMode::WifiOnly,
        SecurityMode::LocationAndWifi,
        SecurityMode::PhotoOnly,
        SecurityMode::AllSecurity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutoLocation => "auto-location",
            Self::ManualLocation => "manual-location",
            Self::WifiOnly => "wifi-only",
            Self::LocationAndWifi => "location-and-wifi",
            Self::PhotoOnly => "photo-only",
            Self::AllSecurity => "all-security",
        }
    }

    /// Name shown to employees when picking a mode.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::AutoLocation => "Auto-Location",
            Self::ManualLocation => "Manual Location",
            Self::WifiOnly => "WiFi Only",
            Self::LocationAndWifi => "Location + WiFi",
            Self::PhotoOnly => "Photo Only",
            Self::AllSecurity => "Maximum Security",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::AutoLocation => "GPS auto-detection",
            Self::ManualLocation => "Manual office selection",
            Self::WifiOnly => "Network verification",
            Self::LocationAndWifi => "GPS and WiFi required",
            Self::PhotoOnly => "Photo verification",
            Self::AllSecurity => "All methods required",
        }
    }

    pub fn requires_location(&self) -> bool {
        matches!(
            self,
            Self::AutoLocation | Self::ManualLocation | Self::LocationAndWifi | Self::AllSecurity
        )
    }

    pub fn requires_network(&self) -> bool {
        matches!(
            self,
            Self::WifiOnly | Self::LocationAndWifi | Self::AllSecurity
        )
    }

    /// Every mode asks for a photo; whether it is actually required depends on
    /// the global photo setting.
    pub fn requires_photo(&self, photo_enabled: bool) -> bool {
        photo_enabled
    }

    pub fn location_method(&self) -> LocationMethod {
        match self {
            Self::AutoLocation | Self::AllSecurity => LocationMethod::Automatic,
            _ => LocationMethod::Manual,
        }
    }
}

impl fmt::Display for SecurityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecurityMode {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| TypesError::UnknownSecurityMode(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_mode_from_its_own_name() {
        for mode in SecurityMode::ALL {
            assert_eq!(mode.as_str().parse::<SecurityMode>().unwrap(), mode);
        }
    }

    #[test]
    fn rejects_unknown_mode() {
        assert_eq!(
            "face-id".parse::<SecurityMode>(),
            Err(TypesError::UnknownSecurityMode("face-id".into()))
        );
    }

    #[test]
    fn serde_uses_kebab_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: SecurityMode,
        }
        let w: Wrapper = toml::from_str(r#"mode = "location-and-wifi""#).unwrap();
        assert_eq!(w.mode, SecurityMode::LocationAndWifi);
    }

    #[test]
    fn only_auto_and_all_security_locate_automatically() {
        let automatic: Vec<_> = SecurityMode::ALL
            .into_iter()
            .filter(|m| m.location_method() == LocationMethod::Automatic)
            .collect();
        assert_eq!(
            automatic,
            vec![SecurityMode::AutoLocation, SecurityMode::AllSecurity]
        );
    }
}
