//! Terminal-backed device capabilities.
//!
//! A terminal has no positioning API or camera, so the position and the
//! photo come from command-line arguments. The WiFi association is read from
//! the host with `iwgetid` unless given explicitly.

use std::path::PathBuf;
use std::process::Command;

use clockin_types::OfficeLocation;
use clockin_verification::{
    GeolocationProbe, NetworkProbe, ObservedNetwork, OfficeSelector, PhotoCapture, PositionFix,
    PositionOptions, VerificationError,
};
use tracing::debug;

/// A position given on the command line.
pub struct ArgsGeolocation {
    pub fix: PositionFix,
}

impl GeolocationProbe for ArgsGeolocation {
    fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<PositionFix, VerificationError> {
        Ok(self.fix)
    }
}

/// A WiFi association given on the command line.
pub struct FlagNetwork {
    pub observed: ObservedNetwork,
}

impl NetworkProbe for FlagNetwork {
    fn current_network(&self) -> Result<Option<ObservedNetwork>, VerificationError> {
        Ok(Some(self.observed.clone()))
    }
}

/// Reads the current association with `iwgetid` (wireless-tools).
///
/// Advisory only: the SSID is whatever the host reports. A missing tool or
/// no association reads as "not connected".
pub struct SystemNetworkProbe;

impl SystemNetworkProbe {
    fn iwgetid(args: &[&str]) -> Option<String> {
        let output = match Command::new("iwgetid").args(args).output() {
            Ok(output) => output,
            Err(e) => {
                debug!("iwgetid unavailable: {e}");
                return None;
            }
        };
        if !output.status.success() {
            return None;
        }
        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!value.is_empty()).then_some(value)
    }
}

impl NetworkProbe for SystemNetworkProbe {
    fn current_network(&self) -> Result<Option<ObservedNetwork>, VerificationError> {
        let Some(ssid) = Self::iwgetid(&["-r"]) else {
            return Ok(None);
        };
        let bssid = Self::iwgetid(&["-a", "-r"]);
        Ok(Some(ObservedNetwork { ssid, bssid }))
    }
}

/// Uses an image file as the captured photo.
pub struct FileCamera {
    pub path: PathBuf,
}

impl PhotoCapture for FileCamera {
    fn capture(&self) -> Result<Vec<u8>, VerificationError> {
        std::fs::read(&self.path).map_err(|e| {
            VerificationError::CameraUnavailable(format!("{}: {e}", self.path.display()))
        })
    }
}

/// Picks the office at a 1-based index from `office resolve`/settings order.
pub struct IndexOfficeSelector {
    pub index: usize,
}

impl OfficeSelector for IndexOfficeSelector {
    fn select_office(&self, offices: &[OfficeLocation]) -> Option<usize> {
        let i = self.index.checked_sub(1)?;
        (i < offices.len()).then_some(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn office(id: &str) -> OfficeLocation {
        OfficeLocation {
            id: id.into(),
            name: id.into(),
            address: String::new(),
            latitude: 0.0,
            longitude: 0.0,
            radius_meters: 100.0,
            networks: Vec::new(),
        }
    }

    #[test]
    fn selector_is_one_based_and_bounded() {
        let offices = [office("a"), office("b")];
        assert_eq!(IndexOfficeSelector { index: 1 }.select_office(&offices), Some(0));
        assert_eq!(IndexOfficeSelector { index: 2 }.select_office(&offices), Some(1));
        assert_eq!(IndexOfficeSelector { index: 0 }.select_office(&offices), None);
        assert_eq!(IndexOfficeSelector { index: 3 }.select_office(&offices), None);
    }

    #[test]
    fn missing_photo_file_is_camera_unavailable() {
        let camera = FileCamera {
            path: PathBuf::from("/nonexistent/clockin/photo.jpg"),
        };
        assert!(matches!(
            camera.capture(),
            Err(VerificationError::CameraUnavailable(_))
        ));
    }
}
