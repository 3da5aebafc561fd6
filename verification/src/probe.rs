//! Device capabilities the orchestrator drives.
//!
//! Each capability is a trait so that the platform (browser bridge, terminal,
//! test harness) can be swapped. Probes never retry internally; the caller
//! decides whether to run a step again.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use clockin_types::{GeoPoint, NetworkDescriptor, OfficeLocation, Timestamp};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::VerificationError;

/// Options handed to the geolocation probe for every reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix the platform may return.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(60),
        }
    }
}

/// A single position reading.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub point: GeoPoint,
    pub accuracy_meters: f64,
}

/// Obtains the device's current position.
///
/// Fails with `PermissionDenied`, `PositionUnavailable` or `Timeout`.
pub trait GeolocationProbe {
    fn current_position(&self, options: &PositionOptions) -> Result<PositionFix, VerificationError>;
}

/// The WiFi association a network probe observed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedNetwork {
    pub ssid: String,
    pub bssid: Option<String>,
}

/// Reports the device's current network association.
///
/// Advisory: platforms that cannot read the SSID should return `Ok(None)` or
/// rely on a proxy signal such as a manual confirmation.
pub trait NetworkProbe {
    fn current_network(&self) -> Result<Option<ObservedNetwork>, VerificationError>;
}

/// First allow-list entry matching `observed`, if any.
pub fn match_network<'a>(
    observed: &ObservedNetwork,
    allow_list: &'a [NetworkDescriptor],
) -> Option<&'a NetworkDescriptor> {
    allow_list
        .iter()
        .find(|d| d.matches(&observed.ssid, observed.bssid.as_deref()))
}

/// Captures a single still image.
///
/// Fails with `CameraUnavailable` when no stream can be acquired.
pub trait PhotoCapture {
    fn capture(&self) -> Result<Vec<u8>, VerificationError>;
}

/// Lets the employee pick an office by hand. `None` means they backed out.
pub trait OfficeSelector {
    fn select_office(&self, offices: &[OfficeLocation]) -> Option<usize>;
}

/// Source of "now" for evidence timestamps.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A captured photo kept as verification evidence.
///
/// No quality or liveness checks are applied: any captured frame counts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoEvidence {
    #[serde(skip)]
    pub payload: Vec<u8>,
    pub captured_at: Timestamp,
    /// BLAKE2b-256 of the payload, lowercase hex.
    pub digest: String,
}

impl PhotoEvidence {
    pub fn new(payload: Vec<u8>, captured_at: Timestamp) -> Self {
        let mut hasher = Blake2b::<U32>::new();
        hasher.update(&payload);
        let digest = hex::encode(hasher.finalize());
        Self {
            payload,
            captured_at,
            digest,
        }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
