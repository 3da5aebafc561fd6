//! Nullable device capabilities: scripted geolocation, WiFi, camera and
//! office picker.
//!
//! Each double replays a queue of scripted results. The last entry repeats
//! once the queue is down to one, so a single scripted value answers every
//! call.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use clockin_types::{GeoPoint, OfficeLocation};
use clockin_verification::{
    GeolocationProbe, NetworkProbe, ObservedNetwork, OfficeSelector, PhotoCapture, PositionFix,
    PositionOptions, VerificationError,
};

fn next_scripted<T: Clone>(queue: &RefCell<VecDeque<T>>, what: &str) -> T {
    let mut q = queue.borrow_mut();
    match q.len() {
        0 => panic!("{what}: no scripted result left"),
        1 => q[0].clone(),
        _ => q.pop_front().expect("length checked"),
    }
}

/// A geolocation probe returning scripted fixes or errors.
pub struct NullGeolocation {
    script: RefCell<VecDeque<Result<PositionFix, VerificationError>>>,
    calls: Cell<u32>,
    last_options: Cell<Option<PositionOptions>>,
}

impl NullGeolocation {
    pub fn new(script: Vec<Result<PositionFix, VerificationError>>) -> Self {
        Self {
            script: RefCell::new(script.into()),
            calls: Cell::new(0),
            last_options: Cell::new(None),
        }
    }

    /// Always report this position with 5m accuracy.
    pub fn at(lat: f64, lng: f64) -> Self {
        Self::new(vec![Ok(PositionFix {
            point: GeoPoint { lat, lng },
            accuracy_meters: 5.0,
        })])
    }

    /// Always report a point `meters` due north of `origin`.
    pub fn north_of(origin: GeoPoint, meters: f64) -> Self {
        // One degree of latitude on the resolver's sphere.
        const METERS_PER_DEGREE: f64 = 111_194.926_644_558_73;
        Self::at(origin.lat + meters / METERS_PER_DEGREE, origin.lng)
    }

    /// Always fail with `error`.
    pub fn failing(error: VerificationError) -> Self {
        Self::new(vec![Err(error)])
    }

    pub fn calls(&self) -> u32 {
        self.calls.get()
    }

    pub fn last_options(&self) -> Option<PositionOptions> {
        self.last_options.get()
    }
}

impl GeolocationProbe for NullGeolocation {
    fn current_position(&self, options: &PositionOptions) -> Result<PositionFix, VerificationError> {
        self.calls.set(self.calls.get() + 1);
        self.last_options.set(Some(*options));
        next_scripted(&self.script, "NullGeolocation")
    }
}

/// A network probe reporting a scripted association.
pub struct NullNetworkProbe {
    script: RefCell<VecDeque<Result<Option<ObservedNetwork>, VerificationError>>>,
    calls: Cell<u32>,
}

impl NullNetworkProbe {
    pub fn new(script: Vec<Result<Option<ObservedNetwork>, VerificationError>>) -> Self {
        Self {
            script: RefCell::new(script.into()),
            calls: Cell::new(0),
        }
    }

    pub fn connected(ssid: &str) -> Self {
        Self::new(vec![Ok(Some(ObservedNetwork {
            ssid: ssid.to_string(),
            bssid: None,
        }))])
    }

    pub fn connected_with_bssid(ssid: &str, bssid: &str) -> Self {
        Self::new(vec![Ok(Some(ObservedNetwork {
            ssid: ssid.to_string(),
            bssid: Some(bssid.to_string()),
        }))])
    }

    pub fn disconnected() -> Self {
        Self::new(vec![Ok(None)])
    }

    pub fn calls(&self) -> u32 {
        self.calls.get()
    }
}

impl NetworkProbe for NullNetworkProbe {
    fn current_network(&self) -> Result<Option<ObservedNetwork>, VerificationError> {
        self.calls.set(self.calls.get() + 1);
        next_scripted(&self.script, "NullNetworkProbe")
    }
}

/// A camera returning scripted frames or errors.
pub struct NullCamera {
    script: RefCell<VecDeque<Result<Vec<u8>, VerificationError>>>,
    calls: Cell<u32>,
}

impl NullCamera {
    pub fn new(script: Vec<Result<Vec<u8>, VerificationError>>) -> Self {
        Self {
            script: RefCell::new(script.into()),
            calls: Cell::new(0),
        }
    }

    /// Always capture a small fake JPEG.
    pub fn working() -> Self {
        Self::new(vec![Ok(vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10])])
    }

    /// Always fail with `CameraUnavailable`.
    pub fn unavailable() -> Self {
        Self::new(vec![Err(VerificationError::CameraUnavailable(
            "no camera stream".to_string(),
        ))])
    }

    pub fn calls(&self) -> u32 {
        self.calls.get()
    }
}

impl PhotoCapture for NullCamera {
    fn capture(&self) -> Result<Vec<u8>, VerificationError> {
        self.calls.set(self.calls.get() + 1);
        next_scripted(&self.script, "NullCamera")
    }
}

/// An office picker that always makes the same choice.
pub struct NullOfficeSelector {
    choice: Option<usize>,
    offered: RefCell<Vec<String>>,
}

impl NullOfficeSelector {
    pub fn choosing(index: usize) -> Self {
        Self {
            choice: Some(index),
            offered: RefCell::new(Vec::new()),
        }
    }

    pub fn cancelling() -> Self {
        Self {
            choice: None,
            offered: RefCell::new(Vec::new()),
        }
    }

    /// Ids of the offices offered on the last call.
    pub fn offered(&self) -> Vec<String> {
        self.offered.borrow().clone()
    }
}

impl OfficeSelector for NullOfficeSelector {
    fn select_office(&self, offices: &[OfficeLocation]) -> Option<usize> {
        *self.offered.borrow_mut() = offices.iter().map(|o| o.id.clone()).collect();
        self.choice
    }
}
