//! Multi-factor attendance verification.
//!
//! A check-in attempt proves presence with up to three factors, always in
//! this order:
//! 1. **Location**: a GPS fix resolved to the nearest configured office (or an
//!    office the employee picks) and checked against its radius.
//! 2. **Network**: the device's WiFi association matched against the office
//!    allow-list.
//! 3. **Photo**: a captured still kept as evidence.
//!
//! The active [`SecurityMode`](clockin_types::SecurityMode) decides which
//! factors are required. Device access goes through the traits in [`probe`],
//! so the same orchestrator runs against a browser bridge, a terminal or the
//! nullables used in tests.

pub mod error;
pub mod orchestrator;
pub mod probe;
pub mod requirements;
pub mod resolver;
pub mod state;

pub use error::{Capability, RecoveryAction, VerificationError};
pub use orchestrator::{
    Capabilities, StepOutcome, VerificationConfig, VerificationEvent, VerificationOrchestrator,
    VerificationOutcome,
};
pub use probe::{
    Clock, GeolocationProbe, NetworkProbe, ObservedNetwork, OfficeSelector, PhotoCapture,
    PhotoEvidence, PositionFix, PositionOptions, SystemClock,
};
pub use requirements::{Step, StepRequirements};
pub use resolver::{haversine_distance, resolve_nearest_office, OfficeMatch, EARTH_RADIUS_METERS};
pub use state::{Phase, VerificationStatus};
