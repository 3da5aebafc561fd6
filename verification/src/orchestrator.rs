//! Verification orchestrator: sequences the location, network and photo
//! steps required by a security mode into a single check-in attempt.
//!
//! The orchestrator is a plain state machine driven by the caller. Each step
//! returns a `Result`; success advances to the next required step, failure
//! parks the attempt in [`Phase::Failed`] until the caller retries, skips,
//! goes back or cancels. Events describing every transition are queued for
//! the caller to drain (notifications, audit, the check-in write).

use clockin_types::{LocationMethod, NetworkDescriptor, OfficeLocation, SecurityMode, Timestamp};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tracing::{debug, info, warn};

use crate::error::{Capability, RecoveryAction, VerificationError};
use crate::probe::{
    match_network, Clock, GeolocationProbe, NetworkProbe, OfficeSelector, PhotoCapture,
    PhotoEvidence, PositionFix, PositionOptions,
};
use crate::requirements::{Step, StepRequirements};
use crate::resolver::{resolve_nearest_office, OfficeMatch};
use crate::state::{Phase, VerificationStatus};

/// Static inputs of an attempt: office configuration and probe tuning.
#[derive(Clone, Debug, PartialEq)]
pub struct VerificationConfig {
    pub offices: Vec<OfficeLocation>,
    /// Global switch: when off, no mode requires a photo.
    pub photo_enabled: bool,
    pub position_options: PositionOptions,
    /// Reject fixes whose reported accuracy is worse than this.
    pub max_accuracy_meters: Option<f64>,
}

impl VerificationConfig {
    pub fn new(offices: Vec<OfficeLocation>) -> Self {
        Self {
            offices,
            photo_enabled: true,
            position_options: PositionOptions::default(),
            max_accuracy_meters: None,
        }
    }
}

/// Device capabilities injected at construction. A `None` capability makes
/// the step needing it fail with [`VerificationError::CapabilityMissing`].
#[derive(Clone, Default)]
pub struct Capabilities {
    pub geolocation: Option<Rc<dyn GeolocationProbe>>,
    pub network: Option<Rc<dyn NetworkProbe>>,
    pub camera: Option<Rc<dyn PhotoCapture>>,
    pub office_selector: Option<Rc<dyn OfficeSelector>>,
    /// Falls back to the system clock.
    pub clock: Option<Rc<dyn Clock>>,
}

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_geolocation(mut self, probe: Rc<dyn GeolocationProbe>) -> Self {
        self.geolocation = Some(probe);
        self
    }

    pub fn with_network(mut self, probe: Rc<dyn NetworkProbe>) -> Self {
        self.network = Some(probe);
        self
    }

    pub fn with_camera(mut self, camera: Rc<dyn PhotoCapture>) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn with_office_selector(mut self, selector: Rc<dyn OfficeSelector>) -> Self {
        self.office_selector = Some(selector);
        self
    }

    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }
}

/// What a successful step produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StepOutcome {
    /// The office the employee was placed at.
    Location(OfficeMatch),
    /// The allow-list entry that matched.
    Network(NetworkDescriptor),
    Photo(PhotoEvidence),
}

impl StepOutcome {
    pub fn step(&self) -> Step {
        match self {
            Self::Location(_) => Step::Location,
            Self::Network(_) => Step::Network,
            Self::Photo(_) => Step::Photo,
        }
    }
}

/// The completion payload handed to the caller, which persists the check-in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub mode: SecurityMode,
    /// Required steps that succeeded, in execution order.
    pub verified: Vec<Step>,
    /// Required steps bypassed with [`VerificationOrchestrator::skip`].
    pub skipped: Vec<Step>,
    pub office: Option<OfficeMatch>,
    pub network: Option<NetworkDescriptor>,
    pub photo: Option<PhotoEvidence>,
    pub started_at: Timestamp,
    pub completed_at: Timestamp,
}

impl VerificationOutcome {
    /// Every required step succeeded; none was skipped.
    pub fn is_fully_verified(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Events emitted by the orchestrator for the caller to process.
#[derive(Clone, Debug, PartialEq)]
pub enum VerificationEvent {
    StepStarted { step: Step },
    StepVerified { outcome: StepOutcome },
    StepFailed { step: Step, error: VerificationError },
    StepSkipped { step: Step },
    SteppedBack { from: Step, to: Step },
    ModeChanged { mode: SecurityMode },
    Completed { outcome: VerificationOutcome },
    Cancelled { at: Option<Step> },
}

/// Drives one check-in attempt through its required steps.
pub struct VerificationOrchestrator {
    mode: SecurityMode,
    requirements: StepRequirements,
    location_method: LocationMethod,
    config: VerificationConfig,
    capabilities: Capabilities,
    status: VerificationStatus,
    skipped: Vec<Step>,
    phase: Phase,
    office: Option<OfficeMatch>,
    network: Option<NetworkDescriptor>,
    photo: Option<PhotoEvidence>,
    started_at: Timestamp,
    outcome: Option<VerificationOutcome>,
    pending_events: Vec<VerificationEvent>,
}

impl VerificationOrchestrator {
    /// Start an attempt at the first step `mode` requires.
    pub fn new(
        mode: SecurityMode,
        config: VerificationConfig,
        capabilities: Capabilities,
    ) -> Result<Self, VerificationError> {
        let requirements = StepRequirements::for_mode(mode, config.photo_enabled);
        let first = requirements
            .first()
            .ok_or(VerificationError::NoRequiredSteps)?;

        let mut orch = Self {
            mode,
            requirements,
            location_method: mode.location_method(),
            config,
            capabilities,
            status: VerificationStatus::default(),
            skipped: Vec::new(),
            phase: Phase::AtStep(first),
            office: None,
            network: None,
            photo: None,
            started_at: Timestamp::EPOCH,
            outcome: None,
            pending_events: Vec::new(),
        };
        orch.started_at = orch.now();

        info!(
            mode = %mode,
            steps = ?requirements.steps(),
            "verification started"
        );
        orch.pending_events.push(VerificationEvent::StepStarted { step: first });
        Ok(orch)
    }

    // ── Driving ─────────────────────────────────────────────────────────

    /// Run the current step once.
    ///
    /// On success the step is marked verified and the attempt advances to the
    /// next required step, or completes. On failure the attempt stays on the
    /// step in [`Phase::Failed`].
    pub fn run_current_step(&mut self) -> Result<StepOutcome, VerificationError> {
        let step = match &self.phase {
            Phase::AtStep(step) => *step,
            other => {
                return Err(VerificationError::InvalidTransition {
                    action: "run a step",
                    state: other.describe(),
                })
            }
        };

        match self.execute(step) {
            Ok(outcome) => {
                self.record_success(&outcome);
                self.advance_from(step);
                Ok(outcome)
            }
            Err(error) => {
                warn!(step = %step, mode = %self.mode, "verification step failed: {error}");
                self.status.set(step, false);
                self.phase = Phase::Failed {
                    step,
                    error: error.clone(),
                };
                self.pending_events.push(VerificationEvent::StepFailed {
                    step,
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    /// Run required steps in order until the attempt completes or a step fails.
    pub fn run(&mut self) -> Result<VerificationOutcome, VerificationError> {
        loop {
            match &self.phase {
                Phase::Complete => {
                    return self.outcome.clone().ok_or_else(|| {
                        VerificationError::InvalidTransition {
                            action: "read the outcome",
                            state: "no outcome was recorded".to_string(),
                        }
                    })
                }
                Phase::Failed { error, .. } => return Err(error.clone()),
                Phase::AtStep(_) => {
                    self.run_current_step()?;
                }
            }
        }
    }

    /// Run the failed step again. Progress on earlier steps is kept.
    pub fn retry(&mut self) -> Result<StepOutcome, VerificationError> {
        let step = match &self.phase {
            Phase::Failed { step, .. } => *step,
            other => {
                return Err(VerificationError::InvalidTransition {
                    action: "retry",
                    state: other.describe(),
                })
            }
        };
        info!(step = %step, "retrying verification step");
        self.enter(step);
        self.run_current_step()
    }

    /// Bypass the current step without verifying it.
    ///
    /// The step stays unverified: progress does not move and the outcome
    /// lists it under `skipped`. Returns the next step, `None` on completion.
    pub fn skip(&mut self) -> Result<Option<Step>, VerificationError> {
        let step = self.active_step("skip")?;
        warn!(step = %step, mode = %self.mode, "verification step skipped");
        self.status.set(step, false);
        if !self.skipped.contains(&step) {
            self.skipped.push(step);
        }
        self.pending_events.push(VerificationEvent::StepSkipped { step });
        self.advance_from(step);
        Ok(self.phase.step())
    }

    /// Return to the previous required step, clearing both it and the
    /// current step.
    pub fn go_back(&mut self) -> Result<Step, VerificationError> {
        let step = self.active_step("go back")?;
        let previous = self
            .requirements
            .before(step)
            .ok_or_else(|| VerificationError::InvalidTransition {
                action: "go back",
                state: "at the first step".to_string(),
            })?;

        for s in [step, previous] {
            self.clear_step(s);
        }
        debug!(from = %step, to = %previous, "stepped back");
        self.pending_events.push(VerificationEvent::SteppedBack {
            from: step,
            to: previous,
        });
        self.phase = Phase::AtStep(previous);
        Ok(previous)
    }

    /// Switch the location step of this attempt to manual office selection.
    ///
    /// Only valid while the location step is current and automatic. Never
    /// invoked implicitly: a failed automatic lookup stays failed until the
    /// employee chooses this.
    pub fn use_manual_location(&mut self) -> Result<(), VerificationError> {
        let step = self.active_step("select the office manually")?;
        if step != Step::Location || self.location_method == LocationMethod::Manual {
            return Err(VerificationError::InvalidTransition {
                action: "select the office manually",
                state: self.phase.describe(),
            });
        }
        info!("falling back to manual office selection");
        self.location_method = LocationMethod::Manual;
        self.enter(Step::Location);
        Ok(())
    }

    /// Switch to another security mode, restarting the attempt.
    pub fn change_mode(&mut self, mode: SecurityMode) -> Result<(), VerificationError> {
        if self.phase == Phase::Complete {
            return Err(VerificationError::InvalidTransition {
                action: "change the security mode",
                state: self.phase.describe(),
            });
        }
        let requirements = StepRequirements::for_mode(mode, self.config.photo_enabled);
        let first = requirements
            .first()
            .ok_or(VerificationError::NoRequiredSteps)?;

        info!(from = %self.mode, to = %mode, "security mode changed");
        self.mode = mode;
        self.requirements = requirements;
        self.location_method = mode.location_method();
        self.status = VerificationStatus::default();
        self.skipped.clear();
        self.office = None;
        self.network = None;
        self.photo = None;
        self.pending_events.push(VerificationEvent::ModeChanged { mode });
        self.enter(first);
        Ok(())
    }

    /// Abandon the attempt. Returns every event not yet drained.
    pub fn cancel(mut self) -> Vec<VerificationEvent> {
        let at = self.phase.step();
        info!(at = ?at, "verification cancelled");
        self.pending_events.push(VerificationEvent::Cancelled { at });
        self.pending_events
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn mode(&self) -> SecurityMode {
        self.mode
    }

    pub fn requirements(&self) -> &StepRequirements {
        &self.requirements
    }

    pub fn location_method(&self) -> LocationMethod {
        self.location_method
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// The step being run or that failed; `None` once complete.
    pub fn current_step(&self) -> Option<Step> {
        self.phase.step()
    }

    pub fn status(&self) -> &VerificationStatus {
        &self.status
    }

    pub fn skipped(&self) -> &[Step] {
        &self.skipped
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    pub fn progress_percent(&self) -> u8 {
        self.status.progress_percent(&self.requirements)
    }

    pub fn detected_office(&self) -> Option<&OfficeMatch> {
        self.office.as_ref()
    }

    pub fn outcome(&self) -> Option<&VerificationOutcome> {
        self.outcome.as_ref()
    }

    pub fn last_error(&self) -> Option<&VerificationError> {
        match &self.phase {
            Phase::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// What the employee may do about the current failure.
    pub fn recovery_actions(&self) -> Vec<RecoveryAction> {
        match &self.phase {
            Phase::Failed { step, error } => error.recovery_actions(
                *step,
                self.location_method == LocationMethod::Automatic,
            ),
            _ => Vec::new(),
        }
    }

    /// Drain pending events for the caller to process.
    pub fn drain_events(&mut self) -> Vec<VerificationEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ── Steps ───────────────────────────────────────────────────────────

    fn execute(&self, step: Step) -> Result<StepOutcome, VerificationError> {
        match step {
            Step::Location => self.verify_location().map(StepOutcome::Location),
            Step::Network => self.verify_network().map(StepOutcome::Network),
            Step::Photo => self.capture_photo().map(StepOutcome::Photo),
        }
    }

    fn verify_location(&self) -> Result<OfficeMatch, VerificationError> {
        let offices = &self.config.offices;
        match self.location_method {
            LocationMethod::Automatic => {
                let fix = self.read_position()?;
                let found = resolve_nearest_office(fix.point, offices)?;
                debug!(
                    office = %found.office.name,
                    distance_m = found.distance_meters,
                    "nearest office resolved"
                );
                found.into_in_range()
            }
            LocationMethod::Manual => {
                if offices.is_empty() {
                    return Err(VerificationError::NoOfficeConfigured);
                }
                let selector = self
                    .capabilities
                    .office_selector
                    .as_ref()
                    .ok_or(VerificationError::CapabilityMissing(
                        Capability::OfficeSelection,
                    ))?;
                let office = selector
                    .select_office(offices)
                    .and_then(|i| offices.get(i))
                    .ok_or(VerificationError::SelectionCancelled)?;
                let fix = self.read_position()?;
                OfficeMatch::measure(fix.point, office).into_in_range()
            }
        }
    }

    fn read_position(&self) -> Result<PositionFix, VerificationError> {
        let probe = self
            .capabilities
            .geolocation
            .as_ref()
            .ok_or(VerificationError::CapabilityMissing(Capability::Geolocation))?;
        let fix = probe.current_position(&self.config.position_options)?;
        clockin_types::GeoPoint::new(fix.point.lat, fix.point.lng)?;
        debug!(point = %fix.point, accuracy_m = fix.accuracy_meters, "position fix");

        if let Some(required) = self.config.max_accuracy_meters {
            if fix.accuracy_meters > required {
                return Err(VerificationError::AccuracyTooLow {
                    accuracy_m: fix.accuracy_meters,
                    required_m: required,
                });
            }
        }
        Ok(fix)
    }

    /// Networks of the office the location step settled on, or of every
    /// configured office when no location step ran. A settled office with
    /// no networks accepts none.
    fn allow_list(&self) -> Vec<NetworkDescriptor> {
        match &self.office {
            Some(found) => found.office.networks.clone(),
            None => self
                .config
                .offices
                .iter()
                .flat_map(|o| o.networks.iter().cloned())
                .collect(),
        }
    }

    fn verify_network(&self) -> Result<NetworkDescriptor, VerificationError> {
        let probe = self
            .capabilities
            .network
            .as_ref()
            .ok_or(VerificationError::CapabilityMissing(Capability::Network))?;
        let allow_list = self.allow_list();
        let observed = probe
            .current_network()?
            .ok_or(VerificationError::NetworkMismatch { observed: None })?;
        debug!(ssid = %observed.ssid, bssid = ?observed.bssid, "network observed");

        match_network(&observed, &allow_list)
            .cloned()
            .ok_or(VerificationError::NetworkMismatch {
                observed: Some(observed.ssid),
            })
    }

    fn capture_photo(&self) -> Result<PhotoEvidence, VerificationError> {
        let camera = self
            .capabilities
            .camera
            .as_ref()
            .ok_or(VerificationError::CapabilityMissing(Capability::Camera))?;
        let payload = camera.capture()?;
        if payload.is_empty() {
            return Err(VerificationError::CameraUnavailable(
                "captured frame is empty".to_string(),
            ));
        }
        Ok(PhotoEvidence::new(payload, self.now()))
    }

    // ── Transitions ─────────────────────────────────────────────────────

    fn active_step(&self, action: &'static str) -> Result<Step, VerificationError> {
        self.phase
            .step()
            .ok_or_else(|| VerificationError::InvalidTransition {
                action,
                state: self.phase.describe(),
            })
    }

    fn enter(&mut self, step: Step) {
        self.phase = Phase::AtStep(step);
        self.pending_events.push(VerificationEvent::StepStarted { step });
    }

    fn record_success(&mut self, outcome: &StepOutcome) {
        let step = outcome.step();
        self.status.set(step, true);
        self.skipped.retain(|s| *s != step);
        match outcome {
            StepOutcome::Location(found) => {
                info!(
                    office = %found.office.name,
                    distance_m = found.distance_meters,
                    "location verified"
                );
                self.office = Some(found.clone());
            }
            StepOutcome::Network(network) => {
                info!(ssid = %network.ssid, "network verified");
                self.network = Some(network.clone());
            }
            StepOutcome::Photo(photo) => {
                info!(digest = %photo.digest, bytes = photo.len(), "photo captured");
                self.photo = Some(photo.clone());
            }
        }
        self.pending_events.push(VerificationEvent::StepVerified {
            outcome: outcome.clone(),
        });
    }

    fn clear_step(&mut self, step: Step) {
        self.status.set(step, false);
        self.skipped.retain(|s| *s != step);
        match step {
            Step::Location => self.office = None,
            Step::Network => self.network = None,
            Step::Photo => self.photo = None,
        }
    }

    fn advance_from(&mut self, step: Step) {
        match self.requirements.after(step) {
            Some(next) => self.enter(next),
            None => self.complete(),
        }
    }

    fn complete(&mut self) {
        let verified: Vec<Step> = self
            .requirements
            .steps()
            .into_iter()
            .filter(|s| self.status.get(*s))
            .collect();
        let outcome = VerificationOutcome {
            mode: self.mode,
            verified,
            skipped: self.skipped.clone(),
            office: self.office.clone(),
            network: self.network.clone(),
            photo: self.photo.clone(),
            started_at: self.started_at,
            completed_at: self.now(),
        };
        info!(
            mode = %self.mode,
            fully_verified = outcome.is_fully_verified(),
            "all verifications complete"
        );
        self.phase = Phase::Complete;
        self.outcome = Some(outcome.clone());
        self.pending_events.push(VerificationEvent::Completed { outcome });
    }

    fn now(&self) -> Timestamp {
        self.capabilities
            .clock
            .as_ref()
            .map(|c| c.now())
            .unwrap_or_else(Timestamp::now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ObservedNetwork;
    use clockin_types::GeoPoint;
    use std::cell::Cell;

    struct FixedPosition(Result<PositionFix, VerificationError>);

    impl GeolocationProbe for FixedPosition {
        fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<PositionFix, VerificationError> {
            self.0.clone()
        }
    }

    struct FixedNetwork(Option<ObservedNetwork>);

    impl NetworkProbe for FixedNetwork {
        fn current_network(&self) -> Result<Option<ObservedNetwork>, VerificationError> {
            Ok(self.0.clone())
        }
    }

    /// Fails until `fail_times` captures have been attempted.
    struct FlakyCamera {
        fail_times: u32,
        attempts: Cell<u32>,
    }

    impl PhotoCapture for FlakyCamera {
        fn capture(&self) -> Result<Vec<u8>, VerificationError> {
            let n = self.attempts.get();
            self.attempts.set(n + 1);
            if n < self.fail_times {
                Err(VerificationError::CameraUnavailable("busy".into()))
            } else {
                Ok(vec![0xFF, 0xD8, 0xFF])
            }
        }
    }

    struct Pick(Option<usize>);

    impl OfficeSelector for Pick {
        fn select_office(&self, _offices: &[OfficeLocation]) -> Option<usize> {
            self.0
        }
    }

    struct FrozenClock(u64);

    impl Clock for FrozenClock {
        fn now(&self) -> Timestamp {
            Timestamp::new(self.0)
        }
    }

    fn hq() -> OfficeLocation {
        OfficeLocation {
            id: "hq".into(),
            name: "HQ".into(),
            address: String::new(),
            latitude: 0.0,
            longitude: 0.0,
            radius_meters: 100.0,
            networks: vec![NetworkDescriptor::new("Office_WiFi")],
        }
    }

    fn fix_north_of_hq(meters: f64) -> PositionFix {
        PositionFix {
            point: GeoPoint::new(meters / 111_195.0, 0.0).unwrap(),
            accuracy_meters: 10.0,
        }
    }

    fn caps(meters: f64, ssid: Option<&str>, camera_failures: u32) -> Capabilities {
        Capabilities::new()
            .with_geolocation(Rc::new(FixedPosition(Ok(fix_north_of_hq(meters)))))
            .with_network(Rc::new(FixedNetwork(ssid.map(|s| ObservedNetwork {
                ssid: s.to_string(),
                bssid: None,
            }))))
            .with_camera(Rc::new(FlakyCamera {
                fail_times: camera_failures,
                attempts: Cell::new(0),
            }))
            .with_clock(Rc::new(FrozenClock(1_000)))
    }

    fn orchestrator(mode: SecurityMode, capabilities: Capabilities) -> VerificationOrchestrator {
        VerificationOrchestrator::new(mode, VerificationConfig::new(vec![hq()]), capabilities)
            .unwrap()
    }

    #[test]
    fn initial_step_is_first_required() {
        let caps = caps(10.0, Some("Office_WiFi"), 0);
        assert_eq!(
            orchestrator(SecurityMode::WifiOnly, caps.clone()).current_step(),
            Some(Step::Network)
        );
        assert_eq!(
            orchestrator(SecurityMode::PhotoOnly, caps.clone()).current_step(),
            Some(Step::Photo)
        );
        assert_eq!(
            orchestrator(SecurityMode::AutoLocation, caps).current_step(),
            Some(Step::Location)
        );
    }

    #[test]
    fn no_required_steps_is_rejected() {
        let mut config = VerificationConfig::new(vec![hq()]);
        config.photo_enabled = false;
        let result =
            VerificationOrchestrator::new(SecurityMode::PhotoOnly, config, Capabilities::new());
        assert!(matches!(result, Err(VerificationError::NoRequiredSteps)));
    }

    #[test]
    fn full_run_completes_with_evidence() {
        let mut orch = orchestrator(SecurityMode::AllSecurity, caps(20.0, Some("Office_WiFi"), 0));
        let outcome = orch.run().unwrap();
        assert_eq!(outcome.verified, vec![Step::Location, Step::Network, Step::Photo]);
        assert!(outcome.is_fully_verified());
        assert_eq!(outcome.office.as_ref().unwrap().office.id, "hq");
        assert_eq!(outcome.network.as_ref().unwrap().ssid, "Office_WiFi");
        assert_eq!(outcome.photo.as_ref().unwrap().captured_at, Timestamp::new(1_000));
        assert_eq!(orch.progress_percent(), 100);
        assert!(orch.is_complete());
    }

    #[test]
    fn retry_redoes_only_the_failed_step() {
        let mut orch = orchestrator(SecurityMode::AutoLocation, caps(20.0, None, 1));
        let err = orch.run().unwrap_err();
        assert!(matches!(err, VerificationError::CameraUnavailable(_)));
        assert_eq!(orch.current_step(), Some(Step::Photo));
        assert!(orch.status().location);
        assert_eq!(orch.progress_percent(), 50);

        let outcome = orch.retry().unwrap();
        assert_eq!(outcome.step(), Step::Photo);
        assert!(orch.is_complete());
        assert_eq!(orch.progress_percent(), 100);
    }

    #[test]
    fn running_a_failed_step_requires_retry() {
        let mut orch = orchestrator(SecurityMode::PhotoOnly, caps(0.0, None, 5));
        assert!(orch.run_current_step().is_err());
        assert!(matches!(
            orch.run_current_step(),
            Err(VerificationError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn retry_without_failure_is_invalid() {
        let mut orch = orchestrator(SecurityMode::PhotoOnly, caps(0.0, None, 0));
        assert!(matches!(
            orch.retry(),
            Err(VerificationError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn skip_completes_without_raising_progress() {
        let mut orch = orchestrator(SecurityMode::PhotoOnly, caps(0.0, None, 5));
        let _ = orch.run_current_step();
        assert_eq!(orch.skip().unwrap(), None);
        assert!(orch.is_complete());
        assert_eq!(orch.progress_percent(), 0);
        let outcome = orch.outcome().unwrap();
        assert!(!outcome.is_fully_verified());
        assert_eq!(outcome.skipped, vec![Step::Photo]);
        assert!(outcome.verified.is_empty());
    }

    #[test]
    fn go_back_clears_previous_and_current() {
        let mut orch = orchestrator(SecurityMode::LocationAndWifi, caps(20.0, Some("Nope"), 0));
        orch.run_current_step().unwrap();
        assert!(orch.run_current_step().is_err());
        assert_eq!(orch.go_back().unwrap(), Step::Location);
        assert_eq!(orch.current_step(), Some(Step::Location));
        assert_eq!(*orch.status(), VerificationStatus::default());
        assert!(orch.detected_office().is_none());
        assert!(matches!(
            orch.go_back(),
            Err(VerificationError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn manual_location_uses_selected_office() {
        let far = OfficeLocation {
            id: "far".into(),
            name: "Far".into(),
            latitude: 10.0,
            ..hq()
        };
        let capabilities = caps(30.0, None, 0).with_office_selector(Rc::new(Pick(Some(1))));
        let mut orch = VerificationOrchestrator::new(
            SecurityMode::ManualLocation,
            VerificationConfig::new(vec![far, hq()]),
            capabilities,
        )
        .unwrap();
        let outcome = orch.run_current_step().unwrap();
        match outcome {
            StepOutcome::Location(found) => assert_eq!(found.office.id, "hq"),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn manual_selection_cancelled() {
        let capabilities = caps(30.0, None, 0).with_office_selector(Rc::new(Pick(None)));
        let mut orch = orchestrator(SecurityMode::ManualLocation, capabilities);
        assert_eq!(
            orch.run_current_step(),
            Err(VerificationError::SelectionCancelled)
        );
    }

    #[test]
    fn switching_to_manual_after_automatic_failure() {
        let capabilities = Capabilities::new()
            .with_geolocation(Rc::new(FixedPosition(Err(VerificationError::Timeout))))
            .with_office_selector(Rc::new(Pick(Some(0))));
        let mut orch = orchestrator(SecurityMode::AutoLocation, capabilities);
        assert_eq!(orch.run_current_step(), Err(VerificationError::Timeout));
        assert!(orch
            .recovery_actions()
            .contains(&RecoveryAction::SelectManually));

        orch.use_manual_location().unwrap();
        assert_eq!(orch.location_method(), LocationMethod::Manual);
        assert_eq!(orch.phase(), &Phase::AtStep(Step::Location));
        assert!(orch.use_manual_location().is_err());
    }

    #[test]
    fn accuracy_gate_rejects_coarse_fix() {
        let mut config = VerificationConfig::new(vec![hq()]);
        config.max_accuracy_meters = Some(5.0);
        let mut orch = VerificationOrchestrator::new(
            SecurityMode::AutoLocation,
            config,
            caps(10.0, None, 0),
        )
        .unwrap();
        assert!(matches!(
            orch.run_current_step(),
            Err(VerificationError::AccuracyTooLow { .. })
        ));
    }

    #[test]
    fn missing_capability_fails_the_step() {
        let mut orch = orchestrator(SecurityMode::WifiOnly, Capabilities::new());
        assert_eq!(
            orch.run_current_step(),
            Err(VerificationError::CapabilityMissing(Capability::Network))
        );
    }

    #[test]
    fn change_mode_resets_progress() {
        let mut orch = orchestrator(SecurityMode::AutoLocation, caps(20.0, Some("Office_WiFi"), 0));
        orch.run_current_step().unwrap();
        assert_eq!(orch.progress_percent(), 50);
        orch.change_mode(SecurityMode::WifiOnly).unwrap();
        assert_eq!(orch.current_step(), Some(Step::Network));
        assert_eq!(orch.progress_percent(), 0);
        assert!(orch.detected_office().is_none());
        let events = orch.drain_events();
        assert!(events.contains(&VerificationEvent::ModeChanged {
            mode: SecurityMode::WifiOnly
        }));
    }

    #[test]
    fn cancel_reports_current_step() {
        let mut orch = orchestrator(SecurityMode::PhotoOnly, caps(0.0, None, 0));
        orch.drain_events();
        let events = orch.cancel();
        assert_eq!(
            events,
            vec![VerificationEvent::Cancelled {
                at: Some(Step::Photo)
            }]
        );
    }
}
