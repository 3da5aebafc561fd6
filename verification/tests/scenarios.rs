//! Check-in scenarios driven through the orchestrator with nullable devices.

use std::rc::Rc;

use clockin_nullables::{
    NullCamera, NullClock, NullGeolocation, NullNetworkProbe, NullOfficeSelector,
};
use clockin_types::{GeoPoint, LocationMethod, NetworkDescriptor, OfficeLocation, SecurityMode};
use clockin_verification::{
    Capabilities, Phase, RecoveryAction, Step, StepOutcome, VerificationConfig,
    VerificationError, VerificationEvent, VerificationOrchestrator,
};

fn arusha() -> OfficeLocation {
    OfficeLocation {
        id: "arusha".into(),
        name: "Arusha Main Office".into(),
        address: "Main Office, Arusha, Tanzania".into(),
        latitude: -3.359178,
        longitude: 36.661366,
        radius_meters: 100.0,
        networks: vec![
            NetworkDescriptor::new("Office_WiFi").with_bssid("00:11:22:33:44:55"),
            NetworkDescriptor::new("Office_Guest"),
        ],
    }
}

fn moshi() -> OfficeLocation {
    OfficeLocation {
        id: "moshi".into(),
        name: "Moshi Branch".into(),
        address: String::new(),
        latitude: -3.3348,
        longitude: 37.3404,
        radius_meters: 150.0,
        networks: vec![NetworkDescriptor::new("Moshi_Staff")],
    }
}

fn origin() -> GeoPoint {
    arusha().point()
}

struct Devices {
    geolocation: Rc<NullGeolocation>,
    network: Rc<NullNetworkProbe>,
    camera: Rc<NullCamera>,
}

impl Devices {
    fn at_distance(meters: f64) -> Self {
        Self {
            geolocation: Rc::new(NullGeolocation::north_of(origin(), meters)),
            network: Rc::new(NullNetworkProbe::connected("Office_Guest")),
            camera: Rc::new(NullCamera::working()),
        }
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::new()
            .with_geolocation(self.geolocation.clone())
            .with_network(self.network.clone())
            .with_camera(self.camera.clone())
            .with_clock(Rc::new(NullClock::new(1_792_386_000)))
    }
}

fn start(
    mode: SecurityMode,
    config: VerificationConfig,
    devices: &Devices,
) -> VerificationOrchestrator {
    VerificationOrchestrator::new(mode, config, devices.capabilities()).unwrap()
}

fn started_steps(events: &[VerificationEvent]) -> Vec<Step> {
    events
        .iter()
        .filter_map(|e| match e {
            VerificationEvent::StepStarted { step } => Some(*step),
            _ => None,
        })
        .collect()
}

#[test]
fn location_and_wifi_completes_without_photo_when_photos_disabled() {
    let devices = Devices::at_distance(50.0);
    let mut config = VerificationConfig::new(vec![arusha()]);
    config.photo_enabled = false;
    let mut orch = start(SecurityMode::LocationAndWifi, config, &devices);

    let outcome = orch.run().unwrap();
    assert_eq!(outcome.verified, vec![Step::Location, Step::Network]);
    assert!(outcome.is_fully_verified());
    assert_eq!(outcome.network.unwrap().ssid, "Office_Guest");
    let office = outcome.office.unwrap();
    assert_eq!(office.office.id, "arusha");
    assert!((office.distance_meters - 50.0).abs() < 0.5);

    assert_eq!(devices.camera.calls(), 0);
    assert_eq!(orch.progress_percent(), 100);
    let events = orch.drain_events();
    assert_eq!(started_steps(&events), vec![Step::Location, Step::Network]);
    assert!(matches!(events.last(), Some(VerificationEvent::Completed { .. })));
}

#[test]
fn photo_only_camera_failure_parks_at_photo() {
    let devices = Devices {
        camera: Rc::new(NullCamera::unavailable()),
        ..Devices::at_distance(0.0)
    };
    let mut orch = start(
        SecurityMode::PhotoOnly,
        VerificationConfig::new(vec![arusha()]),
        &devices,
    );

    let err = orch.run().unwrap_err();
    assert!(matches!(err, VerificationError::CameraUnavailable(_)));
    assert_eq!(orch.current_step(), Some(Step::Photo));
    assert_eq!(orch.progress_percent(), 0);
    assert!(!orch.is_complete());
    assert_eq!(
        orch.recovery_actions(),
        vec![RecoveryAction::Retry, RecoveryAction::Cancel]
    );
    assert_eq!(devices.geolocation.calls(), 0);
    assert_eq!(devices.network.calls(), 0);
}

#[test]
fn auto_location_without_offices_is_not_redirected_to_manual() {
    let devices = Devices::at_distance(0.0);
    let mut orch = start(
        SecurityMode::AutoLocation,
        VerificationConfig::new(Vec::new()),
        &devices,
    );

    assert_eq!(orch.run().unwrap_err(), VerificationError::NoOfficeConfigured);
    assert_eq!(
        orch.phase(),
        &Phase::Failed {
            step: Step::Location,
            error: VerificationError::NoOfficeConfigured,
        }
    );
    assert_eq!(orch.location_method(), LocationMethod::Automatic);
    assert!(orch.recovery_actions().contains(&RecoveryAction::SelectManually));
}

#[test]
fn all_security_out_of_range_reports_overshoot() {
    let devices = Devices::at_distance(150.0);
    let mut orch = start(
        SecurityMode::AllSecurity,
        VerificationConfig::new(vec![arusha()]),
        &devices,
    );

    let err = orch.run().unwrap_err();
    match &err {
        VerificationError::OutOfRange {
            office,
            distance_m,
            radius_m,
        } => {
            assert_eq!(office, "Arusha Main Office");
            assert!((distance_m - 150.0).abs() < 0.5);
            assert_eq!(*radius_m, 100.0);
        }
        other => panic!("expected OutOfRange, got {other:?}"),
    }
    assert!(err.to_string().contains("50m outside"), "{err}");

    assert_eq!(devices.network.calls(), 0);
    assert_eq!(devices.camera.calls(), 0);
    let events = orch.drain_events();
    assert_eq!(started_steps(&events), vec![Step::Location]);
}

#[test]
fn executed_steps_match_mode_table() {
    let table = [
        (SecurityMode::AutoLocation, vec![Step::Location, Step::Photo]),
        (SecurityMode::ManualLocation, vec![Step::Location, Step::Photo]),
        (SecurityMode::WifiOnly, vec![Step::Network, Step::Photo]),
        (
            SecurityMode::LocationAndWifi,
            vec![Step::Location, Step::Network, Step::Photo],
        ),
        (SecurityMode::PhotoOnly, vec![Step::Photo]),
        (
            SecurityMode::AllSecurity,
            vec![Step::Location, Step::Network, Step::Photo],
        ),
    ];

    for (mode, expected) in table {
        let devices = Devices::at_distance(10.0);
        let caps = devices
            .capabilities()
            .with_office_selector(Rc::new(NullOfficeSelector::choosing(0)));
        let mut orch =
            VerificationOrchestrator::new(mode, VerificationConfig::new(vec![arusha()]), caps)
                .unwrap();
        let outcome = orch.run().unwrap();
        assert_eq!(outcome.verified, expected, "{mode}");

        let executed: Vec<Step> = orch
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                VerificationEvent::StepVerified { outcome } => Some(outcome.step()),
                _ => None,
            })
            .collect();
        assert_eq!(executed, expected, "{mode}");
    }
}

#[test]
fn progress_rounds_per_completed_step() {
    let devices = Devices::at_distance(10.0);
    let mut orch = start(
        SecurityMode::AllSecurity,
        VerificationConfig::new(vec![arusha()]),
        &devices,
    );
    let mut seen = vec![orch.progress_percent()];
    while !orch.is_complete() {
        orch.run_current_step().unwrap();
        seen.push(orch.progress_percent());
    }
    assert_eq!(seen, vec![0, 33, 67, 100]);
}

#[test]
fn nearest_of_two_offices_supplies_the_allow_list() {
    // Standing at Moshi: the Arusha networks must not be accepted.
    let devices = Devices {
        geolocation: Rc::new(NullGeolocation::at(-3.3348, 37.3404)),
        ..Devices::at_distance(0.0)
    };
    let mut orch = start(
        SecurityMode::LocationAndWifi,
        VerificationConfig::new(vec![arusha(), moshi()]),
        &devices,
    );

    match orch.run_current_step().unwrap() {
        StepOutcome::Location(found) => assert_eq!(found.office.id, "moshi"),
        other => panic!("expected a location outcome, got {other:?}"),
    }
    assert_eq!(
        orch.run_current_step().unwrap_err(),
        VerificationError::NetworkMismatch {
            observed: Some("Office_Guest".into())
        }
    );
}

#[test]
fn wifi_only_uses_every_office_network() {
    let devices = Devices {
        network: Rc::new(NullNetworkProbe::connected("Moshi_Staff")),
        ..Devices::at_distance(0.0)
    };
    let mut orch = start(
        SecurityMode::WifiOnly,
        VerificationConfig::new(vec![arusha(), moshi()]),
        &devices,
    );
    let outcome = orch.run().unwrap();
    assert_eq!(outcome.network.unwrap().ssid, "Moshi_Staff");
    assert_eq!(devices.geolocation.calls(), 0);
}

#[test]
fn pinned_bssid_must_match() {
    let devices = Devices {
        network: Rc::new(NullNetworkProbe::connected_with_bssid(
            "Office_WiFi",
            "66:77:88:99:AA:BB",
        )),
        ..Devices::at_distance(0.0)
    };
    let mut orch = start(
        SecurityMode::WifiOnly,
        VerificationConfig::new(vec![arusha()]),
        &devices,
    );
    assert!(matches!(
        orch.run().unwrap_err(),
        VerificationError::NetworkMismatch { .. }
    ));
}

#[test]
fn retry_after_photo_failure_keeps_location() {
    let devices = Devices {
        camera: Rc::new(NullCamera::new(vec![
            Err(VerificationError::CameraUnavailable("busy".into())),
            Ok(vec![1, 2, 3]),
        ])),
        ..Devices::at_distance(30.0)
    };
    let mut orch = start(
        SecurityMode::AutoLocation,
        VerificationConfig::new(vec![arusha()]),
        &devices,
    );
    assert!(orch.run().is_err());
    assert_eq!(orch.progress_percent(), 50);

    assert!(matches!(orch.retry().unwrap(), StepOutcome::Photo(_)));
    assert!(orch.is_complete());
    assert_eq!(devices.geolocation.calls(), 1);
    assert_eq!(devices.camera.calls(), 2);
}

#[test]
fn geolocation_receives_position_options() {
    let devices = Devices::at_distance(0.0);
    let mut orch = start(
        SecurityMode::AutoLocation,
        VerificationConfig::new(vec![arusha()]),
        &devices,
    );
    orch.run_current_step().unwrap();
    let options = devices.geolocation.last_options().unwrap();
    assert!(options.high_accuracy);
    assert_eq!(options.timeout.as_secs(), 10);
    assert_eq!(options.maximum_age.as_secs(), 60);
}

#[test]
fn office_without_networks_rejects_other_offices_wifi() {
    let bare = OfficeLocation {
        id: "field".into(),
        name: "Field Site".into(),
        address: String::new(),
        latitude: 0.0,
        longitude: 0.0,
        radius_meters: 100.0,
        networks: vec![],
    };
    let devices = Devices {
        geolocation: Rc::new(NullGeolocation::at(0.0, 0.0)),
        network: Rc::new(NullNetworkProbe::connected("Moshi_Staff")),
        ..Devices::at_distance(0.0)
    };
    let mut config = VerificationConfig::new(vec![bare, moshi()]);
    config.photo_enabled = false;
    let mut orch = start(SecurityMode::AllSecurity, config, &devices);

    assert_eq!(
        orch.run().unwrap_err(),
        VerificationError::NetworkMismatch {
            observed: Some("Moshi_Staff".into())
        }
    );
    assert_eq!(orch.current_step(), Some(Step::Network));
    assert_eq!(devices.network.calls(), 1);
}
