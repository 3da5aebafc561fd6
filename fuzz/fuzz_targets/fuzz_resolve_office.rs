#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use clockin_types::{GeoPoint, OfficeLocation};
use clockin_verification::{haversine_distance, resolve_nearest_office};

#[derive(Debug, Arbitrary)]
struct Input {
    lat: f64,
    lng: f64,
    offices: Vec<(f64, f64, f64)>,
}

// The resolver never panics, and any office it returns is the nearest valid one.
fuzz_target!(|input: Input| {
    let offices: Vec<OfficeLocation> = input
        .offices
        .iter()
        .take(64)
        .enumerate()
        .map(|(i, &(lat, lng, radius))| OfficeLocation {
            id: i.to_string(),
            name: format!("office {i}"),
            address: String::new(),
            latitude: lat,
            longitude: lng,
            radius_meters: radius,
            networks: Vec::new(),
        })
        .collect();

    let point = GeoPoint {
        lat: input.lat,
        lng: input.lng,
    };
    let Ok(found) = resolve_nearest_office(point, &offices) else {
        return;
    };
    assert!(found.office.validate().is_ok(), "a malformed office was chosen");
    for office in offices.iter().filter(|o| o.validate().is_ok()) {
        let d = haversine_distance(point, office.point());
        assert!(!(d < found.distance_meters), "a nearer office was skipped");
    }
});
