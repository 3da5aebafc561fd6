#![no_main]

use libfuzzer_sys::fuzz_target;

use clockin_attendance::AttendanceSettings;

// Arbitrary settings text must parse or fail cleanly, and whatever parses
// must validate and convert without panicking.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(settings) = AttendanceSettings::from_toml_str(text) else {
        return;
    };
    let _ = settings.validate();
    let _ = settings.verification_config();
    let _ = settings.shift_hours();
    let _ = settings.late_after();
    if let Ok(again) = settings.to_toml_string() {
        let _ = AttendanceSettings::from_toml_str(&again);
    }
});
