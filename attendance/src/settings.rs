//! Attendance configuration with TOML file support.
//!
//! Every field has a serde default, so an empty file yields the stock
//! configuration (which still needs at least one office to validate).

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, NaiveTime};
use clockin_store::{OfficeDirectory, StoreError};
use clockin_types::{GeoPoint, NetworkDescriptor, OfficeLocation, SecurityMode, Timestamp};
use clockin_verification::{PositionOptions, StepRequirements, VerificationConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::AttendanceError;

/// Smallest radius or GPS accuracy an administrator may configure, in meters.
pub const MIN_RADIUS_METERS: f64 = 10.0;

/// Longest allowed grace period, in minutes.
pub const MAX_GRACE_PERIOD_MINUTES: u32 = 60;

const TIME_FORMAT: &str = "%H:%M";

/// An office as written in the settings file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OfficeConfig {
    /// Stable identifier; derived from the name when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    /// Check-in radius in meters; the global `check_in_radius` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default)]
    pub networks: Vec<NetworkDescriptor>,
}

impl OfficeConfig {
    pub fn id(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => slug(&self.name),
        }
    }
}

fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}

/// The administrator's attendance configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether employees may pick their own security mode.
    #[serde(default = "default_true")]
    pub allow_employee_choice: bool,

    /// Modes employees may choose from.
    #[serde(default = "default_available_modes")]
    pub available_security_modes: Vec<SecurityMode>,

    /// Mode used when the employee has not chosen (or may not choose).
    #[serde(default = "default_security_mode")]
    pub default_security_mode: SecurityMode,

    /// Global photo switch.
    #[serde(default = "default_true")]
    pub require_photo: bool,

    /// Worst acceptable GPS accuracy in meters.
    #[serde(default = "default_gps_accuracy")]
    pub gps_accuracy: f64,

    /// Radius for offices that do not set their own, in meters.
    #[serde(default = "default_check_in_radius")]
    pub check_in_radius: f64,

    /// Start of the working day, `HH:MM` local time.
    #[serde(default = "default_check_in_time")]
    pub check_in_time: String,

    /// End of the working day, `HH:MM` local time.
    #[serde(default = "default_check_out_time")]
    pub check_out_time: String,

    /// Minutes after `check_in_time` before a check-in counts as late.
    #[serde(default = "default_grace_period")]
    pub grace_period: u32,

    /// Offset of office local time from UTC, in minutes.
    #[serde(default)]
    pub utc_offset_minutes: i32,

    /// Accept check-ins whose verification skipped required steps.
    #[serde(default)]
    pub accept_skipped_steps: bool,

    #[serde(default)]
    pub offices: Vec<OfficeConfig>,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_true() -> bool {
    true
}

fn default_available_modes() -> Vec<SecurityMode> {
    vec![
        SecurityMode::AutoLocation,
        SecurityMode::ManualLocation,
        SecurityMode::WifiOnly,
    ]
}

fn default_security_mode() -> SecurityMode {
    SecurityMode::AutoLocation
}

fn default_gps_accuracy() -> f64 {
    50.0
}

fn default_check_in_radius() -> f64 {
    100.0
}

fn default_check_in_time() -> String {
    "08:00".to_string()
}

fn default_check_out_time() -> String {
    "17:00".to_string()
}

fn default_grace_period() -> u32 {
    15
}

// ── Impl ───────────────────────────────────────────────────────────────

impl AttendanceSettings {
    /// Load settings from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, AttendanceError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AttendanceError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse settings from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, AttendanceError> {
        toml::from_str(s).map_err(|e| AttendanceError::Config(e.to_string()))
    }

    /// Serialize the settings to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, AttendanceError> {
        toml::to_string_pretty(self).map_err(|e| AttendanceError::Config(e.to_string()))
    }

    /// Check every rule an administrator must satisfy before saving.
    ///
    /// Disabled settings are always valid. All problems are reported at once.
    pub fn validate(&self) -> Result<(), AttendanceError> {
        if !self.enabled {
            return Ok(());
        }

        let mut errors = Vec::new();

        if !(self.check_in_radius >= MIN_RADIUS_METERS) {
            errors.push(format!(
                "Check-in radius must be at least {MIN_RADIUS_METERS} meters"
            ));
        }
        if !(self.gps_accuracy >= MIN_RADIUS_METERS) {
            errors.push(format!(
                "GPS accuracy must be at least {MIN_RADIUS_METERS} meters"
            ));
        }
        if self.grace_period > MAX_GRACE_PERIOD_MINUTES {
            errors.push(format!(
                "Grace period must be between 0 and {MAX_GRACE_PERIOD_MINUTES} minutes"
            ));
        }
        if !(-14 * 60..=14 * 60).contains(&self.utc_offset_minutes) {
            errors.push("UTC offset must be within ±14 hours".to_string());
        }

        match (self.check_in_time(), self.check_out_time()) {
            (Ok(start), Ok(end)) if end <= start => {
                errors.push("Check-out time must be after check-in time".to_string())
            }
            (start, end) => {
                for (label, parsed) in [("Check-in", start), ("Check-out", end)] {
                    if let Err(e) = parsed {
                        errors.push(format!("{label} time: {e}"));
                    }
                }
            }
        }

        if self.offices.is_empty() {
            errors.push("At least one office location must be configured".to_string());
        }
        if self.allow_employee_choice && self.available_security_modes.is_empty() {
            errors.push("Please select at least one security mode for employees".to_string());
        }

        for mode in self.offered_modes() {
            if StepRequirements::for_mode(mode, self.require_photo).count() == 0 {
                errors.push(format!(
                    "Security mode {} requires no verification while photos are disabled",
                    mode.display_name()
                ));
            }
        }

        for (index, office) in self.offices.iter().enumerate() {
            let n = index + 1;
            if office.name.trim().is_empty() {
                errors.push(format!("Office {n}: Name is required"));
            }
            if GeoPoint::new(office.lat, office.lng).is_err() {
                errors.push(format!("Office {n}: Coordinates are out of range"));
            }
            if let Some(radius) = office.radius {
                if !(radius >= MIN_RADIUS_METERS) {
                    errors.push(format!(
                        "Office {n}: Radius must be at least {MIN_RADIUS_METERS} meters"
                    ));
                }
            }
            if office.networks.is_empty() {
                errors.push(format!(
                    "Office {n}: At least one WiFi network must be configured"
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AttendanceError::InvalidSettings(errors))
        }
    }

    /// Modes an employee can end up in: the choices plus the default.
    pub fn offered_modes(&self) -> Vec<SecurityMode> {
        let mut modes = if self.allow_employee_choice {
            self.available_security_modes.clone()
        } else {
            Vec::new()
        };
        if !modes.contains(&self.default_security_mode) {
            modes.push(self.default_security_mode);
        }
        modes
    }

    /// Offices with their effective radius filled in.
    pub fn office_locations(&self) -> Vec<OfficeLocation> {
        self.offices
            .iter()
            .map(|o| OfficeLocation {
                id: o.id(),
                name: o.name.clone(),
                address: o.address.clone(),
                latitude: o.lat,
                longitude: o.lng,
                radius_meters: o.radius.unwrap_or(self.check_in_radius),
                networks: o.networks.clone(),
            })
            .collect()
    }

    pub fn verification_config(&self) -> VerificationConfig {
        VerificationConfig {
            offices: self.office_locations(),
            photo_enabled: self.require_photo,
            position_options: PositionOptions::default(),
            max_accuracy_meters: Some(self.gps_accuracy),
        }
    }

    pub fn check_in_time(&self) -> Result<NaiveTime, AttendanceError> {
        parse_time(&self.check_in_time)
    }

    pub fn check_out_time(&self) -> Result<NaiveTime, AttendanceError> {
        parse_time(&self.check_out_time)
    }

    /// Latest local time that still counts as on time, or `None` when the
    /// grace period runs past midnight and no check-in that day is late.
    pub fn late_after(&self) -> Result<Option<NaiveTime>, AttendanceError> {
        let (limit, wrapped) = self
            .check_in_time()?
            .overflowing_add_signed(Duration::minutes(i64::from(self.grace_period)));
        Ok((wrapped == 0).then_some(limit))
    }

    /// Scheduled length of the working day, in hours.
    pub fn shift_hours(&self) -> Result<f64, AttendanceError> {
        let span = self.check_out_time()? - self.check_in_time()?;
        Ok(span.num_minutes() as f64 / 60.0)
    }

    pub fn offset(&self) -> Result<FixedOffset, AttendanceError> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            AttendanceError::Config(format!(
                "invalid UTC offset of {} minutes",
                self.utc_offset_minutes
            ))
        })
    }

    /// Office-local wall clock time of `at`.
    pub fn local_datetime(&self, at: Timestamp) -> Result<NaiveDateTime, AttendanceError> {
        let offset = self.offset()?;
        let secs = i64::try_from(at.as_secs()).map_err(|_| AttendanceError::InvalidTimestamp(at))?;
        DateTime::from_timestamp(secs, 0)
            .map(|utc| utc.with_timezone(&offset).naive_local())
            .ok_or(AttendanceError::InvalidTimestamp(at))
    }
}

fn parse_time(s: &str) -> Result<NaiveTime, AttendanceError> {
    NaiveTime::parse_from_str(s.trim(), TIME_FORMAT)
        .map_err(|_| AttendanceError::Config(format!("'{s}' is not a valid HH:MM time")))
}

impl Default for AttendanceSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            allow_employee_choice: default_true(),
            available_security_modes: default_available_modes(),
            default_security_mode: default_security_mode(),
            require_photo: default_true(),
            gps_accuracy: default_gps_accuracy(),
            check_in_radius: default_check_in_radius(),
            check_in_time: default_check_in_time(),
            check_out_time: default_check_out_time(),
            grace_period: default_grace_period(),
            utc_offset_minutes: 0,
            accept_skipped_steps: false,
            offices: Vec::new(),
        }
    }
}

impl OfficeDirectory for AttendanceSettings {
    fn offices(&self) -> Result<Vec<OfficeLocation>, StoreError> {
        Ok(self.office_locations())
    }
}
