//! The security mode that applies on this employee device.

use clockin_store::{PreferenceStore, SECURITY_MODE_KEY};
use clockin_types::SecurityMode;
use tracing::{debug, warn};

use crate::{AttendanceError, AttendanceSettings};

/// Resolves and persists the employee's security mode choice.
///
/// The choice only counts while the administrator allows employee choice and
/// still offers that mode. Otherwise the settings default applies.
pub struct SecurityModePreference<'a, S: PreferenceStore + ?Sized> {
    store: &'a S,
    settings: &'a AttendanceSettings,
}

impl<'a, S: PreferenceStore + ?Sized> SecurityModePreference<'a, S> {
    pub fn new(store: &'a S, settings: &'a AttendanceSettings) -> Self {
        Self { store, settings }
    }

    /// Modes the employee may pick from, in display order.
    pub fn available_modes(&self) -> Vec<SecurityMode> {
        if !self.settings.allow_employee_choice {
            return vec![self.settings.default_security_mode];
        }
        SecurityMode::ALL
            .into_iter()
            .filter(|m| self.settings.available_security_modes.contains(m))
            .collect()
    }

    /// The mode to verify the next check-in with.
    pub fn resolve(&self) -> Result<SecurityMode, AttendanceError> {
        let default = self.settings.default_security_mode;
        if !self.settings.allow_employee_choice {
            return Ok(default);
        }
        let Some(saved) = self.store.get(SECURITY_MODE_KEY)? else {
            return Ok(default);
        };
        match saved.parse::<SecurityMode>() {
            Ok(mode) if self.available_modes().contains(&mode) => Ok(mode),
            Ok(mode) => {
                debug!(%mode, %default, "saved security mode no longer offered");
                Ok(default)
            }
            Err(e) => {
                warn!(%saved, error = %e, "ignoring unreadable saved security mode");
                Ok(default)
            }
        }
    }

    /// Remember `mode` for later check-ins.
    pub fn save(&self, mode: SecurityMode) -> Result<(), AttendanceError> {
        if !self.available_modes().contains(&mode) {
            return Err(AttendanceError::ModeNotAllowed(mode));
        }
        self.store.put(SECURITY_MODE_KEY, mode.as_str())?;
        debug!(%mode, "security mode saved");
        Ok(())
    }

    /// Forget the saved choice so the default applies again.
    pub fn clear(&self) -> Result<(), AttendanceError> {
        self.store.delete(SECURITY_MODE_KEY)?;
        Ok(())
    }
}
