//! Round settings coming from the settings drawer.

use crate::{create_initial_machine, BombMachine, BombStatus, Durations};
use log::{info, warn};
use std::fmt;

/// Requested durations in milliseconds. Same shape as [`Durations`], but not
/// yet checked.
pub type Settings = Durations;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsError {
    ZeroDuration(&'static str),
    /// Settings cannot change while a plant, countdown or defuse is running.
    RoundInProgress(BombStatus),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::ZeroDuration(field) => write!(f, "{} must be greater than zero", field),
            SettingsError::RoundInProgress(status) => write!(
                f,
                "Cannot change settings while the bomb is {}",
                status
            ),
        }
    }
}

impl std::error::Error for SettingsError {}

impl Durations {
    pub fn validate(self) -> Result<Self, SettingsError> {
        if self.plant_duration == 0 {
            return Err(SettingsError::ZeroDuration("Plant time"));
        }
        if self.defuse_duration == 0 {
            return Err(SettingsError::ZeroDuration("Defuse time"));
        }
        if self.bomb_timer == 0 {
            return Err(SettingsError::ZeroDuration("Bomb timer"));
        }
        Ok(self)
    }
}

/// Whether Apply is allowed in `status`.
pub fn can_apply(status: BombStatus) -> bool {
    !status.needs_clock()
}

/// Check `settings` against the machine's current status without applying them.
pub fn check_settings(status: BombStatus, settings: Settings) -> Result<Settings, SettingsError> {
    if !can_apply(status) {
        return Err(SettingsError::RoundInProgress(status));
    }
    settings.validate()
}

/// Apply new settings as a settings-driven reset.
///
/// Accepted while idle or after the round is over and yields a fresh idle
/// machine. Rejected mid-round, leaving the caller's machine untouched.
pub fn apply_settings(machine: &BombMachine, settings: Settings) -> Result<BombMachine, SettingsError> {
    let settings = check_settings(machine.status, settings).map_err(|e| {
        warn!("Rejected settings: {}", e);
        e
    })?;
    info!(
        "Applied settings: plant {} ms, defuse {} ms, timer {} ms",
        settings.plant_duration, settings.defuse_duration, settings.bomb_timer
    );
    Ok(create_initial_machine(settings.into()))
}
