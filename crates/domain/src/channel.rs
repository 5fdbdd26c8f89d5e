//! Channel — a single named persisted value.
//!
//! Each device owns a handful of channels (status, pending command, alert
//! flag, sensor reading). A channel is addressed by its key, built from the
//! device prefix and the purpose suffix: `lock_status`, `doorbell_cmd`,
//! `fire_smoke`, ...

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseTokenError;

/// A simulated device whose state lives in the channel store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    Lock,
    Doorbell,
    FireAlarm,
    Thermostat,
    Plug,
}

impl Device {
    pub const ALL: [Self; 5] = [
        Self::Lock,
        Self::Doorbell,
        Self::FireAlarm,
        Self::Thermostat,
        Self::Plug,
    ];

    /// Key prefix shared by every channel of this device.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Lock => "lock",
            Self::Doorbell => "doorbell",
            Self::FireAlarm => "fire",
            Self::Thermostat => "thermo",
            Self::Plug => "plug",
        }
    }

    /// Human readable name, used in log output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Lock => "door lock",
            Self::Doorbell => "doorbell",
            Self::FireAlarm => "fire alarm",
            Self::Thermostat => "thermostat",
            Self::Plug => "smart plug",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for Device {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        Self::ALL
            .into_iter()
            .find(|device| device.prefix().eq_ignore_ascii_case(text))
            .ok_or_else(|| ParseTokenError::new("device", text))
    }
}

/// What a channel holds for its device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    /// Current status, written by the controller.
    Status,
    /// Pending command, written by the issuer and cleared by the controller.
    Command,
    /// Alert flag (door lock only).
    Alert,
    /// Raw sensor reading (fire alarm smoke level).
    Sensor,
}

impl Purpose {
    const ALL: [Self; 4] = [Self::Status, Self::Command, Self::Alert, Self::Sensor];

    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Command => "cmd",
            Self::Alert => "alert",
            Self::Sensor => "smoke",
        }
    }
}

/// Address of one persisted slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Channel {
    pub device: Device,
    pub purpose: Purpose,
}

impl Channel {
    pub const LOCK_STATUS: Self = Self::new(Device::Lock, Purpose::Status);
    pub const LOCK_COMMAND: Self = Self::new(Device::Lock, Purpose::Command);
    pub const LOCK_ALERT: Self = Self::new(Device::Lock, Purpose::Alert);

    pub const DOORBELL_STATUS: Self = Self::new(Device::Doorbell, Purpose::Status);
    pub const DOORBELL_COMMAND: Self = Self::new(Device::Doorbell, Purpose::Command);

    pub const FIRE_STATUS: Self = Self::new(Device::FireAlarm, Purpose::Status);
    pub const FIRE_COMMAND: Self = Self::new(Device::FireAlarm, Purpose::Command);
    pub const FIRE_SMOKE: Self = Self::new(Device::FireAlarm, Purpose::Sensor);

    pub const THERMOSTAT_STATUS: Self = Self::new(Device::Thermostat, Purpose::Status);
    pub const THERMOSTAT_COMMAND: Self = Self::new(Device::Thermostat, Purpose::Command);

    pub const PLUG_STATUS: Self = Self::new(Device::Plug, Purpose::Status);
    pub const PLUG_COMMAND: Self = Self::new(Device::Plug, Purpose::Command);

    /// Every channel used by the controllers.
    pub const ALL: [Self; 12] = [
        Self::LOCK_STATUS,
        Self::LOCK_COMMAND,
        Self::LOCK_ALERT,
        Self::DOORBELL_STATUS,
        Self::DOORBELL_COMMAND,
        Self::FIRE_STATUS,
        Self::FIRE_COMMAND,
        Self::FIRE_SMOKE,
        Self::THERMOSTAT_STATUS,
        Self::THERMOSTAT_COMMAND,
        Self::PLUG_STATUS,
        Self::PLUG_COMMAND,
    ];

    #[must_use]
    pub const fn new(device: Device, purpose: Purpose) -> Self {
        Self { device, purpose }
    }

    /// Store key, e.g. `lock_cmd`.
    #[must_use]
    pub fn key(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.device.prefix(), self.purpose.suffix())
    }
}

impl FromStr for Channel {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let (prefix, suffix) = text
            .split_once('_')
            .ok_or_else(|| ParseTokenError::new("channel", text))?;
        let device: Device = prefix
            .parse()
            .map_err(|_| ParseTokenError::new("channel", text))?;
        let purpose = Purpose::ALL
            .into_iter()
            .find(|purpose| purpose.suffix().eq_ignore_ascii_case(suffix))
            .ok_or_else(|| ParseTokenError::new("channel", text))?;
        Ok(Self::new(device, purpose))
    }
}
