//! Thermostat payloads — `key=value` lines.
//!
//! Status lines carry `temp`, `hum`, `setpoint` and `mode`; command lines
//! may carry `setpoint` and `mode`. Unknown keys, lines without `=`, and
//! unparseable values are skipped so the previous value is kept.

use crate::token::define_token;

define_token! {
    /// Operating mode.
    #[derive(Default)]
    ThermostatMode ("thermostat mode") {
        Heat => "HEAT",
        Cool => "COOL",
        #[default]
        Off => "OFF",
    }
}

/// Last known thermostat values.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThermostatReading {
    pub temperature: f64,
    pub humidity: f64,
    pub setpoint: f64,
    pub mode: ThermostatMode,
}

impl ThermostatReading {
    /// Merge a status payload into this reading. Returns how many fields were
    /// updated.
    pub fn merge_status(&mut self, text: &str) -> usize {
        let mut applied = 0;
        for (key, value) in pairs(text) {
            let ok = match key {
                "temp" => set_number(&mut self.temperature, value),
                "hum" => set_number(&mut self.humidity, value),
                "setpoint" => set_number(&mut self.setpoint, value),
                "mode" => set_mode(&mut self.mode, value),
                _ => false,
            };
            applied += usize::from(ok);
        }
        applied
    }

    /// Apply a command payload (`setpoint`, `mode`). Returns how many fields
    /// were updated.
    pub fn apply_command(&mut self, text: &str) -> usize {
        let mut applied = 0;
        for (key, value) in pairs(text) {
            let ok = match key {
                "setpoint" => set_number(&mut self.setpoint, value),
                "mode" => set_mode(&mut self.mode, value),
                _ => false,
            };
            applied += usize::from(ok);
        }
        applied
    }

    /// Render as a status payload.
    #[must_use]
    pub fn to_status_text(&self) -> String {
        format!(
            "temp={}\nhum={}\nsetpoint={}\nmode={}",
            self.temperature, self.humidity, self.setpoint, self.mode
        )
    }
}

fn pairs(text: &str) -> impl Iterator<Item = (&str, &str)> {
    text.lines()
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim()))
}

fn set_number(slot: &mut f64, value: &str) -> bool {
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => {
            *slot = parsed;
            true
        }
        _ => false,
    }
}

fn set_mode(slot: &mut ThermostatMode, value: &str) -> bool {
    value.parse().map(|mode| *slot = mode).is_ok()
}
