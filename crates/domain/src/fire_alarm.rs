//! Fire alarm — smoke threshold state machine with hysteresis.
//!
//! The alarm latches on at [`SMOKE_ALARM_THRESHOLD`] and can only be reset
//! once the smoke has dropped to [`SMOKE_SAFE_THRESHOLD`] or below. Between
//! the two thresholds lies a dead zone where reset requests are ignored.
//! Acknowledging silences nothing; it only records that someone has seen
//! the alarm, and it has no effect while the alarm is off.

use crate::token::define_token;

/// Smoke level (inclusive) at which the alarm turns on.
pub const SMOKE_ALARM_THRESHOLD: f64 = 60.0;

/// Smoke level (inclusive) at or below which a reset is honoured.
pub const SMOKE_SAFE_THRESHOLD: f64 = 20.0;

define_token! {
    /// Persisted summary of the fire alarm state.
    #[derive(Default)]
    FireAlarmStatus ("fire alarm status") {
        #[default]
        Off => "OFF",
        Alarm => "ALARM",
        Acknowledged => "ACKNOWLEDGED",
    }
}

define_token! {
    /// Pending user command for the fire alarm.
    FireAlarmCommand ("fire alarm command") {
        Reset => "RESET",
        Ack => "ACK",
    }
}

/// In-memory fire alarm. Each [`update`](Self::update) is a discrete step;
/// there are no internal timers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FireAlarm {
    is_alarm_on: bool,
    is_acknowledged: bool,
    current_smoke: f64,
}

impl FireAlarm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one smoke reading together with the user requests of this cycle.
    ///
    /// Negative (and NaN) readings are treated as zero.
    pub fn update(&mut self, smoke: f64, reset_requested: bool, ack_requested: bool) {
        let smoke = smoke.max(0.0);
        self.current_smoke = smoke;

        if !self.is_alarm_on {
            if smoke >= SMOKE_ALARM_THRESHOLD {
                self.is_alarm_on = true;
                self.is_acknowledged = false;
            }
            return;
        }

        if ack_requested {
            self.is_acknowledged = true;
        }

        if reset_requested && smoke <= SMOKE_SAFE_THRESHOLD {
            self.is_alarm_on = false;
            self.is_acknowledged = false;
        }
    }

    #[must_use]
    pub fn is_alarm_on(&self) -> bool {
        self.is_alarm_on
    }

    #[must_use]
    pub fn is_acknowledged(&self) -> bool {
        self.is_acknowledged
    }

    /// Last smoke reading after clamping.
    #[must_use]
    pub fn current_smoke(&self) -> f64 {
        self.current_smoke
    }

    #[must_use]
    pub fn status(&self) -> FireAlarmStatus {
        match (self.is_alarm_on, self.is_acknowledged) {
            (false, _) => FireAlarmStatus::Off,
            (true, false) => FireAlarmStatus::Alarm,
            (true, true) => FireAlarmStatus::Acknowledged,
        }
    }
}
