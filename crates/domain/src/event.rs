//! Log entry — a timestamped device event.
//!
//! Controllers record every transition, rejected command and failed tick as
//! a [`LogEntry`]. The event log adapter decides where the lines end up.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::channel::Device;
use crate::time::{LOG_TIME_FORMAT, Timestamp};

/// One line in a device's append-only event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: Timestamp,
    pub device: Device,
    pub message: String,
}

impl LogEntry {
    #[must_use]
    pub fn new(device: Device, message: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            device,
            message: message.into(),
        }
    }
}

/// Renders as `[YYYY-MM-DD HH:MM:SS] message`.
impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}",
            self.timestamp.format(LOG_TIME_FORMAT),
            self.message
        )
    }
}
