//! # homewatch-domain
//!
//! Pure domain model for the homewatch device controllers.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, timestamps, timers
//! - Define **Channels** (one persisted slot per device and purpose)
//! - Define the text **tokens** each channel carries (status, command, alert)
//! - Contain the **fire alarm** hysteresis state machine
//! - Parse and render the `key=value` payloads of the thermostat and plug
//! - Define **log entries** (timestamped device events)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;
mod token;

pub mod channel;
pub mod doorbell;
pub mod event;
pub mod fire_alarm;
pub mod lock;
pub mod plug;
pub mod thermostat;
pub mod timer;
