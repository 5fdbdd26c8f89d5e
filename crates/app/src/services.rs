//! Device controllers and the command issuer.
//!
//! Each controller accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.
//! Controllers re-read their channels on every tick, so the store stays the
//! single source of truth even when another process writes to it.

mod context;

pub mod door_lock;
pub mod doorbell;
pub mod fire_alarm;
pub mod issuer;
pub mod outcome;
pub mod plug;
pub mod thermostat;

pub use outcome::TickOutcome;
