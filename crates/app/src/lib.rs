//! # homewatch-app
//!
//! Application layer — device controllers and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `ChannelStore` — get/set of one persisted text value per channel
//!   - `EventLog` — append-only timestamped device log
//!   - `Clock` — source of "now" for controller timers
//!   - `Annunciator` — audible signal when the doorbell starts ringing
//! - Define the **controllers** that reconcile pending commands with the
//!   persisted status on every tick (door lock, doorbell, fire alarm,
//!   thermostat, smart plug)
//! - Provide the **command issuer** used by consoles and dashboards
//! - Provide the **scheduler** that ticks every enabled controller
//! - Provide **in-process infrastructure** (memory store, manual clock) that
//!   doesn't need IO
//!
//! ## Dependency rule
//! Depends on `homewatch-domain` only (plus `tokio` for timing and channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod clock;
pub mod memory;
pub mod ports;
pub mod scheduler;
pub mod services;
