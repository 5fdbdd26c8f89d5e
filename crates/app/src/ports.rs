//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the controllers and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod annunciator;
pub mod clock;
pub mod event_log;
pub mod store;

pub use annunciator::{Annunciator, SilentAnnunciator};
pub use clock::Clock;
pub use event_log::EventLog;
pub use store::ChannelStore;
