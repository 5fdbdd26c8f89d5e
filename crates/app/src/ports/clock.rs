//! Clock port — injected source of the current time.

use std::sync::Arc;

use homewatch_domain::time::Timestamp;

/// Supplies "now" to controllers so timers can be driven deterministically.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

impl<T: Clock> Clock for Arc<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}
