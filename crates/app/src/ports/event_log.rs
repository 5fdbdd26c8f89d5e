//! Event log port — append-only record of device events.

use std::future::Future;
use std::sync::Arc;

use homewatch_domain::error::HomeWatchError;
use homewatch_domain::event::LogEntry;

/// Appends [`LogEntry`] lines to a device's log.
pub trait EventLog: Send + Sync {
    fn append(&self, entry: LogEntry) -> impl Future<Output = Result<(), HomeWatchError>> + Send;
}

impl<T: EventLog> EventLog for Arc<T> {
    fn append(&self, entry: LogEntry) -> impl Future<Output = Result<(), HomeWatchError>> + Send {
        (**self).append(entry)
    }
}
