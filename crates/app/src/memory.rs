//! In-memory store and event log.
//!
//! Used by tests and by the daemon's `memory` storage backend. Every slot
//! is guarded by a single mutex; there are no cross-channel transactions.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use homewatch_domain::channel::{Channel, Device};
use homewatch_domain::error::HomeWatchError;
use homewatch_domain::event::LogEntry;

use crate::ports::{ChannelStore, EventLog};

/// [`ChannelStore`] kept in a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryChannelStore {
    slots: Mutex<HashMap<Channel, String>>,
}

impl MemoryChannelStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style preset of one slot.
    #[must_use]
    pub fn with(self, channel: Channel, value: &str) -> Self {
        self.put(channel, value);
        self
    }

    /// Synchronous write, for tests and simulations.
    pub fn put(&self, channel: Channel, value: &str) {
        self.slots().insert(channel, value.to_string());
    }

    /// Synchronous read, for tests and simulations.
    #[must_use]
    pub fn value(&self, channel: Channel) -> Option<String> {
        self.slots().get(&channel).cloned()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<Channel, String>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ChannelStore for MemoryChannelStore {
    fn get(
        &self,
        channel: Channel,
    ) -> impl Future<Output = Result<Option<String>, HomeWatchError>> + Send {
        let value = self.value(channel);
        async { Ok(value) }
    }

    fn set(
        &self,
        channel: Channel,
        value: &str,
    ) -> impl Future<Output = Result<(), HomeWatchError>> + Send {
        self.put(channel, value);
        async { Ok(()) }
    }
}

/// [`EventLog`] that keeps every entry in a `Vec`.
#[derive(Debug, Default)]
pub struct MemoryEventLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryEventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    /// Messages logged for one device, oldest first.
    #[must_use]
    pub fn messages(&self, device: Device) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|entry| entry.device == device)
            .map(|entry| entry.message.clone())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventLog for MemoryEventLog {
    fn append(&self, entry: LogEntry) -> impl Future<Output = Result<(), HomeWatchError>> + Send {
        self.lock().push(entry);
        async { Ok(()) }
    }
}

/// Store that fails its next `failures` operations, then delegates to an
/// inner [`MemoryChannelStore`].
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct FlakyChannelStore {
    inner: std::sync::Arc<MemoryChannelStore>,
    failures: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl FlakyChannelStore {
    pub(crate) fn new(inner: std::sync::Arc<MemoryChannelStore>) -> Self {
        Self {
            inner,
            failures: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub(crate) fn fail_next(&self, count: usize) {
        self.failures
            .store(count, std::sync::atomic::Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), HomeWatchError> {
        use std::sync::atomic::Ordering;
        match self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
        {
            Ok(_) => Err(HomeWatchError::Storage("disk unplugged".into())),
            Err(_) => Ok(()),
        }
    }
}

#[cfg(test)]
impl ChannelStore for FlakyChannelStore {
    fn get(
        &self,
        channel: Channel,
    ) -> impl Future<Output = Result<Option<String>, HomeWatchError>> + Send {
        let result = self.check().map(|()| self.inner.value(channel));
        async { result }
    }

    fn set(
        &self,
        channel: Channel,
        value: &str,
    ) -> impl Future<Output = Result<(), HomeWatchError>> + Send {
        let result = self.check().map(|()| self.inner.put(channel, value));
        async { result }
    }
}
