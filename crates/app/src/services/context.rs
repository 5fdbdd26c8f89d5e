//! Shared plumbing for controllers: typed channel reads, log recording.

use std::str::FromStr;

use homewatch_domain::channel::{Channel, Device};
use homewatch_domain::error::HomeWatchError;
use homewatch_domain::event::LogEntry;
use homewatch_domain::time::Timestamp;

use crate::ports::{ChannelStore, Clock, EventLog};

/// What a channel held when it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Slot<T> {
    /// Missing or blank.
    Empty,
    Value(T),
    /// Non-blank text that did not parse; carries the trimmed text.
    Malformed(String),
}

/// The ports every controller needs, bundled.
#[derive(Debug, Clone)]
pub(crate) struct DeviceContext<S, L, C> {
    pub(crate) store: S,
    pub(crate) log: L,
    pub(crate) clock: C,
}

impl<S: ChannelStore, L: EventLog, C: Clock> DeviceContext<S, L, C> {
    pub(crate) fn new(store: S, log: L, clock: C) -> Self {
        Self { store, log, clock }
    }

    pub(crate) fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Raw text of a channel with surrounding whitespace removed.
    pub(crate) async fn read_text(&self, channel: Channel) -> Result<String, HomeWatchError> {
        let raw = self.store.get(channel).await?;
        Ok(raw.as_deref().map(str::trim).unwrap_or_default().to_string())
    }

    pub(crate) async fn read<T: FromStr>(&self, channel: Channel) -> Result<Slot<T>, HomeWatchError> {
        let text = self.read_text(channel).await?;
        if text.is_empty() {
            return Ok(Slot::Empty);
        }
        Ok(match text.parse::<T>() {
            Ok(value) => Slot::Value(value),
            Err(_) => Slot::Malformed(text),
        })
    }

    pub(crate) async fn write(
        &self,
        channel: Channel,
        value: impl std::fmt::Display,
    ) -> Result<(), HomeWatchError> {
        self.store.set(channel, &value.to_string()).await
    }

    pub(crate) async fn clear(&self, channel: Channel) -> Result<(), HomeWatchError> {
        self.store.set(channel, "").await
    }

    /// Write `default` only if the channel was never written.
    pub(crate) async fn seed(&self, channel: Channel, default: &str) -> Result<(), HomeWatchError> {
        if self.store.get(channel).await?.is_none() {
            tracing::debug!(channel = %channel, default, "initializing missing channel");
            self.store.set(channel, default).await?;
        }
        Ok(())
    }

    /// Append a device event to the log. Log failures are reported through
    /// tracing and otherwise ignored.
    pub(crate) async fn record(&self, device: Device, message: impl Into<String>) {
        let entry = LogEntry::new(device, message, self.clock.now());
        tracing::info!(device = %device, "{}", entry.message);
        self.append(entry).await;
    }

    /// Report a failed tick.
    pub(crate) async fn record_failure(&self, device: Device, error: &HomeWatchError) {
        tracing::error!(device = %device, error = %error, source = ?std::error::Error::source(error), "tick aborted");
        let entry = LogEntry::new(
            device,
            format!("ERROR in {} tick: {error}", device.label()),
            self.clock.now(),
        );
        self.append(entry).await;
    }

    async fn append(&self, entry: LogEntry) {
        if let Err(err) = self.log.append(entry).await {
            tracing::warn!(error = %err, "failed to append event log entry");
        }
    }
}
