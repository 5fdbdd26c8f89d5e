//! Channel store port — durable per-channel text slots.

use std::future::Future;
use std::sync::Arc;

use homewatch_domain::channel::Channel;
use homewatch_domain::error::HomeWatchError;

/// Durable key/value slots, one per [`Channel`].
///
/// Each `get` and `set` must be atomic for its single slot: a reader never
/// observes a partially written value. Nothing spans more than one slot.
pub trait ChannelStore: Send + Sync {
    /// Read the raw text of a channel, `None` if the slot was never written.
    fn get(
        &self,
        channel: Channel,
    ) -> impl Future<Output = Result<Option<String>, HomeWatchError>> + Send;

    /// Overwrite a channel. An empty value clears a command slot.
    fn set(
        &self,
        channel: Channel,
        value: &str,
    ) -> impl Future<Output = Result<(), HomeWatchError>> + Send;
}

impl<T: ChannelStore> ChannelStore for Arc<T> {
    fn get(
        &self,
        channel: Channel,
    ) -> impl Future<Output = Result<Option<String>, HomeWatchError>> + Send {
        (**self).get(channel)
    }

    fn set(
        &self,
        channel: Channel,
        value: &str,
    ) -> impl Future<Output = Result<(), HomeWatchError>> + Send {
        (**self).set(channel, value)
    }
}
