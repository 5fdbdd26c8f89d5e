//! Smart plug controller.

use homewatch_domain::channel::{Channel, Device};
use homewatch_domain::error::HomeWatchError;
use homewatch_domain::plug::PlugState;

use crate::ports::{ChannelStore, Clock, EventLog};
use crate::services::context::DeviceContext;
use crate::services::outcome::TickOutcome;

#[derive(Debug)]
pub struct PlugController<S, L, C> {
    ctx: DeviceContext<S, L, C>,
    state: PlugState,
}

impl<S: ChannelStore, L: EventLog, C: Clock> PlugController<S, L, C> {
    pub fn new(store: S, log: L, clock: C) -> Self {
        Self {
            ctx: DeviceContext::new(store, log, clock),
            state: PlugState::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> PlugState {
        self.state
    }

    /// # Errors
    ///
    /// Returns a storage error if the store cannot be read or written.
    pub async fn initialize(&mut self) -> Result<(), HomeWatchError> {
        self.ctx
            .seed(Channel::PLUG_STATUS, &PlugState::default().to_status_text())
            .await?;
        self.ctx.seed(Channel::PLUG_COMMAND, "").await
    }

    #[tracing::instrument(skip(self), fields(device = "plug"))]
    pub async fn tick(&mut self) -> TickOutcome<PlugState> {
        match self.try_tick().await {
            Ok(outcome) => outcome,
            Err(err) => {
                self.ctx.record_failure(Device::Plug, &err).await;
                TickOutcome::Aborted
            }
        }
    }

    async fn try_tick(&mut self) -> Result<TickOutcome<PlugState>, HomeWatchError> {
        let status = self.ctx.read_text(Channel::PLUG_STATUS).await?;
        if let Some(state) = PlugState::from_status_text(&status) {
            self.state = state;
        }

        let command = self.ctx.read_text(Channel::PLUG_COMMAND).await?;
        if command.is_empty() {
            return Ok(TickOutcome::Idle);
        }
        self.ctx.clear(Channel::PLUG_COMMAND).await?;

        let Some(requested) = PlugState::from_command_text(&command) else {
            tracing::debug!(command = %command, "dropping unrecognized plug command");
            return Ok(TickOutcome::Dropped(command));
        };
        if requested == self.state {
            return Ok(TickOutcome::Unchanged);
        }

        let from = self.state;
        self.ctx
            .write(Channel::PLUG_STATUS, requested.to_status_text())
            .await?;
        self.state = requested;
        self.ctx
            .record(Device::Plug, format!("Plug switched {requested}."))
            .await;
        Ok(TickOutcome::Transition {
            from,
            to: requested,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::clock::ManualClock;
    use crate::memory::{MemoryChannelStore, MemoryEventLog};

    fn setup(
        status: &str,
    ) -> (
        PlugController<Arc<MemoryChannelStore>, MemoryEventLog, ManualClock>,
        Arc<MemoryChannelStore>,
    ) {
        let store = Arc::new(MemoryChannelStore::new().with(Channel::PLUG_STATUS, status));
        let plug = PlugController::new(
            Arc::clone(&store),
            MemoryEventLog::new(),
            ManualClock::default(),
        );
        (plug, store)
    }

    #[tokio::test]
    async fn should_switch_on_when_commanded() {
        let (mut plug, store) = setup("state=OFF");
        store.put(Channel::PLUG_COMMAND, "cmd=ON");
        assert_eq!(
            plug.tick().await,
            TickOutcome::Transition {
                from: PlugState::Off,
                to: PlugState::On
            }
        );
        assert_eq!(store.value(Channel::PLUG_STATUS).as_deref(), Some("state=ON"));
        assert_eq!(store.value(Channel::PLUG_COMMAND).as_deref(), Some(""));
    }

    #[tokio::test]
    async fn should_consume_command_matching_current_state() {
        let (mut plug, store) = setup("state=ON");
        store.put(Channel::PLUG_COMMAND, "cmd=ON");
        assert_eq!(plug.tick().await, TickOutcome::Unchanged);
        assert_eq!(plug.state(), PlugState::On);
    }

    #[tokio::test]
    async fn should_drop_malformed_command() {
        let (mut plug, store) = setup("state=OFF");
        store.put(Channel::PLUG_COMMAND, "cmd=DIM");
        assert_eq!(
            plug.tick().await,
            TickOutcome::Dropped("cmd=DIM".to_string())
        );
        assert_eq!(store.value(Channel::PLUG_COMMAND).as_deref(), Some(""));
        assert_eq!(store.value(Channel::PLUG_STATUS).as_deref(), Some("state=OFF"));
    }

    #[tokio::test]
    async fn should_keep_state_when_status_is_malformed() {
        let (mut plug, store) = setup("state=ON");
        plug.tick().await;
        store.put(Channel::PLUG_STATUS, "garbage");
        plug.tick().await;
        assert_eq!(plug.state(), PlugState::On);
    }
}
