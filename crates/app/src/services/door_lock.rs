//! Door lock controller — LOCKED / UNLOCKED / ALERT.
//!
//! User commands (`lock`, `unlock`, `toggle`) are only enqueued in the
//! `lock_cmd` channel and applied on the next [`tick`](DoorLockController::tick),
//! one command per tick. A forced-entry report bypasses the queue and puts
//! the lock into `ALERT`, where it stays, ignoring every pending command,
//! until [`clear_alert`](DoorLockController::clear_alert) locks the door again.
//!
//! An unrecognized command token is left in the channel and re-read (and
//! re-ignored) on every following tick until an issuer overwrites it.

use homewatch_domain::channel::{Channel, Device};
use homewatch_domain::error::HomeWatchError;
use homewatch_domain::lock::{AlertState, LockCommand, LockStatus};

use crate::ports::{ChannelStore, Clock, EventLog};
use crate::services::context::{DeviceContext, Slot};
use crate::services::outcome::TickOutcome;

/// Polling controller for the door lock.
#[derive(Debug)]
pub struct DoorLockController<S, L, C> {
    ctx: DeviceContext<S, L, C>,
    status: LockStatus,
    alert: AlertState,
}

impl<S: ChannelStore, L: EventLog, C: Clock> DoorLockController<S, L, C> {
    /// Create a controller in the default state (`LOCKED`, no alert).
    pub fn new(store: S, log: L, clock: C) -> Self {
        Self {
            ctx: DeviceContext::new(store, log, clock),
            status: LockStatus::default(),
            alert: AlertState::default(),
        }
    }

    /// Last status seen or written by this controller.
    #[must_use]
    pub fn status(&self) -> LockStatus {
        self.status
    }

    #[must_use]
    pub fn alert(&self) -> AlertState {
        self.alert
    }

    /// Seed missing channels with their defaults and load the current state.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store cannot be read or written.
    pub async fn initialize(&mut self) -> Result<(), HomeWatchError> {
        self.ctx
            .seed(Channel::LOCK_STATUS, LockStatus::default().as_str())
            .await?;
        self.ctx.seed(Channel::LOCK_COMMAND, "").await?;
        self.ctx
            .seed(Channel::LOCK_ALERT, AlertState::default().as_str())
            .await?;
        self.refresh().await
    }

    /// Enqueue a `LOCK` command.
    pub async fn lock(&self) {
        enqueue(&self.ctx, LockCommand::Lock).await;
    }

    /// Enqueue an `UNLOCK` command.
    pub async fn unlock(&self) {
        enqueue(&self.ctx, LockCommand::Unlock).await;
    }

    /// Enqueue a `TOGGLE` command.
    pub async fn toggle(&self) {
        enqueue(&self.ctx, LockCommand::Toggle).await;
    }

    /// Immediately enter `ALERT` with a `FORCED_ENTRY` flag.
    pub async fn report_forced_entry(&mut self) {
        if report_forced_entry(&self.ctx).await {
            self.status = LockStatus::Alert;
            self.alert = AlertState::ForcedEntry;
        }
    }

    /// Immediately clear the alert and lock the door.
    pub async fn clear_alert(&mut self) {
        if clear_alert(&self.ctx).await {
            self.status = LockStatus::Locked;
            self.alert = AlertState::None;
        }
    }

    /// Apply at most one pending command.
    #[tracing::instrument(skip(self), fields(device = "lock"))]
    pub async fn tick(&mut self) -> TickOutcome<LockStatus> {
        match self.try_tick().await {
            Ok(outcome) => outcome,
            Err(err) => {
                self.ctx.record_failure(Device::Lock, &err).await;
                TickOutcome::Aborted
            }
        }
    }

    async fn try_tick(&mut self) -> Result<TickOutcome<LockStatus>, HomeWatchError> {
        self.refresh().await?;

        if self.status.is_alert() {
            return Ok(TickOutcome::Blocked);
        }

        let command = match self.ctx.read::<LockCommand>(Channel::LOCK_COMMAND).await? {
            Slot::Empty => return Ok(TickOutcome::Idle),
            Slot::Malformed(token) => {
                tracing::debug!(token = %token, "ignoring unrecognized lock command");
                return Ok(TickOutcome::Dropped(token));
            }
            Slot::Value(command) => command,
        };

        let from = self.status;
        let to = from.after(command);
        let outcome = if to == from {
            TickOutcome::Unchanged
        } else {
            self.ctx.write(Channel::LOCK_STATUS, to).await?;
            self.status = to;
            self.ctx.record(Device::Lock, describe(command, to)).await;
            TickOutcome::Transition { from, to }
        };

        self.ctx.clear(Channel::LOCK_COMMAND).await?;
        Ok(outcome)
    }

    /// Re-read status and alert; missing values fall back to the defaults,
    /// malformed ones keep the previous in-memory value.
    async fn refresh(&mut self) -> Result<(), HomeWatchError> {
        match self.ctx.read::<LockStatus>(Channel::LOCK_STATUS).await? {
            Slot::Empty => self.status = LockStatus::default(),
            Slot::Value(status) => self.status = status,
            Slot::Malformed(token) => {
                tracing::warn!(token = %token, kept = %self.status, "malformed lock status");
            }
        }
        match self.ctx.read::<AlertState>(Channel::LOCK_ALERT).await? {
            Slot::Empty => self.alert = AlertState::default(),
            Slot::Value(alert) => self.alert = alert,
            Slot::Malformed(token) => {
                tracing::warn!(token = %token, kept = %self.alert, "malformed lock alert");
            }
        }
        Ok(())
    }
}

fn describe(command: LockCommand, to: LockStatus) -> String {
    match command {
        LockCommand::Lock => "Door locked by command.".to_string(),
        LockCommand::Unlock => "Door unlocked by command.".to_string(),
        LockCommand::Toggle => format!("Door toggled to {to}."),
    }
}

pub(crate) async fn enqueue<S: ChannelStore, L: EventLog, C: Clock>(
    ctx: &DeviceContext<S, L, C>,
    command: LockCommand,
) -> bool {
    match ctx.write(Channel::LOCK_COMMAND, command).await {
        Ok(()) => {
            tracing::debug!(command = %command, "lock command enqueued");
            true
        }
        Err(err) => {
            ctx.record_failure(Device::Lock, &err).await;
            false
        }
    }
}

pub(crate) async fn report_forced_entry<S: ChannelStore, L: EventLog, C: Clock>(
    ctx: &DeviceContext<S, L, C>,
) -> bool {
    let result = async {
        ctx.write(Channel::LOCK_STATUS, LockStatus::Alert).await?;
        ctx.write(Channel::LOCK_ALERT, AlertState::ForcedEntry).await
    }
    .await;
    match result {
        Ok(()) => {
            ctx.record(Device::Lock, "FORCED ENTRY detected! Door is in ALERT state.")
                .await;
            true
        }
        Err(err) => {
            ctx.record_failure(Device::Lock, &err).await;
            false
        }
    }
}

pub(crate) async fn clear_alert<S: ChannelStore, L: EventLog, C: Clock>(
    ctx: &DeviceContext<S, L, C>,
) -> bool {
    let result = async {
        ctx.write(Channel::LOCK_ALERT, AlertState::None).await?;
        ctx.write(Channel::LOCK_STATUS, LockStatus::Locked).await
    }
    .await;
    match result {
        Ok(()) => {
            ctx.record(Device::Lock, "Forced entry alert cleared. Door set to LOCKED.")
                .await;
            true
        }
        Err(err) => {
            ctx.record_failure(Device::Lock, &err).await;
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::Arc;

    use crate::clock::ManualClock;
    use crate::memory::{FlakyChannelStore, MemoryChannelStore, MemoryEventLog};

    type Controller =
        DoorLockController<Arc<MemoryChannelStore>, Arc<MemoryEventLog>, ManualClock>;

    fn setup(status: &str) -> (Controller, Arc<MemoryChannelStore>, Arc<MemoryEventLog>) {
        let store = Arc::new(
            MemoryChannelStore::new()
                .with(Channel::LOCK_STATUS, status)
                .with(Channel::LOCK_COMMAND, "")
                .with(Channel::LOCK_ALERT, "NONE"),
        );
        let log = Arc::new(MemoryEventLog::new());
        let controller =
            DoorLockController::new(Arc::clone(&store), Arc::clone(&log), ManualClock::default());
        (controller, store, log)
    }

    fn persisted(store: &MemoryChannelStore, channel: Channel) -> String {
        store.value(channel).unwrap_or_default()
    }

    #[tokio::test]
    async fn should_lock_when_unlocked() {
        let (mut lock, store, _) = setup("UNLOCKED");
        lock.lock().await;
        let outcome = lock.tick().await;
        assert_eq!(
            outcome,
            TickOutcome::Transition {
                from: LockStatus::Unlocked,
                to: LockStatus::Locked
            }
        );
        assert_eq!(persisted(&store, Channel::LOCK_STATUS), "LOCKED");
        assert_eq!(persisted(&store, Channel::LOCK_COMMAND), "");
    }

    #[tokio::test]
    async fn should_unlock_when_locked() {
        let (mut lock, store, log) = setup("LOCKED");
        lock.unlock().await;
        lock.tick().await;
        assert_eq!(persisted(&store, Channel::LOCK_STATUS), "UNLOCKED");
        assert_eq!(lock.status(), LockStatus::Unlocked);
        assert_eq!(log.messages(Device::Lock), vec!["Door unlocked by command."]);
    }

    #[tokio::test]
    async fn should_not_change_state_when_enqueuing_only() {
        let (lock, store, _) = setup("LOCKED");
        lock.unlock().await;
        assert_eq!(persisted(&store, Channel::LOCK_STATUS), "LOCKED");
        assert_eq!(persisted(&store, Channel::LOCK_COMMAND), "UNLOCK");
    }

    #[tokio::test]
    async fn should_consume_lock_without_logging_when_already_locked() {
        let (mut lock, store, log) = setup("LOCKED");
        lock.lock().await;
        assert_eq!(lock.tick().await, TickOutcome::Unchanged);
        assert_eq!(persisted(&store, Channel::LOCK_STATUS), "LOCKED");
        assert_eq!(persisted(&store, Channel::LOCK_COMMAND), "");
        assert!(log.messages(Device::Lock).is_empty());
    }

    #[tokio::test]
    async fn should_return_to_locked_after_two_toggles() {
        let (mut lock, store, log) = setup("LOCKED");

        lock.toggle().await;
        lock.tick().await;
        assert_eq!(persisted(&store, Channel::LOCK_STATUS), "UNLOCKED");

        lock.toggle().await;
        lock.tick().await;
        assert_eq!(persisted(&store, Channel::LOCK_STATUS), "LOCKED");
        assert_eq!(
            log.messages(Device::Lock),
            vec!["Door toggled to UNLOCKED.", "Door toggled to LOCKED."]
        );
    }

    #[tokio::test]
    async fn should_enter_alert_from_any_state_on_forced_entry() {
        for start in ["LOCKED", "UNLOCKED", "ALERT"] {
            let (mut lock, store, _) = setup(start);
            lock.report_forced_entry().await;
            assert_eq!(persisted(&store, Channel::LOCK_STATUS), "ALERT");
            assert_eq!(persisted(&store, Channel::LOCK_ALERT), "FORCED_ENTRY");
            assert_eq!(lock.status(), LockStatus::Alert);
            assert_eq!(lock.alert(), AlertState::ForcedEntry);
        }
    }

    #[tokio::test]
    async fn should_ignore_every_command_while_in_alert() {
        let (mut lock, store, _) = setup("UNLOCKED");
        lock.report_forced_entry().await;

        for command in ["LOCK", "UNLOCK", "TOGGLE"] {
            store.put(Channel::LOCK_COMMAND, command);
            assert_eq!(lock.tick().await, TickOutcome::Blocked);
            assert_eq!(persisted(&store, Channel::LOCK_STATUS), "ALERT");
            assert_eq!(persisted(&store, Channel::LOCK_COMMAND), command);
        }
    }

    #[tokio::test]
    async fn should_lock_and_clear_flag_when_alert_cleared() {
        let (mut lock, store, log) = setup("ALERT");
        store.put(Channel::LOCK_ALERT, "FORCED_ENTRY");

        lock.clear_alert().await;

        assert_eq!(persisted(&store, Channel::LOCK_STATUS), "LOCKED");
        assert_eq!(persisted(&store, Channel::LOCK_ALERT), "NONE");
        assert_eq!(
            log.messages(Device::Lock),
            vec!["Forced entry alert cleared. Door set to LOCKED."]
        );
    }

    #[tokio::test]
    async fn should_apply_pending_command_after_alert_cleared() {
        let (mut lock, store, _) = setup("LOCKED");
        lock.report_forced_entry().await;
        lock.unlock().await;
        lock.tick().await;
        lock.clear_alert().await;
        lock.tick().await;
        assert_eq!(persisted(&store, Channel::LOCK_STATUS), "UNLOCKED");
    }

    #[tokio::test]
    async fn should_leave_unrecognized_command_in_channel() {
        let (mut lock, store, _) = setup("LOCKED");
        store.put(Channel::LOCK_COMMAND, "OPEN_SESAME");

        for _ in 0..3 {
            assert_eq!(
                lock.tick().await,
                TickOutcome::Dropped("OPEN_SESAME".to_string())
            );
        }
        assert_eq!(persisted(&store, Channel::LOCK_COMMAND), "OPEN_SESAME");
        assert_eq!(persisted(&store, Channel::LOCK_STATUS), "LOCKED");
    }

    #[tokio::test]
    async fn should_accept_lowercase_command_tokens() {
        let (mut lock, store, _) = setup("locked");
        store.put(Channel::LOCK_COMMAND, " unlock\n");
        lock.tick().await;
        assert_eq!(persisted(&store, Channel::LOCK_STATUS), "UNLOCKED");
    }

    #[tokio::test]
    async fn should_pick_up_status_changed_externally() {
        let (mut lock, store, _) = setup("LOCKED");
        lock.tick().await;
        store.put(Channel::LOCK_STATUS, "UNLOCKED");
        lock.toggle().await;
        lock.tick().await;
        assert_eq!(persisted(&store, Channel::LOCK_STATUS), "LOCKED");
    }

    #[tokio::test]
    async fn should_keep_previous_status_when_persisted_value_is_malformed() {
        let (mut lock, store, _) = setup("UNLOCKED");
        lock.tick().await;
        store.put(Channel::LOCK_STATUS, "JAMMED");
        lock.tick().await;
        assert_eq!(lock.status(), LockStatus::Unlocked);
    }

    #[tokio::test]
    async fn should_let_last_command_win_before_tick() {
        let (mut lock, store, _) = setup("LOCKED");
        lock.unlock().await;
        lock.lock().await;
        lock.tick().await;
        assert_eq!(persisted(&store, Channel::LOCK_STATUS), "LOCKED");
    }

    #[tokio::test]
    async fn should_seed_defaults_when_channels_missing() {
        let store = Arc::new(MemoryChannelStore::new());
        let mut lock = DoorLockController::new(
            Arc::clone(&store),
            MemoryEventLog::new(),
            ManualClock::default(),
        );
        lock.initialize().await.unwrap();
        assert_eq!(persisted(&store, Channel::LOCK_STATUS), "LOCKED");
        assert_eq!(store.value(Channel::LOCK_COMMAND).as_deref(), Some(""));
        assert_eq!(persisted(&store, Channel::LOCK_ALERT), "NONE");
    }

    #[tokio::test]
    async fn should_keep_existing_values_when_initializing() {
        let (mut lock, store, _) = setup("UNLOCKED");
        lock.initialize().await.unwrap();
        assert_eq!(persisted(&store, Channel::LOCK_STATUS), "UNLOCKED");
        assert_eq!(lock.status(), LockStatus::Unlocked);
    }

    struct BrokenStore;

    impl ChannelStore for BrokenStore {
        fn get(
            &self,
            _channel: Channel,
        ) -> impl Future<Output = Result<Option<String>, HomeWatchError>> + Send {
            async { Err(HomeWatchError::Storage("disk unplugged".into())) }
        }

        fn set(
            &self,
            _channel: Channel,
            _value: &str,
        ) -> impl Future<Output = Result<(), HomeWatchError>> + Send {
            async { Err(HomeWatchError::Storage("disk unplugged".into())) }
        }
    }

    #[tokio::test]
    async fn should_abort_and_log_when_store_fails() {
        let log = Arc::new(MemoryEventLog::new());
        let mut lock = DoorLockController::new(BrokenStore, Arc::clone(&log), ManualClock::default());

        assert_eq!(lock.tick().await, TickOutcome::Aborted);
        assert_eq!(
            log.messages(Device::Lock),
            vec!["ERROR in door lock tick: storage error"]
        );

        // Next tick runs normally and fails the same way, without panicking.
        assert_eq!(lock.tick().await, TickOutcome::Aborted);
    }

    #[tokio::test]
    async fn should_apply_pending_command_on_tick_after_failure() {
        let inner = Arc::new(
            MemoryChannelStore::new()
                .with(Channel::LOCK_STATUS, "LOCKED")
                .with(Channel::LOCK_COMMAND, "UNLOCK")
                .with(Channel::LOCK_ALERT, "NONE"),
        );
        let store = Arc::new(FlakyChannelStore::new(Arc::clone(&inner)));
        let log = Arc::new(MemoryEventLog::new());
        let mut lock = DoorLockController::new(Arc::clone(&store), Arc::clone(&log), ManualClock::default());

        store.fail_next(1);
        assert_eq!(lock.tick().await, TickOutcome::Aborted);
        assert_eq!(persisted(&inner, Channel::LOCK_STATUS), "LOCKED");
        assert_eq!(persisted(&inner, Channel::LOCK_COMMAND), "UNLOCK");

        assert_eq!(
            lock.tick().await,
            TickOutcome::Transition {
                from: LockStatus::Locked,
                to: LockStatus::Unlocked
            }
        );
        assert_eq!(persisted(&inner, Channel::LOCK_STATUS), "UNLOCKED");
        assert_eq!(persisted(&inner, Channel::LOCK_COMMAND), "");
        assert_eq!(
            log.messages(Device::Lock),
            vec!["ERROR in door lock tick: storage error", "Door unlocked by command."]
        );
    }
}
