//! Fire alarm controller.
//!
//! Feeds the [`FireAlarm`] state machine from the store. Each tick reads the
//! smoke level from `fire_smoke`, consumes at most one `RESET`/`ACK` from
//! `fire_cmd`, runs one update and persists the derived status to
//! `fire_status` when it changes.

use homewatch_domain::channel::{Channel, Device};
use homewatch_domain::error::HomeWatchError;
use homewatch_domain::fire_alarm::{FireAlarm, FireAlarmCommand, FireAlarmStatus};

use crate::ports::{ChannelStore, Clock, EventLog};
use crate::services::context::{DeviceContext, Slot};
use crate::services::outcome::TickOutcome;

#[derive(Debug)]
pub struct FireAlarmController<S, L, C> {
    ctx: DeviceContext<S, L, C>,
    alarm: FireAlarm,
}

impl<S: ChannelStore, L: EventLog, C: Clock> FireAlarmController<S, L, C> {
    pub fn new(store: S, log: L, clock: C) -> Self {
        Self {
            ctx: DeviceContext::new(store, log, clock),
            alarm: FireAlarm::new(),
        }
    }

    /// The in-memory state machine.
    #[must_use]
    pub fn alarm(&self) -> &FireAlarm {
        &self.alarm
    }

    /// Seed missing channels and publish the initial status.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store cannot be read or written.
    pub async fn initialize(&mut self) -> Result<(), HomeWatchError> {
        self.ctx.seed(Channel::FIRE_SMOKE, "0").await?;
        self.ctx.seed(Channel::FIRE_COMMAND, "").await?;
        self.ctx
            .write(Channel::FIRE_STATUS, self.alarm.status())
            .await
    }

    #[tracing::instrument(skip(self), fields(device = "fire"))]
    pub async fn tick(&mut self) -> TickOutcome<FireAlarmStatus> {
        match self.try_tick().await {
            Ok(outcome) => outcome,
            Err(err) => {
                self.ctx.record_failure(Device::FireAlarm, &err).await;
                TickOutcome::Aborted
            }
        }
    }

    async fn try_tick(&mut self) -> Result<TickOutcome<FireAlarmStatus>, HomeWatchError> {
        let smoke = match self.ctx.read::<f64>(Channel::FIRE_SMOKE).await? {
            Slot::Value(level) => level,
            Slot::Empty => self.alarm.current_smoke(),
            Slot::Malformed(token) => {
                tracing::warn!(token = %token, kept = self.alarm.current_smoke(), "malformed smoke reading");
                self.alarm.current_smoke()
            }
        };

        let mut dropped = None;
        let command = match self.ctx.read::<FireAlarmCommand>(Channel::FIRE_COMMAND).await? {
            Slot::Empty => None,
            Slot::Value(command) => {
                self.ctx.clear(Channel::FIRE_COMMAND).await?;
                Some(command)
            }
            Slot::Malformed(token) => {
                self.ctx.clear(Channel::FIRE_COMMAND).await?;
                tracing::debug!(token = %token, "dropping unrecognized fire alarm command");
                dropped = Some(token);
                None
            }
        };
        let reset = command == Some(FireAlarmCommand::Reset);
        let ack = command == Some(FireAlarmCommand::Ack);

        let from = self.alarm.status();
        self.alarm.update(smoke, reset, ack);
        let to = self.alarm.status();
        let level = self.alarm.current_smoke();

        if from == to {
            self.record_ignored_reset(reset, level).await;
            return Ok(match (dropped, command) {
                (Some(token), _) => TickOutcome::Dropped(token),
                (None, Some(_)) => TickOutcome::Unchanged,
                (None, None) => TickOutcome::Idle,
            });
        }

        self.ctx.write(Channel::FIRE_STATUS, to).await?;
        let message = match to {
            FireAlarmStatus::Alarm => format!("Smoke level {level} reached alarm threshold. Alarm ON."),
            FireAlarmStatus::Acknowledged => "Alarm acknowledged.".to_string(),
            FireAlarmStatus::Off => format!("Alarm reset at smoke level {level}. Alarm OFF."),
        };
        self.ctx.record(Device::FireAlarm, message).await;
        self.record_ignored_reset(reset, level).await;
        Ok(TickOutcome::Transition { from, to })
    }

    async fn record_ignored_reset(&self, reset: bool, level: f64) {
        if reset && self.alarm.is_alarm_on() {
            self.ctx
                .record(
                    Device::FireAlarm,
                    format!("Reset ignored: smoke level {level} is above the safe threshold."),
                )
                .await;
        }
    }
}

pub(crate) async fn enqueue<S: ChannelStore, L: EventLog, C: Clock>(
    ctx: &DeviceContext<S, L, C>,
    command: FireAlarmCommand,
) -> bool {
    match ctx.write(Channel::FIRE_COMMAND, command).await {
        Ok(()) => true,
        Err(err) => {
            ctx.record_failure(Device::FireAlarm, &err).await;
            false
        }
    }
}
