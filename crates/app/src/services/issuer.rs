//! Command issuer — the write side used by consoles and dashboards.
//!
//! The issuer never touches controller state. Every operation is a plain
//! store write that the owning controller picks up on its next tick, so an
//! issuer can be cloned freely and used while the scheduler is running.
//!
//! Failures are logged as device events and reported as `false`; nothing is
//! propagated to the caller.

use homewatch_domain::channel::{Channel, Device};
use homewatch_domain::doorbell::{DoorbellCommand, DoorbellStatus};
use homewatch_domain::fire_alarm::FireAlarmCommand;
use homewatch_domain::lock::LockCommand;
use homewatch_domain::plug::PlugState;
use homewatch_domain::thermostat::ThermostatMode;

use crate::ports::{ChannelStore, Clock, EventLog};
use crate::services::context::DeviceContext;
use crate::services::{door_lock, doorbell, fire_alarm};

#[derive(Debug, Clone)]
pub struct CommandIssuer<S, L, C> {
    ctx: DeviceContext<S, L, C>,
}

impl<S: ChannelStore, L: EventLog, C: Clock> CommandIssuer<S, L, C> {
    pub fn new(store: S, log: L, clock: C) -> Self {
        Self {
            ctx: DeviceContext::new(store, log, clock),
        }
    }

    pub async fn lock(&self) -> bool {
        door_lock::enqueue(&self.ctx, LockCommand::Lock).await
    }

    pub async fn unlock(&self) -> bool {
        door_lock::enqueue(&self.ctx, LockCommand::Unlock).await
    }

    pub async fn toggle(&self) -> bool {
        door_lock::enqueue(&self.ctx, LockCommand::Toggle).await
    }

    /// Put the lock into `ALERT` right away, without waiting for a tick.
    pub async fn report_forced_entry(&self) -> bool {
        door_lock::report_forced_entry(&self.ctx).await
    }

    /// Leave `ALERT` and lock the door.
    pub async fn clear_alert(&self) -> bool {
        door_lock::clear_alert(&self.ctx).await
    }

    /// Simulate the bell button: writes `RING` as the doorbell status.
    pub async fn press_doorbell(&self) -> bool {
        match self
            .ctx
            .write(Channel::DOORBELL_STATUS, DoorbellStatus::Ring)
            .await
        {
            Ok(()) => {
                tracing::debug!("doorbell pressed");
                true
            }
            Err(err) => {
                self.ctx.record_failure(Device::Doorbell, &err).await;
                false
            }
        }
    }

    pub async fn acknowledge_doorbell(&self) -> bool {
        doorbell::enqueue(&self.ctx, DoorbellCommand::Ack).await
    }

    pub async fn mute_doorbell(&self) -> bool {
        doorbell::enqueue(&self.ctx, DoorbellCommand::Mute).await
    }

    /// Publish a smoke sensor reading.
    pub async fn report_smoke(&self, level: f64) -> bool {
        match self.ctx.write(Channel::FIRE_SMOKE, level).await {
            Ok(()) => true,
            Err(err) => {
                self.ctx.record_failure(Device::FireAlarm, &err).await;
                false
            }
        }
    }

    pub async fn reset_fire_alarm(&self) -> bool {
        fire_alarm::enqueue(&self.ctx, FireAlarmCommand::Reset).await
    }

    pub async fn acknowledge_fire_alarm(&self) -> bool {
        fire_alarm::enqueue(&self.ctx, FireAlarmCommand::Ack).await
    }

    pub async fn switch_plug(&self, state: PlugState) -> bool {
        match self
            .ctx
            .write(Channel::PLUG_COMMAND, state.to_command_text())
            .await
        {
            Ok(()) => true,
            Err(err) => {
                self.ctx.record_failure(Device::Plug, &err).await;
                false
            }
        }
    }

    pub async fn set_setpoint(&self, setpoint: f64) -> bool {
        if !setpoint.is_finite() {
            tracing::warn!(setpoint, "ignoring non-finite setpoint");
            return false;
        }
        self.enqueue_thermostat("setpoint", &setpoint.to_string())
            .await
    }

    pub async fn set_mode(&self, mode: ThermostatMode) -> bool {
        self.enqueue_thermostat("mode", mode.as_str()).await
    }

    /// Merge one `key=value` line into the pending thermostat command, so a
    /// setpoint and a mode issued between two ticks are both applied.
    async fn enqueue_thermostat(&self, key: &str, value: &str) -> bool {
        let result = async {
            let pending = self.ctx.read_text(Channel::THERMOSTAT_COMMAND).await?;
            let command = merge_line(&pending, key, value);
            self.ctx.write(Channel::THERMOSTAT_COMMAND, command).await
        }
        .await;
        match result {
            Ok(()) => true,
            Err(err) => {
                self.ctx.record_failure(Device::Thermostat, &err).await;
                false
            }
        }
    }
}

fn merge_line(pending: &str, key: &str, value: &str) -> String {
    let mut lines: Vec<String> = pending
        .lines()
        .map(str::trim)
        .filter(|line| {
            !line.is_empty()
                && line
                    .split_once('=')
                    .is_none_or(|(k, _)| !k.trim().eq_ignore_ascii_case(key))
        })
        .map(str::to_string)
        .collect();
    lines.push(format!("{key}={value}"));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::clock::ManualClock;
    use crate::memory::{MemoryChannelStore, MemoryEventLog};

    fn setup() -> (
        CommandIssuer<Arc<MemoryChannelStore>, Arc<MemoryEventLog>, ManualClock>,
        Arc<MemoryChannelStore>,
        Arc<MemoryEventLog>,
    ) {
        let store = Arc::new(MemoryChannelStore::new());
        let log = Arc::new(MemoryEventLog::new());
        let issuer = CommandIssuer::new(Arc::clone(&store), Arc::clone(&log), ManualClock::default());
        (issuer, store, log)
    }

    #[tokio::test]
    async fn should_overwrite_pending_lock_command() {
        let (issuer, store, _) = setup();
        assert!(issuer.lock().await);
        assert!(issuer.toggle().await);
        assert_eq!(store.value(Channel::LOCK_COMMAND).as_deref(), Some("TOGGLE"));
    }

    #[tokio::test]
    async fn should_write_alert_immediately() {
        let (issuer, store, log) = setup();
        assert!(issuer.report_forced_entry().await);
        assert_eq!(store.value(Channel::LOCK_STATUS).as_deref(), Some("ALERT"));
        assert_eq!(store.value(Channel::LOCK_ALERT).as_deref(), Some("FORCED_ENTRY"));
        assert_eq!(
            log.messages(Device::Lock),
            vec!["FORCED ENTRY detected! Door is in ALERT state."]
        );

        assert!(issuer.clear_alert().await);
        assert_eq!(store.value(Channel::LOCK_STATUS).as_deref(), Some("LOCKED"));
        assert_eq!(store.value(Channel::LOCK_ALERT).as_deref(), Some("NONE"));
    }

    #[tokio::test]
    async fn should_press_and_answer_doorbell() {
        let (issuer, store, _) = setup();
        assert!(issuer.press_doorbell().await);
        assert_eq!(store.value(Channel::DOORBELL_STATUS).as_deref(), Some("RING"));
        assert!(issuer.mute_doorbell().await);
        assert_eq!(store.value(Channel::DOORBELL_COMMAND).as_deref(), Some("MUTE"));
    }

    #[tokio::test]
    async fn should_write_fire_channels() {
        let (issuer, store, _) = setup();
        assert!(issuer.report_smoke(72.5).await);
        assert!(issuer.acknowledge_fire_alarm().await);
        assert_eq!(store.value(Channel::FIRE_SMOKE).as_deref(), Some("72.5"));
        assert_eq!(store.value(Channel::FIRE_COMMAND).as_deref(), Some("ACK"));
    }

    #[tokio::test]
    async fn should_write_plug_command() {
        let (issuer, store, _) = setup();
        assert!(issuer.switch_plug(PlugState::On).await);
        assert_eq!(store.value(Channel::PLUG_COMMAND).as_deref(), Some("cmd=ON"));
    }

    #[tokio::test]
    async fn should_merge_thermostat_commands_issued_between_ticks() {
        let (issuer, store, _) = setup();
        assert!(issuer.set_setpoint(22.0).await);
        assert!(issuer.set_mode(ThermostatMode::Cool).await);
        assert!(issuer.set_setpoint(23.5).await);
        assert_eq!(
            store.value(Channel::THERMOSTAT_COMMAND).as_deref(),
            Some("mode=COOL\nsetpoint=23.5")
        );
    }

    #[tokio::test]
    async fn should_reject_non_finite_setpoint() {
        let (issuer, store, _) = setup();
        assert!(!issuer.set_setpoint(f64::NAN).await);
        assert_eq!(store.value(Channel::THERMOSTAT_COMMAND), None);
    }

    #[test]
    fn should_replace_existing_key_when_merging() {
        assert_eq!(merge_line("", "mode", "HEAT"), "mode=HEAT");
        assert_eq!(
            merge_line("setpoint=20\nMODE=OFF", "mode", "HEAT"),
            "setpoint=20\nmode=HEAT"
        );
    }
}
