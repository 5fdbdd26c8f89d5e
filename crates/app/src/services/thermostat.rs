//! Thermostat controller.
//!
//! Merges the status payload into the last known reading, applies any
//! `setpoint`/`mode` lines from the command payload, rewrites the status and
//! clears the command.

use homewatch_domain::channel::{Channel, Device};
use homewatch_domain::error::HomeWatchError;
use homewatch_domain::thermostat::ThermostatReading;

use crate::ports::{ChannelStore, Clock, EventLog};
use crate::services::context::DeviceContext;
use crate::services::outcome::TickOutcome;

#[derive(Debug)]
pub struct ThermostatController<S, L, C> {
    ctx: DeviceContext<S, L, C>,
    reading: ThermostatReading,
}

impl<S: ChannelStore, L: EventLog, C: Clock> ThermostatController<S, L, C> {
    pub fn new(store: S, log: L, clock: C) -> Self {
        Self {
            ctx: DeviceContext::new(store, log, clock),
            reading: ThermostatReading::default(),
        }
    }

    #[must_use]
    pub fn reading(&self) -> ThermostatReading {
        self.reading
    }

    /// # Errors
    ///
    /// Returns a storage error if the store cannot be read or written.
    pub async fn initialize(&mut self) -> Result<(), HomeWatchError> {
        self.ctx
            .seed(Channel::THERMOSTAT_STATUS, &self.reading.to_status_text())
            .await?;
        self.ctx.seed(Channel::THERMOSTAT_COMMAND, "").await
    }

    #[tracing::instrument(skip(self), fields(device = "thermo"))]
    pub async fn tick(&mut self) -> TickOutcome<ThermostatReading> {
        match self.try_tick().await {
            Ok(outcome) => outcome,
            Err(err) => {
                self.ctx.record_failure(Device::Thermostat, &err).await;
                TickOutcome::Aborted
            }
        }
    }

    async fn try_tick(&mut self) -> Result<TickOutcome<ThermostatReading>, HomeWatchError> {
        let status = self.ctx.read_text(Channel::THERMOSTAT_STATUS).await?;
        self.reading.merge_status(&status);

        let command = self.ctx.read_text(Channel::THERMOSTAT_COMMAND).await?;
        if command.is_empty() {
            return Ok(TickOutcome::Idle);
        }
        self.ctx.clear(Channel::THERMOSTAT_COMMAND).await?;

        let from = self.reading;
        let mut to = from;
        if to.apply_command(&command) == 0 {
            tracing::debug!(command = %command, "dropping unrecognized thermostat command");
            return Ok(TickOutcome::Dropped(command));
        }
        if to == from {
            return Ok(TickOutcome::Unchanged);
        }

        self.ctx
            .write(Channel::THERMOSTAT_STATUS, to.to_status_text())
            .await?;
        self.reading = to;
        self.ctx
            .record(
                Device::Thermostat,
                format!("Thermostat set to {} with setpoint {}.", to.mode, to.setpoint),
            )
            .await;
        Ok(TickOutcome::Transition { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use homewatch_domain::thermostat::ThermostatMode;

    use crate::clock::ManualClock;
    use crate::memory::{MemoryChannelStore, MemoryEventLog};

    type Controller =
        ThermostatController<Arc<MemoryChannelStore>, Arc<MemoryEventLog>, ManualClock>;

    fn setup() -> (Controller, Arc<MemoryChannelStore>, Arc<MemoryEventLog>) {
        let store = Arc::new(
            MemoryChannelStore::new()
                .with(Channel::THERMOSTAT_STATUS, "temp=20\nhum=45\nsetpoint=21\nmode=OFF"),
        );
        let log = Arc::new(MemoryEventLog::new());
        let thermostat =
            ThermostatController::new(Arc::clone(&store), Arc::clone(&log), ManualClock::default());
        (thermostat, store, log)
    }

    #[tokio::test]
    async fn should_pick_up_sensor_values_without_command() {
        let (mut thermostat, _, _) = setup();
        assert_eq!(thermostat.tick().await, TickOutcome::Idle);
        assert!((thermostat.reading().temperature - 20.0).abs() < f64::EPSILON);
        assert!((thermostat.reading().humidity - 45.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn should_apply_setpoint_and_mode() {
        let (mut thermostat, store, log) = setup();
        store.put(Channel::THERMOSTAT_COMMAND, "setpoint=23.5\nmode=HEAT");
        assert!(thermostat.tick().await.is_transition());
        assert_eq!(
            store.value(Channel::THERMOSTAT_STATUS).as_deref(),
            Some("temp=20\nhum=45\nsetpoint=23.5\nmode=HEAT")
        );
        assert_eq!(store.value(Channel::THERMOSTAT_COMMAND).as_deref(), Some(""));
        assert_eq!(thermostat.reading().mode, ThermostatMode::Heat);
        assert_eq!(
            log.messages(Device::Thermostat),
            vec!["Thermostat set to HEAT with setpoint 23.5."]
        );
    }

    #[tokio::test]
    async fn should_drop_command_without_known_keys() {
        let (mut thermostat, store, _) = setup();
        store.put(Channel::THERMOSTAT_COMMAND, "fan=HIGH");
        assert_eq!(
            thermostat.tick().await,
            TickOutcome::Dropped("fan=HIGH".to_string())
        );
        assert_eq!(store.value(Channel::THERMOSTAT_COMMAND).as_deref(), Some(""));
    }

    #[tokio::test]
    async fn should_report_unchanged_when_values_already_match() {
        let (mut thermostat, store, _) = setup();
        store.put(Channel::THERMOSTAT_COMMAND, "setpoint=21");
        assert_eq!(thermostat.tick().await, TickOutcome::Unchanged);
    }
}
