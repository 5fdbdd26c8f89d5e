//! Scheduler — ticks every enabled controller on a fixed cadence.
//!
//! Controllers are ticked one after the other in a fixed order (lock,
//! doorbell, fire alarm, thermostat, plug). A controller whose tick fails has
//! already logged the failure; the round carries on with the next one.

use std::time::Duration;

use homewatch_domain::doorbell::DoorbellStatus;
use homewatch_domain::error::HomeWatchError;
use homewatch_domain::fire_alarm::FireAlarmStatus;
use homewatch_domain::lock::LockStatus;
use homewatch_domain::plug::PlugState;
use homewatch_domain::thermostat::ThermostatReading;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::ports::{Annunciator, ChannelStore, Clock, EventLog};
use crate::services::door_lock::DoorLockController;
use crate::services::doorbell::DoorbellController;
use crate::services::fire_alarm::FireAlarmController;
use crate::services::plug::PlugController;
use crate::services::thermostat::ThermostatController;
use crate::services::TickOutcome;

/// Outcome of one scheduling round. Disabled controllers report `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub lock: Option<TickOutcome<LockStatus>>,
    pub doorbell: Option<TickOutcome<DoorbellStatus>>,
    pub fire_alarm: Option<TickOutcome<FireAlarmStatus>>,
    pub thermostat: Option<TickOutcome<ThermostatReading>>,
    pub plug: Option<TickOutcome<PlugState>>,
}

impl TickReport {
    /// Number of controllers whose status changed this round.
    #[must_use]
    pub fn transitions(&self) -> usize {
        [
            self.lock.as_ref().is_some_and(TickOutcome::is_transition),
            self.doorbell.as_ref().is_some_and(TickOutcome::is_transition),
            self.fire_alarm.as_ref().is_some_and(TickOutcome::is_transition),
            self.thermostat.as_ref().is_some_and(TickOutcome::is_transition),
            self.plug.as_ref().is_some_and(TickOutcome::is_transition),
        ]
        .into_iter()
        .filter(|changed| *changed)
        .count()
    }
}

#[derive(Debug)]
pub struct Scheduler<S, L, C, A> {
    lock: Option<DoorLockController<S, L, C>>,
    doorbell: Option<DoorbellController<S, L, C, A>>,
    fire_alarm: Option<FireAlarmController<S, L, C>>,
    thermostat: Option<ThermostatController<S, L, C>>,
    plug: Option<PlugController<S, L, C>>,
}

impl<S, L, C, A> Default for Scheduler<S, L, C, A> {
    fn default() -> Self {
        Self {
            lock: None,
            doorbell: None,
            fire_alarm: None,
            thermostat: None,
            plug: None,
        }
    }
}

impl<S, L, C, A> Scheduler<S, L, C, A>
where
    S: ChannelStore,
    L: EventLog,
    C: Clock,
    A: Annunciator,
{
    /// An empty scheduler; enable controllers with the `with_*` builders.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A scheduler with every controller enabled over the same ports.
    pub fn all_devices(store: S, log: L, clock: C, annunciator: A) -> Self
    where
        S: Clone,
        L: Clone,
        C: Clone,
    {
        Self::new()
            .with_door_lock(DoorLockController::new(
                store.clone(),
                log.clone(),
                clock.clone(),
            ))
            .with_doorbell(DoorbellController::new(
                store.clone(),
                log.clone(),
                clock.clone(),
                annunciator,
            ))
            .with_fire_alarm(FireAlarmController::new(
                store.clone(),
                log.clone(),
                clock.clone(),
            ))
            .with_thermostat(ThermostatController::new(
                store.clone(),
                log.clone(),
                clock.clone(),
            ))
            .with_plug(PlugController::new(store, log, clock))
    }

    #[must_use]
    pub fn with_door_lock(mut self, controller: DoorLockController<S, L, C>) -> Self {
        self.lock = Some(controller);
        self
    }

    #[must_use]
    pub fn with_doorbell(mut self, controller: DoorbellController<S, L, C, A>) -> Self {
        self.doorbell = Some(controller);
        self
    }

    #[must_use]
    pub fn with_fire_alarm(mut self, controller: FireAlarmController<S, L, C>) -> Self {
        self.fire_alarm = Some(controller);
        self
    }

    #[must_use]
    pub fn with_thermostat(mut self, controller: ThermostatController<S, L, C>) -> Self {
        self.thermostat = Some(controller);
        self
    }

    #[must_use]
    pub fn with_plug(mut self, controller: PlugController<S, L, C>) -> Self {
        self.plug = Some(controller);
        self
    }

    #[must_use]
    pub fn door_lock(&self) -> Option<&DoorLockController<S, L, C>> {
        self.lock.as_ref()
    }

    #[must_use]
    pub fn doorbell(&self) -> Option<&DoorbellController<S, L, C, A>> {
        self.doorbell.as_ref()
    }

    #[must_use]
    pub fn fire_alarm(&self) -> Option<&FireAlarmController<S, L, C>> {
        self.fire_alarm.as_ref()
    }

    #[must_use]
    pub fn thermostat(&self) -> Option<&ThermostatController<S, L, C>> {
        self.thermostat.as_ref()
    }

    #[must_use]
    pub fn plug(&self) -> Option<&PlugController<S, L, C>> {
        self.plug.as_ref()
    }

    /// Seed the channels of every enabled controller.
    ///
    /// # Errors
    ///
    /// Returns the first storage error; controllers after it are left
    /// uninitialized.
    pub async fn initialize(&mut self) -> Result<(), HomeWatchError> {
        if let Some(lock) = self.lock.as_mut() {
            lock.initialize().await?;
        }
        if let Some(doorbell) = self.doorbell.as_mut() {
            doorbell.initialize().await?;
        }
        if let Some(fire_alarm) = self.fire_alarm.as_mut() {
            fire_alarm.initialize().await?;
        }
        if let Some(thermostat) = self.thermostat.as_mut() {
            thermostat.initialize().await?;
        }
        if let Some(plug) = self.plug.as_mut() {
            plug.initialize().await?;
        }
        Ok(())
    }

    /// Run one round over every enabled controller.
    pub async fn tick_all(&mut self) -> TickReport {
        let mut report = TickReport::default();
        if let Some(lock) = self.lock.as_mut() {
            report.lock = Some(lock.tick().await);
        }
        if let Some(doorbell) = self.doorbell.as_mut() {
            report.doorbell = Some(doorbell.tick().await);
        }
        if let Some(fire_alarm) = self.fire_alarm.as_mut() {
            report.fire_alarm = Some(fire_alarm.tick().await);
        }
        if let Some(thermostat) = self.thermostat.as_mut() {
            report.thermostat = Some(thermostat.tick().await);
        }
        if let Some(plug) = self.plug.as_mut() {
            report.plug = Some(plug.tick().await);
        }
        report
    }

    /// Tick every `period` until `shutdown` turns `true` or its sender is
    /// dropped. The first round runs immediately. Returns the number of
    /// completed rounds.
    pub async fn run(&mut self, period: Duration, mut shutdown: watch::Receiver<bool>) -> u64 {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(period_ms = period.as_millis(), "scheduler started");

        let mut rounds = 0;
        loop {
            if *shutdown.borrow_and_update() {
                break;
            }
            tokio::select! {
                _ = interval.tick() => {
                    let report = self.tick_all().await;
                    rounds += 1;
                    tracing::trace!(round = rounds, transitions = report.transitions(), "round completed");
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        tracing::info!(rounds, "scheduler stopped");
        rounds
    }
}
