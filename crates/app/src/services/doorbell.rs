//! Doorbell controller — NORMAL / RING / MUTED / MISSED.
//!
//! `RING` is written into `doorbell_status` by the bell button. The first
//! tick that sees it starts the ring timer and chimes. While ringing, each
//! tick takes exactly one path:
//!
//! - `ACK` pending: clear it, back to `NORMAL`.
//! - `MUTE` pending: clear it, switch to `MUTED` and start the mute hold.
//! - ring timer past [`RING_DURATION`]: log `MISSED`, then back to `NORMAL`.
//!
//! `MUTED` always expires to `NORMAL` after [`MUTE_HOLD`]. Timers are
//! compared against the injected clock; nothing waits on them.

use std::time::Duration;

use homewatch_domain::channel::{Channel, Device};
use homewatch_domain::doorbell::{
    DoorbellCommand, DoorbellStatus, MUTE_HOLD, RING_DURATION, RINGING_NOTICE_INTERVAL,
};
use homewatch_domain::error::HomeWatchError;
use homewatch_domain::time::Timestamp;
use homewatch_domain::timer::Timer;

use crate::ports::{Annunciator, ChannelStore, Clock, EventLog};
use crate::services::context::{DeviceContext, Slot};
use crate::services::outcome::TickOutcome;

/// Polling controller for the doorbell.
#[derive(Debug)]
pub struct DoorbellController<S, L, C, A> {
    ctx: DeviceContext<S, L, C>,
    annunciator: A,
    status: DoorbellStatus,
    ring_timer: Timer,
    mute_timer: Timer,
    last_notice: Option<Timestamp>,
}

impl<S, L, C, A> DoorbellController<S, L, C, A>
where
    S: ChannelStore,
    L: EventLog,
    C: Clock,
    A: Annunciator,
{
    pub fn new(store: S, log: L, clock: C, annunciator: A) -> Self {
        Self {
            ctx: DeviceContext::new(store, log, clock),
            annunciator,
            status: DoorbellStatus::default(),
            ring_timer: Timer::default(),
            mute_timer: Timer::default(),
            last_notice: None,
        }
    }

    #[must_use]
    pub fn status(&self) -> DoorbellStatus {
        self.status
    }

    #[must_use]
    pub fn is_ring_timer_active(&self) -> bool {
        self.ring_timer.is_active()
    }

    #[must_use]
    pub fn is_mute_timer_active(&self) -> bool {
        self.mute_timer.is_active()
    }

    /// Seed missing channels with their defaults and load the current status.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store cannot be read or written.
    pub async fn initialize(&mut self) -> Result<(), HomeWatchError> {
        self.ctx
            .seed(Channel::DOORBELL_STATUS, DoorbellStatus::default().as_str())
            .await?;
        self.ctx.seed(Channel::DOORBELL_COMMAND, "").await?;
        self.refresh().await
    }

    /// Enqueue an `ACK` command.
    pub async fn acknowledge(&self) {
        enqueue(&self.ctx, DoorbellCommand::Ack).await;
    }

    /// Enqueue a `MUTE` command.
    pub async fn mute(&self) {
        enqueue(&self.ctx, DoorbellCommand::Mute).await;
    }

    #[tracing::instrument(skip(self), fields(device = "doorbell"))]
    pub async fn tick(&mut self) -> TickOutcome<DoorbellStatus> {
        match self.try_tick().await {
            Ok(outcome) => outcome,
            Err(err) => {
                self.ctx.record_failure(Device::Doorbell, &err).await;
                TickOutcome::Aborted
            }
        }
    }

    async fn try_tick(&mut self) -> Result<TickOutcome<DoorbellStatus>, HomeWatchError> {
        self.refresh().await?;
        let now = self.ctx.now();

        match self.status {
            DoorbellStatus::Ring => self.tick_ringing(now).await,
            DoorbellStatus::Muted if self.mute_timer.is_active() => self.tick_muted(now).await,
            DoorbellStatus::Muted => {
                // MUTED written by someone else: hold it from now on.
                self.mute_timer.start(now);
                self.ring_timer.stop();
                Ok(TickOutcome::Idle)
            }
            DoorbellStatus::Normal | DoorbellStatus::Missed => {
                self.ring_timer.stop();
                Ok(TickOutcome::Idle)
            }
        }
    }

    async fn tick_ringing(
        &mut self,
        now: Timestamp,
    ) -> Result<TickOutcome<DoorbellStatus>, HomeWatchError> {
        if !self.ring_timer.is_active() {
            self.ring_timer.start(now);
            self.last_notice = None;
            self.ctx
                .record(Device::Doorbell, "Ring detected. Starting 10-second window.")
                .await;
            self.annunciator.chime(Device::Doorbell);
        }

        match self
            .ctx
            .read::<DoorbellCommand>(Channel::DOORBELL_COMMAND)
            .await?
        {
            Slot::Value(DoorbellCommand::Ack) => {
                self.ctx.clear(Channel::DOORBELL_COMMAND).await?;
                self.ctx
                    .write(Channel::DOORBELL_STATUS, DoorbellStatus::Normal)
                    .await?;
                self.status = DoorbellStatus::Normal;
                self.ring_timer.stop();
                self.mute_timer.stop();
                self.ctx
                    .record(Device::Doorbell, "Doorbell ACK: ring stopped, status NORMAL.")
                    .await;
                return Ok(TickOutcome::Transition {
                    from: DoorbellStatus::Ring,
                    to: DoorbellStatus::Normal,
                });
            }
            Slot::Value(DoorbellCommand::Mute) => {
                self.ctx.clear(Channel::DOORBELL_COMMAND).await?;
                self.ctx
                    .write(Channel::DOORBELL_STATUS, DoorbellStatus::Muted)
                    .await?;
                self.status = DoorbellStatus::Muted;
                self.mute_timer.start(now);
                self.ring_timer.stop();
                self.ctx
                    .record(Device::Doorbell, "Doorbell MUTE: sound off, visual alert MUTED.")
                    .await;
                return Ok(TickOutcome::Transition {
                    from: DoorbellStatus::Ring,
                    to: DoorbellStatus::Muted,
                });
            }
            Slot::Malformed(token) => {
                tracing::debug!(token = %token, "ignoring unrecognized doorbell command");
            }
            Slot::Empty => {}
        }

        if self.ring_timer.has_elapsed(now, RING_DURATION) {
            self.ctx
                .write(Channel::DOORBELL_STATUS, DoorbellStatus::Missed)
                .await?;
            self.ctx
                .record(Device::Doorbell, "No ACK/MUTE within 10s -> MISSED.")
                .await;
            self.ctx
                .write(Channel::DOORBELL_STATUS, DoorbellStatus::Normal)
                .await?;
            self.status = DoorbellStatus::Normal;
            self.ring_timer.stop();
            self.mute_timer.stop();
            return Ok(TickOutcome::Transition {
                from: DoorbellStatus::Ring,
                to: DoorbellStatus::Normal,
            });
        }

        self.notice_ringing(now);
        Ok(TickOutcome::Idle)
    }

    async fn tick_muted(
        &mut self,
        now: Timestamp,
    ) -> Result<TickOutcome<DoorbellStatus>, HomeWatchError> {
        if !self.mute_timer.has_elapsed(now, MUTE_HOLD) {
            return Ok(TickOutcome::Idle);
        }
        self.ctx
            .write(Channel::DOORBELL_STATUS, DoorbellStatus::Normal)
            .await?;
        self.status = DoorbellStatus::Normal;
        self.mute_timer.stop();
        self.ctx
            .record(Device::Doorbell, "Mute finished. Reset to NORMAL.")
            .await;
        Ok(TickOutcome::Transition {
            from: DoorbellStatus::Muted,
            to: DoorbellStatus::Normal,
        })
    }

    fn notice_ringing(&mut self, now: Timestamp) {
        let due = self.last_notice.is_none_or(|last| {
            (now - last).to_std().unwrap_or(Duration::ZERO) >= RINGING_NOTICE_INTERVAL
        });
        if due {
            self.last_notice = Some(now);
            tracing::info!("ringing, waiting for ACK or MUTE");
        }
    }

    async fn refresh(&mut self) -> Result<(), HomeWatchError> {
        match self
            .ctx
            .read::<DoorbellStatus>(Channel::DOORBELL_STATUS)
            .await?
        {
            Slot::Empty => self.status = DoorbellStatus::default(),
            Slot::Value(status) => self.status = status,
            Slot::Malformed(token) => {
                tracing::warn!(token = %token, kept = %self.status, "malformed doorbell status");
            }
        }
        Ok(())
    }
}

pub(crate) async fn enqueue<S: ChannelStore, L: EventLog, C: Clock>(
    ctx: &DeviceContext<S, L, C>,
    command: DoorbellCommand,
) -> bool {
    match ctx.write(Channel::DOORBELL_COMMAND, command).await {
        Ok(()) => {
            tracing::debug!(command = %command, "doorbell command enqueued");
            true
        }
        Err(err) => {
            ctx.record_failure(Device::Doorbell, &err).await;
            false
        }
    }
}
