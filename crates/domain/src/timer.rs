//! Controller-owned timers.
//!
//! A timer is a start timestamp plus an "active" flag, folded into a single
//! `Option`. Timers are checked against the injected clock on every tick;
//! nothing ever waits on them. They are never persisted.

use std::time::Duration;

use crate::time::Timestamp;

/// Wall-clock timer measured against externally supplied timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timer {
    started_at: Option<Timestamp>,
}

impl Timer {
    /// (Re)start the timer at `now`.
    pub fn start(&mut self, now: Timestamp) {
        self.started_at = Some(now);
    }

    pub fn stop(&mut self) {
        self.started_at = None;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.started_at.is_some()
    }

    #[must_use]
    pub fn started_at(&self) -> Option<Timestamp> {
        self.started_at
    }

    /// Time since the timer was started, or `None` when inactive.
    ///
    /// A clock that went backwards yields zero rather than a negative span.
    #[must_use]
    pub fn elapsed(&self, now: Timestamp) -> Option<Duration> {
        self.started_at
            .map(|start| (now - start).to_std().unwrap_or(Duration::ZERO))
    }

    /// Whether the timer is active and at least `limit` has passed.
    #[must_use]
    pub fn has_elapsed(&self, now: Timestamp, limit: Duration) -> bool {
        self.elapsed(now).is_some_and(|elapsed| elapsed >= limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Utc};

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn should_be_inactive_by_default() {
        let timer = Timer::default();
        assert!(!timer.is_active());
        assert_eq!(timer.elapsed(t0()), None);
    }

    #[test]
    fn should_measure_elapsed_time_since_start() {
        let mut timer = Timer::default();
        timer.start(t0());
        let later = t0() + TimeDelta::milliseconds(2500);
        assert_eq!(timer.elapsed(later), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn should_report_elapsed_inclusively_at_limit() {
        let mut timer = Timer::default();
        timer.start(t0());
        let limit = Duration::from_secs(3);
        assert!(!timer.has_elapsed(t0() + TimeDelta::milliseconds(2999), limit));
        assert!(timer.has_elapsed(t0() + TimeDelta::seconds(3), limit));
    }

    #[test]
    fn should_never_elapse_when_stopped() {
        let mut timer = Timer::default();
        timer.start(t0());
        timer.stop();
        assert!(!timer.has_elapsed(t0() + TimeDelta::hours(1), Duration::ZERO));
    }

    #[test]
    fn should_clamp_to_zero_when_clock_goes_backwards() {
        let mut timer = Timer::default();
        timer.start(t0());
        let earlier = t0() - TimeDelta::seconds(5);
        assert_eq!(timer.elapsed(earlier), Some(Duration::ZERO));
    }

    #[test]
    fn should_restart_from_new_timestamp() {
        let mut timer = Timer::default();
        timer.start(t0());
        let restart = t0() + TimeDelta::seconds(8);
        timer.start(restart);
        assert_eq!(timer.started_at(), Some(restart));
        assert!(!timer.has_elapsed(restart + TimeDelta::seconds(2), Duration::from_secs(3)));
    }
}
