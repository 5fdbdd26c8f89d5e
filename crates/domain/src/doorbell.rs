//! Doorbell tokens and timing constants.
//!
//! `RING` is written by the bell button (an external actor). The controller
//! answers with `NORMAL` on acknowledge, `MUTED` on mute, or reports a
//! missed ring once [`RING_DURATION`] passes without an answer. `MISSED` is
//! transient: it is written and immediately replaced by `NORMAL`.

use std::time::Duration;

use crate::token::define_token;

/// How long a ring may go unanswered before it counts as missed.
pub const RING_DURATION: Duration = Duration::from_secs(10);

/// How long `MUTED` is held before the bell returns to `NORMAL`.
pub const MUTE_HOLD: Duration = Duration::from_secs(3);

/// Minimum spacing of the "still ringing" notice.
pub const RINGING_NOTICE_INTERVAL: Duration = Duration::from_secs(1);

define_token! {
    /// Persisted doorbell status.
    #[derive(Default)]
    DoorbellStatus ("doorbell status") {
        /// Idle.
        #[default]
        Normal => "NORMAL",
        /// Someone pressed the button; waiting for an answer.
        Ring => "RING",
        /// Sound suppressed, visual alert held for [`MUTE_HOLD`].
        Muted => "MUTED",
        /// Nobody answered in time.
        Missed => "MISSED",
    }
}

define_token! {
    /// Pending user command for the doorbell.
    DoorbellCommand ("doorbell command") {
        Ack => "ACK",
        Mute => "MUTE",
    }
}
