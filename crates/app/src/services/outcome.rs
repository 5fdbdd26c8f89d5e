//! Result of a single controller tick.

/// What a tick did. Ticks never fail; failures show up as
/// [`Aborted`](Self::Aborted) after being logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome<S> {
    /// Nothing pending, nothing expired.
    Idle,
    /// Status changed and was persisted.
    Transition { from: S, to: S },
    /// A command was consumed but the status already matched it.
    Unchanged,
    /// The device refuses commands in its current state (lock in `ALERT`).
    Blocked,
    /// An unrecognized command token was ignored.
    Dropped(String),
    /// The store failed; the tick was abandoned.
    Aborted,
}

impl<S> TickOutcome<S> {
    #[must_use]
    pub fn is_transition(&self) -> bool {
        matches!(self, Self::Transition { .. })
    }
}
