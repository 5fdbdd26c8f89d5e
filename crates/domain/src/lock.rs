//! Door lock tokens and transition rules.
//!
//! The lock has three statuses. `ALERT` is entered only through a
//! forced-entry report and stays until the alert is explicitly cleared;
//! while in `ALERT` user commands are ignored.

use crate::token::define_token;

define_token! {
    /// Persisted door lock status.
    #[derive(Default)]
    LockStatus ("lock status") {
        #[default]
        Locked => "LOCKED",
        Unlocked => "UNLOCKED",
        /// Forced entry detected; sticky until cleared.
        Alert => "ALERT",
    }
}

define_token! {
    /// Pending user command for the door lock.
    LockCommand ("lock command") {
        Lock => "LOCK",
        Unlock => "UNLOCK",
        Toggle => "TOGGLE",
    }
}

define_token! {
    /// Alert flag stored beside the lock status.
    #[derive(Default)]
    AlertState ("alert state") {
        #[default]
        None => "NONE",
        ForcedEntry => "FORCED_ENTRY",
    }
}

impl LockStatus {
    /// Status after applying `command` to a non-alert lock.
    ///
    /// `TOGGLE` unlocks a locked door and locks anything else.
    #[must_use]
    pub fn after(self, command: LockCommand) -> Self {
        match command {
            LockCommand::Lock => Self::Locked,
            LockCommand::Unlock => Self::Unlocked,
            LockCommand::Toggle => match self {
                Self::Locked => Self::Unlocked,
                Self::Unlocked | Self::Alert => Self::Locked,
            },
        }
    }

    #[must_use]
    pub fn is_alert(self) -> bool {
        matches!(self, Self::Alert)
    }
}
