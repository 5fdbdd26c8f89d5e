//! # homewatch-adapter-storage-file
//!
//! Plain-text file persistence, compatible with the layout other tools of a
//! home installation read and write directly:
//!
//! ```text
//! <data_dir>/lock_status.txt      LOCKED
//! <data_dir>/lock_cmd.txt         (empty when nothing is pending)
//! <data_dir>/thermo_status.txt    temp=21\nhum=40\nsetpoint=22\nmode=HEAT
//! <data_dir>/lock_log.txt         [2025-06-01 18:30:00] Door locked by command.
//! ```
//!
//! ## Responsibilities
//! - Implement `ChannelStore` with one `<key>.txt` file per channel
//! - Implement `EventLog` with one `<device>_log.txt` file per device
//! - Replace channel files atomically (write to a temporary file, then rename)
//!
//! ## Dependency rule
//! Depends on `homewatch-app` (for port traits) and `homewatch-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod channel_store;
mod error;
mod event_log;

pub use channel_store::FileChannelStore;
pub use error::StorageError;
pub use event_log::FileEventLog;
