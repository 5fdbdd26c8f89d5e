//! # homewatch-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `ChannelStore` and `EventLog` ports defined in `homewatch-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `homewatch-app` (for port traits) and `homewatch-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod channel_store;
mod error;
mod event_log;
mod pool;

pub use channel_store::SqliteChannelStore;
pub use error::StorageError;
pub use event_log::SqliteEventLog;
pub use pool::{Config, Database};
