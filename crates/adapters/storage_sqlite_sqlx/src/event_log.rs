//! `SQLite` implementation of [`EventLog`].

use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use homewatch_app::ports::EventLog;
use homewatch_domain::channel::Device;
use homewatch_domain::error::HomeWatchError;
use homewatch_domain::event::LogEntry;

use crate::error::StorageError;

struct Wrapper(LogEntry);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let device: String = row.try_get("device")?;
        let timestamp: String = row.try_get("timestamp")?;
        let message: String = row.try_get("message")?;

        let device = Device::from_str(&device).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let timestamp = chrono::DateTime::parse_from_rfc3339(&timestamp)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
            .to_utc();

        Ok(Self(LogEntry {
            timestamp,
            device,
            message,
        }))
    }
}

const INSERT: &str = "INSERT INTO event_log (device, timestamp, message) VALUES (?, ?, ?)";
const SELECT_RECENT_BY_DEVICE: &str = r"
    SELECT device, timestamp, message FROM (
        SELECT * FROM event_log WHERE device = ? ORDER BY id DESC LIMIT ?
    ) ORDER BY id ASC
";

/// `SQLite`-backed event log.
#[derive(Debug, Clone)]
pub struct SqliteEventLog {
    pool: SqlitePool,
}

impl SqliteEventLog {
    /// Create a new event log using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// The last `limit` entries of one device, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails or a row cannot be decoded.
    pub async fn recent(
        &self,
        device: Device,
        limit: usize,
    ) -> Result<Vec<LogEntry>, HomeWatchError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_RECENT_BY_DEVICE)
            .bind(device.prefix())
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}

impl EventLog for SqliteEventLog {
    fn append(&self, entry: LogEntry) -> impl Future<Output = Result<(), HomeWatchError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(entry.device.prefix())
                .bind(entry.timestamp.to_rfc3339())
                .bind(&entry.message)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }
}
