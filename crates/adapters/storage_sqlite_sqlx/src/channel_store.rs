//! `SQLite` implementation of [`ChannelStore`].
//!
//! One row per channel key. Writes are single-statement upserts, so a reader
//! never sees a half-written value.

use std::future::Future;

use sqlx::SqlitePool;

use homewatch_app::ports::ChannelStore;
use homewatch_domain::channel::Channel;
use homewatch_domain::error::HomeWatchError;

use crate::error::StorageError;

const SELECT_BY_KEY: &str = "SELECT value FROM channels WHERE key = ?";
const UPSERT: &str = r"
    INSERT INTO channels (key, value, updated_at)
    VALUES (?, ?, ?)
    ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
";

/// `SQLite`-backed channel store.
#[derive(Debug, Clone)]
pub struct SqliteChannelStore {
    pool: SqlitePool,
}

impl SqliteChannelStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ChannelStore for SqliteChannelStore {
    fn get(
        &self,
        channel: Channel,
    ) -> impl Future<Output = Result<Option<String>, HomeWatchError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<(String,)> = sqlx::query_as(SELECT_BY_KEY)
                .bind(channel.key())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|(value,)| value))
        }
    }

    fn set(
        &self,
        channel: Channel,
        value: &str,
    ) -> impl Future<Output = Result<(), HomeWatchError>> + Send {
        let pool = self.pool.clone();
        let value = value.to_string();
        async move {
            sqlx::query(UPSERT)
                .bind(channel.key())
                .bind(value)
                .bind(homewatch_domain::time::now().to_rfc3339())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;

    async fn setup() -> SqliteChannelStore {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        db.channel_store()
    }

    #[tokio::test]
    async fn should_return_none_when_channel_was_never_written() {
        let store = setup().await;
        assert_eq!(store.get(Channel::LOCK_STATUS).await.unwrap(), None);
    }

    #[tokio::test]
    async fn should_overwrite_previous_value() {
        let store = setup().await;
        store.set(Channel::LOCK_COMMAND, "LOCK").await.unwrap();
        store.set(Channel::LOCK_COMMAND, "TOGGLE").await.unwrap();
        assert_eq!(
            store.get(Channel::LOCK_COMMAND).await.unwrap().as_deref(),
            Some("TOGGLE")
        );
    }

    #[tokio::test]
    async fn should_keep_empty_string_distinct_from_missing() {
        let store = setup().await;
        store.set(Channel::DOORBELL_COMMAND, "").await.unwrap();
        assert_eq!(
            store.get(Channel::DOORBELL_COMMAND).await.unwrap().as_deref(),
            Some("")
        );
        assert_eq!(store.get(Channel::DOORBELL_STATUS).await.unwrap(), None);
    }

    #[tokio::test]
    async fn should_store_multiline_payloads() {
        let store = setup().await;
        let payload = "temp=21\nhum=40\nsetpoint=22\nmode=HEAT";
        store.set(Channel::THERMOSTAT_STATUS, payload).await.unwrap();
        assert_eq!(
            store.get(Channel::THERMOSTAT_STATUS).await.unwrap().as_deref(),
            Some(payload)
        );
    }
}
