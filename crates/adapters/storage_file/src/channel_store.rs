//! File implementation of [`ChannelStore`].

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use homewatch_app::ports::ChannelStore;
use homewatch_domain::channel::Channel;
use homewatch_domain::error::HomeWatchError;

use crate::error::StorageError;

/// One `<key>.txt` file per channel in a single directory.
///
/// A missing file reads as `None`. Writes go to a uniquely named temporary
/// file that is then renamed over the target, so concurrent readers see
/// either the old or the new value.
#[derive(Debug, Clone)]
pub struct FileChannelStore {
    dir: PathBuf,
    writes: Arc<AtomicU64>,
}

impl FileChannelStore {
    /// Use `dir` as the channel directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|err| StorageError::io(&dir, err))?;
        Ok(Self {
            dir,
            writes: Arc::new(AtomicU64::new(0)),
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `channel`.
    #[must_use]
    pub fn path(&self, channel: Channel) -> PathBuf {
        self.dir.join(format!("{}.txt", channel.key()))
    }

    fn temp_path(&self, channel: Channel) -> PathBuf {
        let seq = self.writes.fetch_add(1, Ordering::Relaxed);
        self.dir
            .join(format!(".{}.{}.{seq}.tmp", channel.key(), std::process::id()))
    }
}

impl ChannelStore for FileChannelStore {
    fn get(
        &self,
        channel: Channel,
    ) -> impl Future<Output = Result<Option<String>, HomeWatchError>> + Send {
        let path = self.path(channel);
        async move {
            match tokio::fs::read_to_string(&path).await {
                Ok(text) => Ok(Some(text)),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(err) => Err(StorageError::io(path, err).into()),
            }
        }
    }

    fn set(
        &self,
        channel: Channel,
        value: &str,
    ) -> impl Future<Output = Result<(), HomeWatchError>> + Send {
        let path = self.path(channel);
        let temp = self.temp_path(channel);
        let value = value.to_string();
        async move {
            tokio::fs::write(&temp, value)
                .await
                .map_err(|err| StorageError::io(&temp, err))?;
            if let Err(err) = tokio::fs::rename(&temp, &path).await {
                let _ = tokio::fs::remove_file(&temp).await;
                return Err(StorageError::io(path, err).into());
            }
            tracing::trace!(channel = %channel, "channel file replaced");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn setup() -> (FileChannelStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = FileChannelStore::open(dir.path()).await.unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn should_return_none_when_file_is_missing() {
        let (store, _dir) = setup().await;
        assert_eq!(store.get(Channel::LOCK_STATUS).await.unwrap(), None);
    }

    #[tokio::test]
    async fn should_write_value_into_key_named_file() {
        let (store, dir) = setup().await;
        store.set(Channel::LOCK_COMMAND, "TOGGLE").await.unwrap();
        let on_disk = std::fs::read_to_string(dir.path().join("lock_cmd.txt")).unwrap();
        assert_eq!(on_disk, "TOGGLE");
    }

    #[tokio::test]
    async fn should_read_files_written_by_other_tools() {
        let (store, dir) = setup().await;
        std::fs::write(dir.path().join("doorbell_status.txt"), "RING\r\n").unwrap();
        assert_eq!(
            store.get(Channel::DOORBELL_STATUS).await.unwrap().as_deref(),
            Some("RING\r\n")
        );
    }

    #[tokio::test]
    async fn should_leave_no_temporary_files_behind() {
        let (store, dir) = setup().await;
        for value in ["LOCK", "UNLOCK", ""] {
            store.set(Channel::LOCK_COMMAND, value).await.unwrap();
        }
        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["lock_cmd.txt".to_string()]);
        assert_eq!(store.get(Channel::LOCK_COMMAND).await.unwrap().as_deref(), Some(""));
    }

    #[tokio::test]
    async fn should_create_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileChannelStore::open(&nested).await.unwrap();
        store.set(Channel::PLUG_STATUS, "state=ON").await.unwrap();
        assert!(nested.join("plug_status.txt").exists());
    }
}
