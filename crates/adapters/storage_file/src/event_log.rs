//! File implementation of [`EventLog`].

use std::future::Future;
use std::path::PathBuf;

use tokio::io::AsyncWriteExt;

use homewatch_app::ports::EventLog;
use homewatch_domain::channel::Device;
use homewatch_domain::error::HomeWatchError;
use homewatch_domain::event::LogEntry;

use crate::error::StorageError;

/// Appends `[YYYY-MM-DD HH:MM:SS] message` lines to `<device>_log.txt`.
#[derive(Debug, Clone)]
pub struct FileEventLog {
    dir: PathBuf,
}

impl FileEventLog {
    /// Use `dir` for the log files, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|err| StorageError::io(&dir, err))?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn path(&self, device: Device) -> PathBuf {
        self.dir.join(format!("{}_log.txt", device.prefix()))
    }

    /// Every line logged for `device` so far.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the log exists but cannot be read.
    pub async fn lines(&self, device: Device) -> Result<Vec<String>, HomeWatchError> {
        let path = self.path(device);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text.lines().map(str::to_string).collect()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(StorageError::io(path, err).into()),
        }
    }
}

impl EventLog for FileEventLog {
    fn append(&self, entry: LogEntry) -> impl Future<Output = Result<(), HomeWatchError>> + Send {
        let path = self.path(entry.device);
        let line = format!("{entry}\n");
        async move {
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .await
                .map_err(|err| StorageError::io(&path, err))?;
            file.write_all(line.as_bytes())
                .await
                .map_err(|err| StorageError::io(&path, err))?;
            file.flush()
                .await
                .map_err(|err| StorageError::io(&path, err))?;
            Ok(())
        }
    }
}
