use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::service::ServiceError;
use crate::state::Place;

/// Oldest entries beyond this are dropped.
pub const HISTORY_LIMIT: usize = 20;

/// Previously chosen places in a JSON file, most recent first, unique by label.
#[derive(Clone, Debug)]
pub struct HistoryStore {
    path: PathBuf,
    // Serializes read-modify-write cycles between concurrent tasks
    lock: Arc<Mutex<()>>,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Vec<Place>, ServiceError> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    /// Put `place` at the front, replacing an entry with the same label.
    pub async fn remember(&self, place: Place) -> Result<(), ServiceError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read().await?;
        entries.retain(|entry| entry.label != place.label);
        entries.insert(0, place);
        entries.truncate(HISTORY_LIMIT);
        self.write(&entries).await
    }

    /// Returns whether an entry was removed.
    pub async fn delete(&self, label: &str) -> Result<bool, ServiceError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read().await?;
        let before = entries.len();
        entries.retain(|entry| entry.label != label);
        if entries.len() == before {
            return Ok(false);
        }
        self.write(&entries).await?;
        Ok(true)
    }

    async fn read(&self) -> Result<Vec<Place>, ServiceError> {
        let json = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&json)?)
    }

    async fn write(&self, entries: &[Place]) -> Result<(), ServiceError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

/// `<data dir>/locsearch/history.json`, or the working directory without one.
pub fn default_history_path() -> PathBuf {
    dirs_next::data_local_dir()
        .map(|dir| dir.join("locsearch"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("history.json")
}
