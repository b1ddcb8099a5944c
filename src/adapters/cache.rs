use crate::domain::model::Payload;
use crate::domain::ports::CacheStore;
use crate::utils::error::{BridgeError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// What the cache holds. Values are stored exactly as the application sent them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub progress: Option<Payload>,
    pub lives: Option<Payload>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    snapshot: Mutex<CacheSnapshot>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        self.snapshot
            .lock()
            .map(|snapshot| snapshot.clone())
            .unwrap_or_default()
    }

    fn update(&self, apply: impl FnOnce(&mut CacheSnapshot)) {
        if let Ok(mut snapshot) = self.snapshot.lock() {
            apply(&mut snapshot);
            snapshot.updated_at = Some(Utc::now());
        }
    }
}

impl CacheStore for MemoryCache {
    fn set_progress(&self, progress: &Payload) {
        self.update(|snapshot| snapshot.progress = Some(progress.clone()));
    }

    fn set_lives(&self, lives: &Payload) {
        self.update(|snapshot| snapshot.lives = Some(lives.clone()));
    }

    fn clear(&self) {
        if let Ok(mut snapshot) = self.snapshot.lock() {
            *snapshot = CacheSnapshot::default();
        }
    }
}

/// Cache persisted as a single JSON document.
///
/// Clones share one lock, so concurrent handlers never interleave their
/// read-modify-write cycles.
#[derive(Debug, Clone)]
pub struct FileCache {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FileCache {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 讀取目前的快取內容，檔案不存在時回傳空快取
    pub fn load(&self) -> Result<CacheSnapshot> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(CacheSnapshot::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    // 先寫暫存檔再 rename，避免留下寫到一半的檔案
    fn store(&self, snapshot: &CacheSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp = self.temp_path();
        fs::write(&temp, serde_json::to_vec_pretty(snapshot)?)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        match self.lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn update(&self, key: &str, apply: impl FnOnce(&mut CacheSnapshot)) {
        let _guard = self.guard();
        let current = match self.load() {
            Err(BridgeError::SerializationError(e)) => {
                tracing::warn!(
                    "⚠️ Cache file {} is unreadable ({}), starting from an empty cache",
                    self.path.display(),
                    e
                );
                Ok(CacheSnapshot::default())
            }
            other => other,
        };
        let result = current.and_then(|mut snapshot| {
            apply(&mut snapshot);
            snapshot.updated_at = Some(Utc::now());
            self.store(&snapshot)
        });
        if let Err(e) = result {
            tracing::error!(
                "❌ Failed to cache {} in {}: {}",
                key,
                self.path.display(),
                e
            );
        }
    }
}

impl CacheStore for FileCache {
    fn set_progress(&self, progress: &Payload) {
        self.update("progress", |snapshot| snapshot.progress = Some(progress.clone()));
    }

    fn set_lives(&self, lives: &Payload) {
        self.update("lives", |snapshot| snapshot.lives = Some(lives.clone()));
    }

    fn clear(&self) {
        let _guard = self.guard();
        match fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("Removed cache file {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::error!(
                "❌ Failed to clear cache {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}
