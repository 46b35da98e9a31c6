//! TTL-bounded location scratch
//!
//! Holds the geocoded point and the options shown to a customer between the
//! address turn and the selection turn.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use order_engine_core::PendingLocation;
use std::path::{Path, PathBuf};

use crate::{files, PersistenceError};

#[async_trait]
pub trait LocationScratch: Send + Sync {
    async fn put(&self, customer_id: &str, pending: PendingLocation) -> Result<(), PersistenceError>;

    /// The live entry; expired entries read as absent
    async fn get(&self, customer_id: &str) -> Result<Option<PendingLocation>, PersistenceError>;

    /// Whether an entry exists but has expired
    async fn is_expired(&self, customer_id: &str) -> Result<bool, PersistenceError>;

    async fn clear(&self, customer_id: &str) -> Result<(), PersistenceError>;

    /// Drop every expired entry, returning how many went
    async fn purge_expired(&self) -> Result<usize, PersistenceError>;
}

#[derive(Default)]
pub struct InMemoryLocationScratch {
    entries: DashMap<String, PendingLocation>,
}

impl InMemoryLocationScratch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl LocationScratch for InMemoryLocationScratch {
    async fn put(&self, customer_id: &str, pending: PendingLocation) -> Result<(), PersistenceError> {
        self.entries.insert(customer_id.to_string(), pending);
        Ok(())
    }

    async fn get(&self, customer_id: &str) -> Result<Option<PendingLocation>, PersistenceError> {
        Ok(self
            .entries
            .get(customer_id)
            .filter(|e| !e.is_expired())
            .map(|e| e.value().clone()))
    }

    async fn is_expired(&self, customer_id: &str) -> Result<bool, PersistenceError> {
        Ok(self
            .entries
            .get(customer_id)
            .map(|e| e.is_expired())
            .unwrap_or(false))
    }

    async fn clear(&self, customer_id: &str) -> Result<(), PersistenceError> {
        self.entries.remove(customer_id);
        Ok(())
    }

    async fn purge_expired(&self) -> Result<usize, PersistenceError> {
        let now = Utc::now();
        let before = self.entries.len();
        self.entries.retain(|_, e| !e.is_expired_at(now));
        let purged = before.saturating_sub(self.entries.len());
        if purged > 0 {
            tracing::debug!(purged, "Purged expired location scratch");
        }
        Ok(purged)
    }
}

/// Entries as `<dir>/<customer>.json`; expiry is checked on read
pub struct FileLocationScratch {
    dir: PathBuf,
}

impl FileLocationScratch {
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        tracing::info!(dir = %dir.display(), "Opened file location scratch");
        Ok(Self { dir })
    }

    async fn read(&self, customer_id: &str) -> Result<Option<PendingLocation>, PersistenceError> {
        files::read_json(&files::json_path(&self.dir, customer_id)?).await
    }
}

#[async_trait]
impl LocationScratch for FileLocationScratch {
    async fn put(&self, customer_id: &str, pending: PendingLocation) -> Result<(), PersistenceError> {
        files::write_json(&files::json_path(&self.dir, customer_id)?, &pending).await
    }

    async fn get(&self, customer_id: &str) -> Result<Option<PendingLocation>, PersistenceError> {
        Ok(self.read(customer_id).await?.filter(|e| !e.is_expired()))
    }

    async fn is_expired(&self, customer_id: &str) -> Result<bool, PersistenceError> {
        Ok(self
            .read(customer_id)
            .await?
            .map(|e| e.is_expired())
            .unwrap_or(false))
    }

    async fn clear(&self, customer_id: &str) -> Result<(), PersistenceError> {
        files::remove(&files::json_path(&self.dir, customer_id)?).await
    }

    async fn purge_expired(&self) -> Result<usize, PersistenceError> {
        let now = Utc::now();
        let mut purged = 0;
        for customer_id in files::json_stems(&self.dir).await? {
            let path = files::json_path(&self.dir, &customer_id)?;
            let expired = match files::read_json::<PendingLocation>(&path).await {
                Ok(Some(entry)) => entry.is_expired_at(now),
                Ok(None) => false,
                Err(e) => {
                    tracing::warn!(customer = %customer_id, error = %e, "Unreadable scratch entry");
                    true
                },
            };
            if expired {
                files::remove(&path).await?;
                purged += 1;
            }
        }
        if purged > 0 {
            tracing::debug!(purged, "Purged expired location scratch");
        }
        Ok(purged)
    }
}
