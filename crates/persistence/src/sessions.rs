//! Conversation session stores
//!
//! - `InMemorySessionStore` - single process
//! - `FileSessionStore` - one JSON file per customer, shared by any worker
//!   pointed at the same directory

use async_trait::async_trait;
use order_engine_core::ConversationSession;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::{files, PersistenceError};

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, customer_id: &str) -> Result<Option<ConversationSession>, PersistenceError>;

    async fn put(&self, session: &ConversationSession) -> Result<(), PersistenceError>;

    async fn delete(&self, customer_id: &str) -> Result<(), PersistenceError>;

    /// Whether other processes can see writes
    fn is_distributed(&self) -> bool;
}

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, ConversationSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, customer_id: &str) -> Result<Option<ConversationSession>, PersistenceError> {
        Ok(self.sessions.read().get(customer_id).cloned())
    }

    async fn put(&self, session: &ConversationSession) -> Result<(), PersistenceError> {
        self.sessions
            .write()
            .insert(session.customer_id.clone(), session.clone());
        Ok(())
    }

    async fn delete(&self, customer_id: &str) -> Result<(), PersistenceError> {
        self.sessions.write().remove(customer_id);
        Ok(())
    }

    fn is_distributed(&self) -> bool {
        false
    }
}

/// Sessions as `<dir>/<customer>.json`
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Create the directory if needed
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        tracing::info!(dir = %dir.display(), "Opened file session store");
        Ok(Self { dir })
    }

    fn path_for(&self, customer_id: &str) -> Result<PathBuf, PersistenceError> {
        files::json_path(&self.dir, customer_id)
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, customer_id: &str) -> Result<Option<ConversationSession>, PersistenceError> {
        files::read_json(&self.path_for(customer_id)?).await
    }

    async fn put(&self, session: &ConversationSession) -> Result<(), PersistenceError> {
        files::write_json(&self.path_for(&session.customer_id)?, session).await
    }

    async fn delete(&self, customer_id: &str) -> Result<(), PersistenceError> {
        files::remove(&self.path_for(customer_id)?).await
    }

    fn is_distributed(&self) -> bool {
        true
    }
}
