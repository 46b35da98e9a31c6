//! Per-customer message history

use async_trait::async_trait;
use dashmap::DashMap;
use order_engine_core::ConversationEntry;

use crate::PersistenceError;

#[async_trait]
pub trait ConversationLog: Send + Sync {
    async fn append(&self, entry: ConversationEntry) -> Result<(), PersistenceError>;

    /// The most recent `limit` entries, oldest first
    async fn history(
        &self,
        customer_id: &str,
        limit: usize,
    ) -> Result<Vec<ConversationEntry>, PersistenceError>;
}

/// Keeps at most `capacity` entries per customer
pub struct InMemoryConversationLog {
    entries: DashMap<String, Vec<ConversationEntry>>,
    capacity: usize,
}

impl InMemoryConversationLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity,
        }
    }
}

impl Default for InMemoryConversationLog {
    fn default() -> Self {
        Self::new(500)
    }
}

#[async_trait]
impl ConversationLog for InMemoryConversationLog {
    async fn append(&self, entry: ConversationEntry) -> Result<(), PersistenceError> {
        let mut log = self.entries.entry(entry.customer_id.clone()).or_default();
        log.push(entry);
        if log.len() > self.capacity {
            let excess = log.len() - self.capacity;
            log.drain(..excess);
        }
        Ok(())
    }

    async fn history(
        &self,
        customer_id: &str,
        limit: usize,
    ) -> Result<Vec<ConversationEntry>, PersistenceError> {
        Ok(self
            .entries
            .get(customer_id)
            .map(|log| {
                let start = log.len().saturating_sub(limit);
                log[start..].to_vec()
            })
            .unwrap_or_default())
    }
}
