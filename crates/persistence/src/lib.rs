//! Storage for the order engine
//!
//! Provides async stores for:
//! - Conversation sessions
//! - Orders and per-customer order history
//! - The TTL-bounded location scratch
//! - The conversation log
//!
//! Each store has an in-memory implementation. Sessions, orders and scratch
//! also have JSON-file implementations that several workers can share.

pub mod conversation_log;
pub mod error;
mod files;
pub mod orders;
pub mod scratch;
pub mod sessions;

pub use conversation_log::{ConversationLog, InMemoryConversationLog};
pub use error::PersistenceError;
pub use orders::{FileOrderStore, InMemoryOrderStore, OrderStore};
pub use scratch::{FileLocationScratch, InMemoryLocationScratch, LocationScratch};
pub use sessions::{FileSessionStore, InMemorySessionStore, SessionStore};

use std::path::Path;
use std::sync::Arc;

/// Combined persistence layer with all stores
#[derive(Clone)]
pub struct PersistenceLayer {
    pub sessions: Arc<dyn SessionStore>,
    pub orders: Arc<dyn OrderStore>,
    pub scratch: Arc<dyn LocationScratch>,
    pub log: Arc<dyn ConversationLog>,
}

impl PersistenceLayer {
    /// Everything in process memory
    pub fn in_memory() -> Self {
        Self {
            sessions: Arc::new(InMemorySessionStore::new()),
            orders: Arc::new(InMemoryOrderStore::new()),
            scratch: Arc::new(InMemoryLocationScratch::new()),
            log: Arc::new(InMemoryConversationLog::default()),
        }
    }

    /// Sessions, orders and scratch as JSON files under `data_dir`, the log
    /// in memory. Workers opened on the same directory share all three.
    pub async fn with_data_dir(data_dir: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let root = data_dir.as_ref();
        Ok(Self {
            sessions: Arc::new(FileSessionStore::open(root.join("sessions")).await?),
            orders: Arc::new(FileOrderStore::open(root.join("orders")).await?),
            scratch: Arc::new(FileLocationScratch::open(root.join("scratch")).await?),
            log: Arc::new(InMemoryConversationLog::default()),
        })
    }
}
