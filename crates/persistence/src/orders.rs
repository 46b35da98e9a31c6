//! Order storage
//!
//! - `InMemoryOrderStore` - single process, ids restart at 1
//! - `FileOrderStore` - one JSON file per order; ids are claimed with marker
//!   files so they survive restarts and are unique across workers

use async_trait::async_trait;
use order_engine_core::DraftOrder;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{files, PersistenceError};

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Allocate an order id; ids are never reused
    async fn next_order_id(&self) -> Result<u64, PersistenceError>;

    /// Insert or replace
    async fn save(&self, order: &DraftOrder) -> Result<(), PersistenceError>;

    async fn get(&self, order_id: u64) -> Result<Option<DraftOrder>, PersistenceError>;

    /// A customer's orders, newest first
    async fn list_for_customer(
        &self,
        customer_id: &str,
        limit: usize,
    ) -> Result<Vec<DraftOrder>, PersistenceError>;
}

pub struct InMemoryOrderStore {
    next_id: AtomicU64,
    orders: RwLock<BTreeMap<u64, DraftOrder>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            orders: RwLock::new(BTreeMap::new()),
        }
    }
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn next_order_id(&self) -> Result<u64, PersistenceError> {
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn save(&self, order: &DraftOrder) -> Result<(), PersistenceError> {
        self.orders.write().insert(order.id, order.clone());
        Ok(())
    }

    async fn get(&self, order_id: u64) -> Result<Option<DraftOrder>, PersistenceError> {
        Ok(self.orders.read().get(&order_id).cloned())
    }

    async fn list_for_customer(
        &self,
        customer_id: &str,
        limit: usize,
    ) -> Result<Vec<DraftOrder>, PersistenceError> {
        Ok(self
            .orders
            .read()
            .values()
            .rev()
            .filter(|o| o.customer_id == customer_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Orders as `<dir>/<id>.json`, claimed ids as empty files under `<dir>/ids`
pub struct FileOrderStore {
    dir: PathBuf,
    ids_dir: PathBuf,
    /// Lowest id this process has not tried yet
    next_hint: AtomicU64,
}

impl FileOrderStore {
    /// Create the directories if needed and resume after the highest claimed id
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let dir = dir.as_ref().to_path_buf();
        let ids_dir = dir.join("ids");
        tokio::fs::create_dir_all(&ids_dir).await?;

        let highest = highest_claimed(&ids_dir).await?;
        tracing::info!(dir = %dir.display(), highest, "Opened file order store");
        Ok(Self {
            dir,
            ids_dir,
            next_hint: AtomicU64::new(highest + 1),
        })
    }

    fn path_for(&self, order_id: u64) -> PathBuf {
        self.dir.join(format!("{}.json", order_id))
    }
}

async fn highest_claimed(ids_dir: &Path) -> Result<u64, PersistenceError> {
    let mut highest = 0;
    let mut entries = tokio::fs::read_dir(ids_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if let Some(id) = entry.file_name().to_str().and_then(|n| n.parse::<u64>().ok()) {
            highest = highest.max(id);
        }
    }
    Ok(highest)
}

#[async_trait]
impl OrderStore for FileOrderStore {
    async fn next_order_id(&self) -> Result<u64, PersistenceError> {
        loop {
            let candidate = self.next_hint.fetch_add(1, Ordering::SeqCst);
            let marker = self.ids_dir.join(candidate.to_string());
            let claimed = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&marker)
                .await;
            match claimed {
                Ok(_) => return Ok(candidate),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    // another worker got there first; skip past everything claimed
                    let highest = highest_claimed(&self.ids_dir).await?;
                    self.next_hint.fetch_max(highest + 1, Ordering::SeqCst);
                },
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn save(&self, order: &DraftOrder) -> Result<(), PersistenceError> {
        files::write_json(&self.path_for(order.id), order).await
    }

    async fn get(&self, order_id: u64) -> Result<Option<DraftOrder>, PersistenceError> {
        files::read_json(&self.path_for(order_id)).await
    }

    async fn list_for_customer(
        &self,
        customer_id: &str,
        limit: usize,
    ) -> Result<Vec<DraftOrder>, PersistenceError> {
        let mut ids: Vec<u64> = files::json_stems(&self.dir)
            .await?
            .iter()
            .filter_map(|stem| stem.parse().ok())
            .collect();
        ids.sort_unstable_by(|a, b| b.cmp(a));

        let mut orders = Vec::new();
        for id in ids {
            if orders.len() >= limit {
                break;
            }
            if let Some(order) = self.get(id).await? {
                if order.customer_id == customer_id {
                    orders.push(order);
                }
            }
        }
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use order_engine_core::ResolvedLine;

    fn order(id: u64, customer: &str) -> DraftOrder {
        DraftOrder::new(
            id,
            customer,
            vec![ResolvedLine {
                catalog_item_id: 3,
                name: "Latte".to_string(),
                quantity: 1,
                unit_price: 400.0,
            }],
        )
    }

    #[tokio::test]
    async fn test_ids_increase() {
        let store = InMemoryOrderStore::new();
        let a = store.next_order_id().await.unwrap();
        let b = store.next_order_id().await.unwrap();
        assert!(b > a);
    }

    #[tokio::test]
    async fn test_save_replaces() {
        let store = InMemoryOrderStore::new();
        let mut o = order(1, "alice");
        store.save(&o).await.unwrap();
        o.confirm();
        store.save(&o).await.unwrap();
        assert_eq!(store.get(1).await.unwrap(), Some(o));
        assert!(store.get(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_history_newest_first() {
        let store = InMemoryOrderStore::new();
        for (id, who) in [(1, "alice"), (2, "bob"), (3, "alice"), (4, "alice")] {
            store.save(&order(id, who)).await.unwrap();
        }
        let ids: Vec<u64> = store
            .list_for_customer("alice", 2)
            .await
            .unwrap()
            .iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec![4, 3]);
    }

    #[tokio::test]
    async fn test_file_ids_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let first = FileOrderStore::open(dir.path()).await.unwrap();
        assert_eq!(first.next_order_id().await.unwrap(), 1);
        assert_eq!(first.next_order_id().await.unwrap(), 2);
        drop(first);

        let reopened = FileOrderStore::open(dir.path()).await.unwrap();
        assert_eq!(reopened.next_order_id().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_file_ids_unique_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let a = FileOrderStore::open(dir.path()).await.unwrap();
        let b = FileOrderStore::open(dir.path()).await.unwrap();

        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(a.next_order_id().await.unwrap());
            ids.push(b.next_order_id().await.unwrap());
        }
        let mut unique = ids.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), ids.len());
    }

    #[tokio::test]
    async fn test_file_orders_shared_and_listed() {
        let dir = tempfile::tempdir().unwrap();
        let writer = FileOrderStore::open(dir.path()).await.unwrap();
        let reader = FileOrderStore::open(dir.path()).await.unwrap();

        for (id, who) in [(1, "alice"), (2, "bob"), (3, "alice"), (10, "alice")] {
            writer.save(&order(id, who)).await.unwrap();
        }
        let mut confirmed = order(3, "alice");
        confirmed.confirm();
        writer.save(&confirmed).await.unwrap();

        assert_eq!(reader.get(3).await.unwrap(), Some(confirmed));
        assert!(reader.get(4).await.unwrap().is_none());
        let ids: Vec<u64> = reader
            .list_for_customer("alice", 2)
            .await
            .unwrap()
            .iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec![10, 3]);
    }
}
