use std::{collections::HashMap, str::FromStr, sync::Arc};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::storage::{Resource, ResourceStore};

/// How fresh ids are minted within a kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdStrategy {
    /// Per-kind counter rendered in decimal: "1", "2", ...
    #[default]
    Sequence,
    /// Random v4 UUID.
    Uuid,
}

impl FromStr for IdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequence" => Ok(IdStrategy::Sequence),
            "uuid" => Ok(IdStrategy::Uuid),
            other => Err(format!("unknown id strategy `{other}`")),
        }
    }
}

/// One kind's resources. The counter outlives deletions so ids are never reused.
#[derive(Default)]
struct Collection {
    last_seq: u64,
    items: HashMap<String, Resource>,
}

impl Collection {
    fn allocate_id(&mut self, strategy: IdStrategy) -> String {
        match strategy {
            IdStrategy::Sequence => {
                self.last_seq += 1;
                self.last_seq.to_string()
            }
            IdStrategy::Uuid => loop {
                let id = Uuid::new_v4().to_string();
                if !self.items.contains_key(&id) {
                    break id;
                }
            },
        }
    }
}

/// Process-lifetime in-memory store.
///
/// The kind map is sharded by `DashMap`; each collection sits behind its own
/// `RwLock`, so writes to one kind exclude readers of that kind only. Shard
/// guards are never held across an `.await`.
pub struct MemoryStore {
    kinds: DashMap<String, Arc<RwLock<Collection>>>,
    ids: IdStrategy,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Self::with_id_strategy(IdStrategy::default())
    }

    pub fn with_id_strategy(ids: IdStrategy) -> Arc<Self> {
        Arc::new(Self { kinds: DashMap::new(), ids })
    }

    /// Kinds that have been written to at least once.
    pub fn kinds(&self) -> Vec<String> {
        self.kinds.iter().map(|e| e.key().clone()).collect()
    }

    /// Number of resources currently stored under `kind`.
    pub async fn count(&self, kind: &str) -> usize {
        match self.collection(kind) {
            Some(coll) => coll.read().await.items.len(),
            None => 0,
        }
    }

    fn collection(&self, kind: &str) -> Option<Arc<RwLock<Collection>>> {
        self.kinds.get(kind).map(|c| Arc::clone(c.value()))
    }

    fn collection_or_create(&self, kind: &str) -> Arc<RwLock<Collection>> {
        if let Some(coll) = self.collection(kind) {
            return coll;
        }
        let entry = self.kinds.entry(kind.to_owned()).or_default();
        Arc::clone(entry.value())
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn create(&self, kind: &str, resource: Resource) -> Result<String, StoreError> {
        let coll = self.collection_or_create(kind);
        let mut coll = coll.write().await;
        let id = coll.allocate_id(self.ids);
        coll.items.insert(id.clone(), resource);
        debug!(%kind, %id, "resource created");
        Ok(id)
    }

    async fn get(&self, kind: &str, id: &str) -> Result<Resource, StoreError> {
        let coll = self.collection(kind).ok_or(StoreError::NotFound)?;
        let coll = coll.read().await;
        coll.items.get(id).cloned().ok_or(StoreError::NotFound)
    }

    async fn get_all(&self, kind: &str) -> Result<Vec<Resource>, StoreError> {
        let Some(coll) = self.collection(kind) else {
            return Ok(Vec::new());
        };
        let coll = coll.read().await;
        Ok(coll.items.values().cloned().collect())
    }

    async fn update(&self, kind: &str, id: &str, resource: Resource) -> Result<(), StoreError> {
        let coll = self.collection(kind).ok_or(StoreError::NotFound)?;
        let mut coll = coll.write().await;
        let slot = coll.items.get_mut(id).ok_or(StoreError::NotFound)?;
        *slot = resource;
        Ok(())
    }

    async fn delete(&self, kind: &str, id: &str) -> Result<(), StoreError> {
        let coll = self.collection(kind).ok_or(StoreError::NotFound)?;
        let mut coll = coll.write().await;
        coll.items.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    async fn delete_all(&self, kind: &str) -> Result<(), StoreError> {
        if let Some(coll) = self.collection(kind) {
            let mut coll = coll.write().await;
            let removed = coll.items.len();
            coll.items.clear();
            debug!(%kind, removed, "collection cleared");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    fn doc(v: serde_json::Value) -> Resource {
        v.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn create_then_get_returns_same_document() -> Result<(), anyhow::Error> {
        let store = MemoryStore::new();
        let body = doc(json!({"color": "red", "size": 3, "tags": ["a", "b"], "meta": {"x": null}}));

        let id = store.create("widgets", body.clone()).await?;
        assert_eq!(store.get("widgets", &id).await?, body);
        // repeated reads observe the same value
        assert_eq!(store.get("widgets", &id).await?, body);
        Ok(())
    }

    #[tokio::test]
    async fn item_operations_on_missing_kind_or_id_are_not_found() -> Result<(), anyhow::Error> {
        let store = MemoryStore::new();
        assert_eq!(store.get("ghosts", "1").await, Err(StoreError::NotFound));
        assert_eq!(store.update("ghosts", "1", Resource::new()).await, Err(StoreError::NotFound));
        assert_eq!(store.delete("ghosts", "1").await, Err(StoreError::NotFound));

        store.create("ghosts", Resource::new()).await?;
        assert_eq!(store.get("ghosts", "nope").await, Err(StoreError::NotFound));
        assert_eq!(store.update("ghosts", "nope", Resource::new()).await, Err(StoreError::NotFound));
        assert_eq!(store.delete("ghosts", "nope").await, Err(StoreError::NotFound));
        Ok(())
    }

    #[tokio::test]
    async fn update_replaces_wholesale() -> Result<(), anyhow::Error> {
        let store = MemoryStore::new();
        let id = store.create("users", doc(json!({"name": "ann", "age": 30}))).await?;

        store.update("users", &id, doc(json!({"name": "bob"}))).await?;
        let got = store.get("users", &id).await?;
        assert_eq!(got, doc(json!({"name": "bob"})));
        assert!(!got.contains_key("age"));
        Ok(())
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() -> Result<(), anyhow::Error> {
        let store = MemoryStore::new();
        let id = store.create("users", doc(json!({"name": "ann"}))).await?;
        store.delete("users", &id).await?;
        assert_eq!(store.get("users", &id).await, Err(StoreError::NotFound));
        assert_eq!(store.delete("users", &id).await, Err(StoreError::NotFound));
        Ok(())
    }

    #[tokio::test]
    async fn missing_kind_reads_as_empty_and_is_not_created() -> Result<(), anyhow::Error> {
        let store = MemoryStore::new();
        assert!(store.get_all("nothing").await?.is_empty());
        store.delete_all("nothing").await?;
        assert!(store.kinds().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn delete_all_is_idempotent() -> Result<(), anyhow::Error> {
        let store = MemoryStore::new();
        for i in 0..3 {
            store.create("items", doc(json!({"n": i}))).await?;
        }
        assert_eq!(store.get_all("items").await?.len(), 3);

        store.delete_all("items").await?;
        assert!(store.get_all("items").await?.is_empty());
        store.delete_all("items").await?;
        assert!(store.get_all("items").await?.is_empty());
        assert_eq!(store.count("items").await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn sequence_ids_are_never_reused() -> Result<(), anyhow::Error> {
        let store = MemoryStore::new();
        let a = store.create("k", Resource::new()).await?;
        let b = store.create("k", Resource::new()).await?;
        store.delete("k", &b).await?;
        store.delete_all("k").await?;
        let c = store.create("k", Resource::new()).await?;

        assert_eq!((a.as_str(), b.as_str(), c.as_str()), ("1", "2", "3"));
        // counters are per kind
        assert_eq!(store.create("other", Resource::new()).await?, "1");
        Ok(())
    }

    #[tokio::test]
    async fn uuid_ids_are_distinct() -> Result<(), anyhow::Error> {
        let store = MemoryStore::with_id_strategy(IdStrategy::Uuid);
        let mut seen = HashSet::new();
        for _ in 0..50 {
            let id = store.create("k", Resource::new()).await?;
            assert!(Uuid::parse_str(&id).is_ok());
            assert!(seen.insert(id));
        }
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_get_distinct_ids() -> Result<(), anyhow::Error> {
        let store = MemoryStore::new();
        let n = 200;
        let mut handles = Vec::with_capacity(n);
        for i in 0..n {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.create("race", doc(json!({"i": i}))).await
            }));
        }

        let mut ids = HashSet::new();
        for h in handles {
            ids.insert(h.await??);
        }
        assert_eq!(ids.len(), n);
        assert_eq!(store.get_all("race").await?.len(), n);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_reads_never_observe_torn_writes() -> Result<(), anyhow::Error> {
        use std::sync::atomic::{AtomicBool, Ordering};

        let store = MemoryStore::new();
        let id = store.create("pairs", doc(json!({"a": 0, "b": 0}))).await?;
        let done = Arc::new(AtomicBool::new(false));

        let writer = {
            let (store, id, done) = (Arc::clone(&store), id.clone(), Arc::clone(&done));
            tokio::spawn(async move {
                for i in 1..=500 {
                    store.update("pairs", &id, doc(json!({"a": i, "b": i}))).await?;
                    tokio::task::yield_now().await;
                }
                store.delete("pairs", &id).await?;
                done.store(true, Ordering::SeqCst);
                Ok::<_, StoreError>(())
            })
        };

        let mut readers = Vec::new();
        for _ in 0..4 {
            let (store, id, done) = (Arc::clone(&store), id.clone(), Arc::clone(&done));
            readers.push(tokio::spawn(async move {
                let mut gone = false;
                loop {
                    let finished = done.load(Ordering::SeqCst);
                    match store.get("pairs", &id).await {
                        Ok(r) => {
                            // a delete is final: the id never comes back
                            assert!(!gone, "resource reappeared after delete");
                            assert_eq!(r.len(), 2, "partial body {r:?}");
                            assert_eq!(r["a"], r["b"], "torn body {r:?}");
                        }
                        Err(StoreError::NotFound) => gone = true,
                    }
                    if finished {
                        break gone;
                    }
                    tokio::task::yield_now().await;
                }
            }));
        }

        writer.await??;
        for r in readers {
            assert!(r.await?, "reader finished without seeing the delete");
        }
        Ok(())
    }

    #[test]
    fn id_strategy_parses() {
        assert_eq!("sequence".parse::<IdStrategy>(), Ok(IdStrategy::Sequence));
        assert_eq!(" UUID ".parse::<IdStrategy>(), Ok(IdStrategy::Uuid));
        assert!("random".parse::<IdStrategy>().is_err());
    }
}
