//! Storage abstractions for the service layer
//!
//! `ResourceStore` is the seam the dispatch pipeline talks to; the
//! in-memory implementation lives in `memory_store`.

use async_trait::async_trait;

use crate::errors::StoreError;

pub mod memory_store;

/// A stored document: an unordered JSON object. The store never looks inside.
pub type Resource = serde_json::Map<String, serde_json::Value>;

/// Per-kind, per-id CRUD primitives.
///
/// Every method hands back owned copies; callers never hold a reference into
/// the store. Collection operations treat an unknown kind as empty and never fail.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Assign a fresh id within `kind`, insert `resource` and return the id.
    async fn create(&self, kind: &str, resource: Resource) -> Result<String, StoreError>;
    async fn get(&self, kind: &str, id: &str) -> Result<Resource, StoreError>;
    /// Snapshot of every resource in `kind`, in no particular order.
    async fn get_all(&self, kind: &str) -> Result<Vec<Resource>, StoreError>;
    /// Replace the stored resource wholesale.
    async fn update(&self, kind: &str, id: &str, resource: Resource) -> Result<(), StoreError>;
    async fn delete(&self, kind: &str, id: &str) -> Result<(), StoreError>;
    async fn delete_all(&self, kind: &str) -> Result<(), StoreError>;
}
