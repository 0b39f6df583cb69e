//! Resource service: the in-memory store, the authorization guard and the
//! verb-generic dispatch pipeline that joins them.
//! - `storage` owns every resource and is safe to share across tasks.
//! - `guard` decides on addressing alone, before storage is touched.
//! - `dispatch` turns a decoded request into one store call and a response envelope.

pub mod errors;
pub mod operation;
pub mod outcome;
pub mod storage;
pub mod guard;
pub mod dispatch;
pub mod observability;

pub use dispatch::{CrudRequest, CrudResponse, Dispatcher, Envelope, Limits};
pub use errors::StoreError;
pub use guard::{Guard, NoopGuard, PolicyGuard};
pub use operation::Operation;
pub use outcome::Outcome;
pub use storage::{memory_store::{IdStrategy, MemoryStore}, Resource, ResourceStore};
