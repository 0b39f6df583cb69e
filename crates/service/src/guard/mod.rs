//! Authorization gate consulted before every storage access.

use async_trait::async_trait;

use crate::operation::Operation;

mod noop;
mod policy;

pub use noop::NoopGuard;
pub use policy::PolicyGuard;

/// Coarse capability check over addressing only.
///
/// `id` is `Some` for item-level operations. Returning `false` is a normal
/// outcome, not a fault; the caller turns it into a forbidden response.
#[async_trait]
pub trait Guard: Send + Sync {
    async fn allow(&self, op: Operation, kind: &str, id: Option<&str>) -> bool;
}
