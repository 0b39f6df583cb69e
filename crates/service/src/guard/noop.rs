use async_trait::async_trait;

use super::Guard;
use crate::operation::Operation;

/// Allows everything. Installed when no guard is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopGuard;

#[async_trait]
impl Guard for NoopGuard {
    async fn allow(&self, _op: Operation, _kind: &str, _id: Option<&str>) -> bool {
        true
    }
}
