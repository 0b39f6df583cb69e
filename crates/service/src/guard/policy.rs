use std::collections::HashSet;

use async_trait::async_trait;
use tracing::trace;

use super::Guard;
use crate::operation::Operation;

/// Rule-based guard built from configuration.
///
/// Rules, checked in order:
/// - a kind in `deny_kinds` is refused for every operation
/// - a non-empty `allow_kinds` refuses any kind not listed
/// - `read_only` refuses every write
#[derive(Debug, Clone, Default)]
pub struct PolicyGuard {
    read_only: bool,
    deny_kinds: HashSet<String>,
    allow_kinds: HashSet<String>,
}

impl PolicyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn deny_kinds<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deny_kinds.extend(kinds.into_iter().map(Into::into));
        self
    }

    pub fn allow_kinds<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_kinds.extend(kinds.into_iter().map(Into::into));
        self
    }

    fn decide(&self, op: Operation, kind: &str) -> bool {
        if self.deny_kinds.contains(kind) {
            return false;
        }
        if !self.allow_kinds.is_empty() && !self.allow_kinds.contains(kind) {
            return false;
        }
        !(self.read_only && op.is_write())
    }
}

#[async_trait]
impl Guard for PolicyGuard {
    async fn allow(&self, op: Operation, kind: &str, id: Option<&str>) -> bool {
        let allowed = self.decide(op, kind);
        trace!(%op, %kind, ?id, allowed, "policy decision");
        allowed
    }
}
