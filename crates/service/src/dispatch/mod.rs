//! Verb-generic request pipeline.
//!
//! Every CRUD verb runs the same skeleton: addressing check, payload decode,
//! guard, one store call, envelope. The verb only selects which store method
//! `invoke` calls.

use std::{sync::Arc, time::Instant};

use axum::body::Bytes;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::StoreError;
use crate::guard::{Guard, NoopGuard};
use crate::observability;
use crate::operation::Operation;
use crate::storage::{Resource, ResourceStore};

mod envelope;

pub use envelope::{CrudResponse, Envelope, MSG_FORBIDDEN, MSG_MALFORMED};

/// Addressing limits enforced before anything else runs.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub max_kind_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self { max_kind_len: 256 }
    }
}

/// A decoded inbound operation as delivered by the transport.
#[derive(Debug, Clone)]
pub struct CrudRequest {
    pub op: Operation,
    pub kind: String,
    pub id: Option<String>,
    pub body: Option<Bytes>,
}

impl CrudRequest {
    pub fn new(op: Operation, kind: impl Into<String>) -> Self {
        Self { op, kind: kind.into(), id: None, body: None }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Joins one store with one guard.
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<dyn ResourceStore>,
    guard: Arc<dyn Guard>,
    limits: Limits,
}

impl Dispatcher {
    /// Without a guard every request is allowed.
    pub fn new(store: Arc<dyn ResourceStore>, guard: Option<Arc<dyn Guard>>) -> Self {
        Self {
            store,
            guard: guard.unwrap_or_else(|| Arc::new(NoopGuard)),
            limits: Limits::default(),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub async fn dispatch(&self, req: CrudRequest) -> CrudResponse {
        let started = Instant::now();
        let op = req.op;
        let resp = self.run(req).await;
        observability::record(op, resp.outcome, started.elapsed());
        resp
    }

    async fn run(&self, req: CrudRequest) -> CrudResponse {
        let CrudRequest { op, kind, id, body } = req;
        let id = id.as_deref();

        if let Err(msg) = self.check_addressing(op, &kind, id) {
            warn!(%op, kind_len = kind.len(), ?id, reason = msg, "rejected addressing");
            return CrudResponse::bad_request(msg);
        }

        let resource = if op.needs_body() {
            match decode_resource(body.as_deref()) {
                Ok(r) => Some(r),
                Err(e) => {
                    warn!(%op, %kind, ?id, error = %e, "malformed payload");
                    return CrudResponse::bad_request(MSG_MALFORMED);
                }
            }
        } else {
            None
        };

        if !self.guard.allow(op, &kind, id).await {
            info!(%op, %kind, ?id, "guard denied request");
            return CrudResponse::forbidden();
        }

        match self.invoke(op, &kind, id, resource).await {
            Ok(envelope) => {
                let outcome = op.success_outcome();
                debug!(%op, %kind, ?id, %outcome, "request completed");
                CrudResponse::new(outcome, envelope)
            }
            Err(e) => {
                debug!(%op, %kind, ?id, error = %e, "store refused request");
                CrudResponse::failed(e)
            }
        }
    }

    fn check_addressing(&self, op: Operation, kind: &str, id: Option<&str>) -> Result<(), &'static str> {
        if kind.is_empty() {
            return Err("missing kind");
        }
        if kind.len() > self.limits.max_kind_len {
            return Err("kind name too long");
        }
        if op.is_item() && id.map_or(true, str::is_empty) {
            return Err("missing id");
        }
        Ok(())
    }

    /// The single verb-specific step: pick the store method.
    async fn invoke(
        &self,
        op: Operation,
        kind: &str,
        id: Option<&str>,
        resource: Option<Resource>,
    ) -> Result<Envelope, StoreError> {
        let store = &self.store;
        // addressing and decode have already run; a gap here reads as absent
        let item_id = || id.ok_or(StoreError::NotFound);
        let body = |r: Option<Resource>| r.ok_or(StoreError::NotFound);

        match op {
            Operation::Create => store.create(kind, body(resource)?).await.map(Envelope::with_id),
            Operation::ReadOne => store
                .get(kind, item_id()?)
                .await
                .map(|r| Envelope::with_result(Value::Object(r))),
            Operation::ReadAll => store.get_all(kind).await.map(|all| {
                Envelope::with_result(Value::Array(all.into_iter().map(Value::Object).collect()))
            }),
            Operation::Update => store
                .update(kind, item_id()?, body(resource)?)
                .await
                .map(|()| Envelope::empty()),
            Operation::DeleteOne => store.delete(kind, item_id()?).await.map(|()| Envelope::empty()),
            Operation::DeleteAll => store.delete_all(kind).await.map(|()| Envelope::empty()),
        }
    }
}

/// Parse a request body into a JSON object.
fn decode_resource(body: Option<&[u8]>) -> Result<Resource, serde_json::Error> {
    serde_json::from_slice::<Resource>(body.unwrap_or_default())
}
