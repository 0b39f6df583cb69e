use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::StoreError;
use crate::outcome::Outcome;

pub const MSG_MALFORMED: &str = "malformed json";
pub const MSG_FORBIDDEN: &str = "forbidden";

/// Uniform response body. Absent fields are omitted on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl Envelope {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_id(id: String) -> Self {
        Self { id: Some(id), ..Self::default() }
    }

    pub fn with_result(result: Value) -> Self {
        Self { result: Some(result), ..Self::default() }
    }

    pub fn with_error(error: impl Into<String>) -> Self {
        Self { error: Some(error.into()), ..Self::default() }
    }
}

/// What the dispatcher hands back to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct CrudResponse {
    pub outcome: Outcome,
    pub envelope: Envelope,
}

impl CrudResponse {
    pub fn new(outcome: Outcome, envelope: Envelope) -> Self {
        Self { outcome, envelope }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(Outcome::BadRequest, Envelope::with_error(msg))
    }

    pub fn forbidden() -> Self {
        Self::new(Outcome::Forbidden, Envelope::with_error(MSG_FORBIDDEN))
    }

    pub fn failed(err: StoreError) -> Self {
        Self::new(err.outcome(), Envelope::with_error(err.to_string()))
    }

    pub fn status(&self) -> StatusCode {
        self.outcome.status()
    }
}

impl Outcome {
    /// HTTP status for this outcome.
    pub fn status(self) -> StatusCode {
        match self {
            Outcome::Ok => StatusCode::OK,
            Outcome::Created => StatusCode::CREATED,
            Outcome::BadRequest => StatusCode::BAD_REQUEST,
            Outcome::Forbidden => StatusCode::FORBIDDEN,
            Outcome::NotFound => StatusCode::NOT_FOUND,
        }
    }
}
