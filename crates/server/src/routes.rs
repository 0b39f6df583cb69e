use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put, MethodRouter},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, Level};

use common::types::Health;
use service::{observability, CrudRequest, CrudResponse, Dispatcher, Operation};

pub const COLLECTION_ALLOW: &str = "POST, GET, DELETE, OPTIONS";
pub const ITEM_ALLOW: &str = "PUT, GET, DELETE, OPTIONS";

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> (StatusCode, String) {
    observability::encode_metrics()
}

async fn options_collection() -> impl IntoResponse {
    (StatusCode::OK, [(header::ALLOW, COLLECTION_ALLOW)])
}

async fn options_item() -> impl IntoResponse {
    (StatusCode::OK, [(header::ALLOW, ITEM_ALLOW)])
}

/// Shared body of every CRUD route: lift path params and payload into a
/// `CrudRequest`, dispatch, encode.
async fn handle(
    op: Operation,
    state: AppState,
    mut params: HashMap<String, String>,
    body: Bytes,
) -> Response {
    let mut req = CrudRequest::new(op, params.remove("kind").unwrap_or_default());
    req.id = params.remove("id");
    if op.needs_body() {
        req.body = Some(body);
    }
    encode(state.dispatcher.dispatch(req).await)
}

fn encode(resp: CrudResponse) -> Response {
    match serde_json::to_vec(&resp.envelope) {
        Ok(bytes) => (
            resp.status(),
            [(header::CONTENT_TYPE, "application/json")],
            bytes,
        )
            .into_response(),
        Err(e) => {
            // the envelope channel itself is broken; nothing useful to send back
            error!(error = %e, outcome = %resp.outcome, "failed to encode response envelope");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Method route for one CRUD verb, bound to the shared handler.
fn crud(op: Operation) -> MethodRouter<AppState> {
    let handler = move |State(state): State<AppState>,
                        Path(params): Path<HashMap<String, String>>,
                        body: Bytes| handle(op, state, params, body);
    match op {
        Operation::Create => post(handler),
        Operation::ReadOne | Operation::ReadAll => get(handler),
        Operation::Update => put(handler),
        Operation::DeleteOne | Operation::DeleteAll => delete(handler),
    }
}

/// Health and metrics, served on their own listener so every path of the
/// main router stays available as a resource kind.
pub fn build_admin_router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
}

/// Build the CRUD router: `/:kind` and `/:kind/:id` for every kind.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route(
            "/:kind",
            crud(Operation::Create)
                .merge(crud(Operation::ReadAll))
                .merge(crud(Operation::DeleteAll))
                .options(options_collection),
        )
        .route(
            "/:kind/:id",
            crud(Operation::Update)
                .merge(crud(Operation::ReadOne))
                .merge(crud(Operation::DeleteOne))
                .options(options_item),
        )
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
