use std::sync::Arc;

use configs::AppConfig;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use service::{Dispatcher, Guard, IdStrategy, Limits, MemoryStore, PolicyGuard};

use crate::errors::StartupError;
use crate::routes::{self, AppState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Only a configured rule set gets a real guard; otherwise the dispatcher
/// falls back to the no-op guard.
fn build_guard(cfg: &configs::GuardConfig) -> Option<Arc<dyn Guard>> {
    if cfg.is_open() {
        return None;
    }
    let guard: Arc<dyn Guard> = Arc::new(
        PolicyGuard::new()
            .read_only(cfg.read_only)
            .deny_kinds(cfg.deny_kinds.iter().cloned())
            .allow_kinds(cfg.allow_kinds.iter().cloned()),
    );
    Some(guard)
}

/// Wire store, guard and dispatcher from configuration.
pub fn build_state(cfg: &AppConfig) -> Result<AppState, StartupError> {
    let ids: IdStrategy = cfg
        .store
        .id_strategy
        .parse()
        .map_err(StartupError::InvalidConfig)?;
    let store = MemoryStore::with_id_strategy(ids);
    let guard = build_guard(&cfg.guard);
    info!(
        id_strategy = ?ids,
        guarded = guard.is_some(),
        max_kind_len = cfg.store.max_kind_len,
        "resource store ready"
    );

    let dispatcher = Dispatcher::new(store, guard).with_limits(Limits {
        max_kind_len: cfg.store.max_kind_len,
    });
    Ok(AppState { dispatcher })
}

async fn bind(host: &str, port: u16) -> Result<TcpListener, StartupError> {
    let addr = format!("{host}:{port}");
    TcpListener::bind(&addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })
}

/// Public entry: build the app and run the HTTP server until it stops.
/// The admin listener, when configured, runs alongside on its own task.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let state = build_state(&cfg)?;
    let app = routes::build_router(state, build_cors());

    if let Some(admin_port) = cfg.server.admin_port {
        let admin = bind(&cfg.server.host, admin_port).await?;
        info!(addr = %admin.local_addr()?, "admin server listening");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(admin, routes::build_admin_router()).await {
                error!(error = %e, "admin server stopped");
            }
        });
    }

    let listener = bind(&cfg.server.host, cfg.server.port).await?;
    info!(addr = %listener.local_addr()?, "starting crud server");
    axum::serve(listener, app).await?;
    Ok(())
}
