//! `GET /health` for the posting service.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::connection::ConnectionHealth;
use crate::scheduler::{PostingScheduler, SchedulerState};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub scheduler: SchedulerState,
    pub store: ConnectionHealth,
}

/// 200 while the store connection is usable, 503 once it is down
async fn health_check(
    State(scheduler): State<PostingScheduler>,
) -> (StatusCode, Json<HealthResponse>) {
    let store = scheduler.health();
    let (code, status) = match store {
        ConnectionHealth::Down => (StatusCode::SERVICE_UNAVAILABLE, "degraded"),
        _ => (StatusCode::OK, "healthy"),
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            scheduler: scheduler.state(),
            store,
        }),
    )
}

pub fn router(scheduler: PostingScheduler) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(scheduler)
}
