//! HTTP surface: dashboard state, recent history, health and metrics

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::domain::{DashboardSnapshot, DrawRecord};
use crate::error::{Result, WingoError};
use crate::services::{HealthState, HealthStatus, Metrics};

/// Shared state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub snapshot: watch::Receiver<Arc<DashboardSnapshot>>,
    pub health: Arc<HealthState>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    fn current(&self) -> Arc<DashboardSnapshot> {
        self.snapshot.borrow().clone()
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/state", get(state_handler))
        .route("/api/history", get(history_handler))
        .route("/health", get(health_handler))
        .route("/healthz", get(liveness_handler))
        .route("/readyz", get(readiness_handler))
        .route("/metrics", get(metrics_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// HTTP server for the dashboard API
pub struct HttpServer {
    state: AppState,
    addr: SocketAddr,
}

impl HttpServer {
    pub fn new(state: AppState, host: &str, port: u16) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .map_err(|e| WingoError::Internal(format!("invalid listen address {}:{}: {}", host, port, e)))?;
        Ok(Self { state, addr })
    }

    pub async fn run(self) -> Result<()> {
        let app = router(self.state);

        info!("Starting HTTP server on {}", self.addr);
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, app)
            .await
            .map_err(|e| WingoError::Internal(format!("HTTP server error: {}", e)))?;

        Ok(())
    }
}

/// Full dashboard snapshot
async fn state_handler(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    Json(state.current().as_ref().clone())
}

/// Recent draws, newest first, capped at the snapshot size
async fn history_handler(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Json<Vec<DrawRecord>> {
    let snapshot = state.current();
    let limit = params
        .limit
        .unwrap_or(snapshot.recent_history.len())
        .min(snapshot.recent_history.len());
    Json(snapshot.recent_history[..limit].to_vec())
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let health = state.health.get_health().await;
    let status_code = match health.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status_code, Json(health))
}

async fn liveness_handler() -> impl IntoResponse {
    StatusCode::OK
}

async fn readiness_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.health.get_health().await.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}

async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; charset=utf-8",
        )],
        state.metrics.prometheus(),
    )
}
