//! HTTP surface of the signaling controller.
//!
//! - `GET /health` - liveness probe (is the process running?)
//! - `GET /ready` - readiness probe (can we accept sessions?)
//! - `GET /ice-servers` - STUN/TURN list for clients
//! - `GET /ws` - WebSocket upgrade into a signaling session
//!
//! The `/metrics` endpoint is mounted separately in `main` because the
//! Prometheus recorder handle only exists there.

mod ws;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::protocol::{IceServer, IceServersResponse};
use crate::relay::RelayHandle;

/// Liveness and readiness flags for Kubernetes probes.
#[derive(Debug)]
pub struct HealthState {
    /// Always true after startup initialization.
    live: AtomicBool,
    /// True once the relay is up and the listener is bound.
    ready: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthState {
    /// Create a new health state (live=true, ready=false).
    #[must_use]
    pub fn new() -> Self {
        Self {
            live: AtomicBool::new(true),
            ready: AtomicBool::new(false),
        }
    }

    /// Mark the service as ready to accept sessions.
    pub fn set_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    /// Mark the service as not ready (e.g. during shutdown).
    pub fn set_not_ready(&self) {
        self.ready.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: RelayHandle,
    pub ice_servers: Arc<Vec<IceServer>>,
    pub health: Arc<HealthState>,
}

impl AppState {
    #[must_use]
    pub fn new(relay: RelayHandle, ice_servers: Vec<IceServer>, health: Arc<HealthState>) -> Self {
        Self {
            relay,
            ice_servers: Arc::new(ice_servers),
            health,
        }
    }
}

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(liveness_handler))
        .route("/ready", get(readiness_handler))
        .route("/ice-servers", get(ice_servers_handler))
        .route("/ws", get(ws::ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe handler. 200 as long as the process runs.
async fn liveness_handler(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if state.health.is_live() {
        (StatusCode::OK, Json(json!({ "status": "ok" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "down" })),
        )
    }
}

/// Readiness probe handler. 503 until startup completes and during
/// shutdown so load balancers drain traffic.
async fn readiness_handler(State(state): State<AppState>) -> StatusCode {
    if state.health.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Hand clients the STUN/TURN list outside of a session, for pre-join
/// connectivity checks.
async fn ice_servers_handler(State(state): State<AppState>) -> Json<IceServersResponse> {
    Json(IceServersResponse {
        ice_servers: state.ice_servers.as_ref().clone(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let relay = RelayHandle::new(Vec::new());
        AppState::new(
            relay,
            vec![IceServer {
                urls: "stun:stun.l.google.com:19302".to_string(),
                username: None,
                credential: None,
            }],
            Arc::new(HealthState::new()),
        )
    }

    #[tokio::test]
    async fn test_health_returns_ok() {
        let response = app(test_state())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_ready_reflects_health_state() {
        let state = test_state();
        let health = state.health.clone();

        let response = app(state.clone())
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        health.set_ready();
        let response = app(state.clone())
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        health.set_not_ready();
        let response = app(state)
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_ice_servers_endpoint() {
        let response = app(test_state())
            .oneshot(Request::get("/ice-servers").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let value: IceServersResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(value.ice_servers.len(), 1);
        assert_eq!(value.ice_servers[0].urls, "stun:stun.l.google.com:19302");
    }

    #[tokio::test]
    async fn test_ws_route_rejects_plain_get() {
        // Without upgrade headers the WebSocket route cannot upgrade.
        let response = app(test_state())
            .oneshot(Request::get("/ws").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_ne!(response.status(), StatusCode::OK);
    }
}
