//! `BridgeServer`: Axum HTTP + WebSocket gateway.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use vrcbridge_runtime::BridgeHandle;

use crate::config::ServerConfig;
use crate::health::{self, HealthResponse};
use crate::shutdown::ShutdownCoordinator;
use crate::websocket::session::run_ws_session;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Sender side of the dispatch loop.
    pub bridge: BridgeHandle,
    /// Gateway configuration.
    pub config: Arc<ServerConfig>,
    /// Shutdown coordinator.
    pub shutdown: ShutdownCoordinator,
    /// When the server started.
    pub start_time: Instant,
    /// Prometheus handle for `/metrics`.
    pub metrics: PrometheusHandle,
}

/// The web gateway.
pub struct BridgeServer {
    state: AppState,
}

impl BridgeServer {
    /// Create a new server.
    pub fn new(
        config: ServerConfig,
        bridge: BridgeHandle,
        shutdown: ShutdownCoordinator,
        metrics: PrometheusHandle,
    ) -> Self {
        Self {
            state: AppState {
                bridge,
                config: Arc::new(config),
                shutdown,
                start_time: Instant::now(),
                metrics,
            },
        }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        let static_dir = &self.state.config.static_dir;
        Router::new()
            .route("/ws", get(ws_handler))
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .route_service("/", ServeFile::new(static_dir.join("index.html")))
            .nest_service("/static", ServeDir::new(static_dir))
            .with_state(self.state.clone())
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(CorsLayer::permissive()),
            )
    }

    /// Bind and start serving in the background.
    ///
    /// Returns the bound address (useful with port 0) and the server task,
    /// which finishes after the shutdown token is cancelled.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let addr = format!("{}:{}", self.state.config.host, self.state.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let local_addr = listener.local_addr()?;
        let router = self.router();
        let token = self.state.shutdown.token();

        info!(%local_addr, static_dir = %self.state.config.static_dir.display(), "web gateway listening");
        let handle = tokio::spawn(async move {
            let served = axum::serve(listener, router)
                .with_graceful_shutdown(async move { token.cancelled().await })
                .await;
            if let Err(error) = served {
                error!(%error, "web gateway stopped with error");
            }
        });
        Ok((local_addr, handle))
    }

    /// The shutdown coordinator.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.state.shutdown
    }

    /// The gateway configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }
}

/// GET /ws
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let conn_id = uuid::Uuid::now_v7().to_string();
    ws.max_message_size(state.config.max_message_size)
        .on_upgrade(move |socket| {
            run_ws_session(
                socket,
                conn_id,
                state.bridge,
                state.config,
                state.shutdown.token(),
            )
        })
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.bridge.status().await {
        Some(status) => (
            StatusCode::OK,
            Json(health::health_check(
                state.start_time,
                true,
                status.subscribers,
                status.active_avatar,
            )),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(health::health_check(
                state.start_time,
                false,
                state.bridge.subscriber_count(),
                None,
            )),
        ),
    }
}

/// GET /metrics
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    crate::metrics::render(&state.metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;
    use vrcbridge_core::ParamValue;
    use vrcbridge_osc::OscSender;
    use vrcbridge_runtime::{AvatarLoader, Bridge, Registry};

    struct NullSender;

    impl OscSender for NullSender {
        fn send(&self, _address: &str, _args: &[ParamValue]) {}
    }

    fn make_bridge() -> (Bridge, BridgeHandle) {
        Bridge::new(
            Registry::builtin().unwrap(),
            AvatarLoader::new(None),
            Arc::new(NullSender),
            Duration::from_millis(10),
        )
    }

    fn make_server(handle: BridgeHandle, static_dir: &std::path::Path) -> BridgeServer {
        let config = ServerConfig {
            static_dir: static_dir.to_path_buf(),
            ..ServerConfig::default()
        };
        let metrics = metrics_exporter_prometheus::PrometheusBuilder::new()
            .build_recorder()
            .handle();
        BridgeServer::new(config, handle, ShutdownCoordinator::new(), metrics)
    }

    async fn get_body(app: Router, uri: &str) -> (StatusCode, String) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn health_reports_running_loop() {
        let dir = tempfile::tempdir().unwrap();
        let (bridge, handle) = make_bridge();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(bridge.run(cancel.clone()));
        let server = make_server(handle, dir.path());

        let (status, body) = get_body(server.router(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["connections"], 0);
        assert!(parsed["activeAvatar"].is_null());
        assert!(parsed["uptimeSecs"].is_number());

        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn health_reports_stopped_loop() {
        let dir = tempfile::tempdir().unwrap();
        let (bridge, handle) = make_bridge();
        drop(bridge);
        let server = make_server(handle, dir.path());

        let (status, body) = get_body(server.router(), "/health").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.contains("\"stopping\""));
    }

    #[tokio::test]
    async fn serves_index_and_static_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>panel</h1>").unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();
        let (_bridge, handle) = make_bridge();
        let server = make_server(handle, dir.path());

        let (status, body) = get_body(server.router(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<h1>panel</h1>");

        let (status, body) = get_body(server.router(), "/static/app.js").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "console.log(1)");
    }

    #[tokio::test]
    async fn metrics_endpoint_renders_text() {
        let dir = tempfile::tempdir().unwrap();
        let (_bridge, handle) = make_bridge();
        let server = make_server(handle, dir.path());
        let (status, _) = get_body(server.router(), "/metrics").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn ws_without_upgrade_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (_bridge, handle) = make_bridge();
        let server = make_server(handle, dir.path());
        let (status, _) = get_body(server.router(), "/ws").await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let dir = tempfile::tempdir().unwrap();
        let (_bridge, handle) = make_bridge();
        let server = make_server(handle, dir.path());
        let (status, _) = get_body(server.router(), "/nonexistent").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn listen_stops_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let (_bridge, handle) = make_bridge();
        let server = make_server(handle, dir.path());
        let (addr, task) = server.listen().await.unwrap();
        assert_ne!(addr.port(), 0);

        server.shutdown().shutdown();
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
    }
}
