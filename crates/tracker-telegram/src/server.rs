//! HTTP listener for the health check and the Telegram webhook.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::info;

use crate::state::BotState;

/// Name reported by the health endpoint.
pub const BOT_NAME: &str = "Daily Task Tracker";

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub bot: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub time: DateTime<Utc>,
}

/// GET / - liveness check.
async fn health(State(state): State<Arc<BotState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "running".to_string(),
        bot: BOT_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        time: Utc::now(),
    })
}

/// Router serving the health endpoint.
pub fn health_router(state: Arc<BotState>) -> Router {
    Router::new().route("/", get(health)).with_state(state)
}

/// Address the HTTP listener binds to.
pub fn bind_address(port: u16) -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], port))
}

/// Bind the HTTP listener on all interfaces.
pub async fn bind(port: u16) -> std::io::Result<TcpListener> {
    let addr = bind_address(port);
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    Ok(listener)
}

/// Serve `router` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum_test::TestServer;
    use tracker_core::{
        AppendAck, BotConfig, Result, ServiceAccountKey, SheetInfo, SheetWriter, TaskEntry,
    };

    struct NullWriter;

    #[async_trait]
    impl SheetWriter for NullWriter {
        async fn append(&self, _entry: &TaskEntry) -> Result<AppendAck> {
            Ok(AppendAck::from_range("Sheet1!A2:C2"))
        }

        async fn check_connection(&self) -> Result<SheetInfo> {
            Ok(SheetInfo {
                spreadsheet_id: "sheet-123".to_string(),
                title: "Daily Tasks".to_string(),
            })
        }
    }

    fn make_test_state() -> Arc<BotState> {
        let config = BotConfig {
            bot_token: "123:abc".to_string(),
            sheet_id: "sheet-123".to_string(),
            credentials: ServiceAccountKey {
                client_email: "tracker@example.iam.gserviceaccount.com".to_string(),
                private_key: String::new(),
                private_key_id: None,
                token_uri: "https://oauth2.googleapis.com/token".to_string(),
            },
            port: 8000,
            webhook_url: None,
            worksheet: "Sheet1".to_string(),
        };
        crate::state::create_shared_state(Arc::new(config), Arc::new(NullWriter))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let server = TestServer::new(health_router(make_test_state())).unwrap();

        let response = server.get("/").await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "running");
        assert_eq!(body["bot"], BOT_NAME);
        assert!(!body["version"].as_str().unwrap().is_empty());
        assert!(body["uptime_seconds"].is_u64());
        assert!(body["time"].as_str().unwrap().parse::<DateTime<Utc>>().is_ok());
    }

    #[tokio::test]
    async fn test_serve_stops_on_shutdown() {
        let listener = bind(0).await.unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let handle = tokio::spawn(serve(
            listener,
            health_router(make_test_state()),
            async move {
                let _ = rx.await;
            },
        ));

        tx.send(()).unwrap();
        assert!(handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let server = TestServer::new(health_router(make_test_state())).unwrap();
        server.get("/metrics").await.assert_status_not_found();
    }
}
