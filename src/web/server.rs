//! Server lifecycle: bind → spawn background task → return handle
//! with a shutdown channel.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::oneshot;

use super::router::build_router;
use crate::core_state::CoreState;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Handle to a running server.
pub struct WebServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: tokio::task::JoinHandle<()>,
}

impl WebServer {
    /// Signal graceful shutdown and wait for the server task to end.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("Web server shutdown signal sent");
        }
        if let Err(e) = self.task.await {
            tracing::error!("Web server task failed: {e}");
        }
    }
}

async fn bind(addr: SocketAddr) -> Result<(tokio::net::TcpListener, SocketAddr), ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let local = listener.local_addr()?;
    Ok((listener, local))
}

/// Start the server in a background task.
///
/// Port 0 picks an ephemeral port; the bound address is on the handle.
pub async fn start_server(core: Arc<CoreState>, addr: SocketAddr) -> Result<WebServer, ServerError> {
    let (listener, addr) = bind(addr).await?;
    let app = build_router(core);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("Web server received shutdown signal");
        };

        tracing::info!(%addr, "Web server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("Web server error: {e}");
        }

        tracing::info!("Web server stopped");
    });

    Ok(WebServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisGateway, MockProvider};

    fn test_core() -> Arc<CoreState> {
        let gateway = AnalysisGateway::new(Arc::new(MockProvider::new("{}")), "gemini-2.5-flash");
        Arc::new(CoreState::new(gateway))
    }

    fn loopback() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 0))
    }

    #[tokio::test]
    async fn server_starts_and_answers_health() {
        let server = start_server(test_core(), loopback()).await.unwrap();
        assert_ne!(server.addr.port(), 0);

        let url = format!("http://{}/health", server.addr);
        let response = reqwest::get(&url).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let json: serde_json::Value = response.json().await.unwrap();
        assert_eq!(json["status"], "ok");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn server_stops_after_shutdown() {
        let server = start_server(test_core(), loopback()).await.unwrap();
        let addr = server.addr;
        server.shutdown().await;

        let result = reqwest::get(format!("http://{addr}/health")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn bind_conflict_is_reported() {
        let server = start_server(test_core(), loopback()).await.unwrap();
        let err = start_server(test_core(), server.addr).await.err().unwrap();
        assert!(matches!(err, ServerError::Bind { .. }));
        server.shutdown().await;
    }
}
