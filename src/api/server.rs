//! HTTP server lifecycle: bind → spawn background task → return a handle
//! with a shutdown channel.

use std::net::SocketAddr;

use tokio::sync::oneshot;

use crate::api::router::api_router;
use crate::api::types::ApiContext;

/// Handle to a running API server.
pub struct ApiServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ApiServer {
    /// The address the server actually bound (useful with port 0).
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Shut down the server gracefully. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }
}

/// Bind the listener and spawn the axum server in a background task.
pub async fn start_server(ctx: ApiContext, addr: SocketAddr) -> Result<ApiServer, String> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind API server on {addr}: {e}"))?;

    let bound = listener
        .local_addr()
        .map_err(|e| format!("Failed to get server address: {e}"))?;

    let app = api_router(ctx);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(addr = %bound, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        tracing::info!("API server stopped");
    });

    Ok(ApiServer {
        addr: bound,
        shutdown_tx: Some(shutdown_tx),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::AppConfig;
    use crate::llm::MockModel;
    use crate::store::MemoryStore;

    fn test_ctx(tmp: &tempfile::TempDir) -> ApiContext {
        let config = AppConfig {
            bind_addr: ([127, 0, 0, 1], 0).into(),
            uploads_dir: tmp.path().join("uploads"),
            temp_dir: tmp.path().join("temp"),
            gemini_api_key: None,
            max_concurrent_pipelines: 2,
        };
        config.ensure_dirs().unwrap();
        ApiContext::new(
            Arc::new(config),
            Arc::new(MemoryStore::new()),
            Arc::new(MockModel::failing()),
        )
    }

    #[tokio::test]
    async fn start_and_stop_server() {
        let tmp = tempfile::tempdir().unwrap();
        let mut server = start_server(test_ctx(&tmp), ([127, 0, 0, 1], 0).into())
            .await
            .expect("server should start");

        assert!(server.addr().port() > 0);

        let url = format!("http://{}/api/health", server.addr());
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        server.shutdown();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let mut server = start_server(test_ctx(&tmp), ([127, 0, 0, 1], 0).into())
            .await
            .expect("server should start");

        server.shutdown();
        server.shutdown();
    }
}
