use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use brdgen::api::server::start_server;
use brdgen::api::types::ApiContext;
use brdgen::config::{self, AppConfig};
use brdgen::llm::{GeminiClient, GenerativeModel};
use brdgen::store::MemoryStore;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let app_config = AppConfig::from_env();
    if let Err(e) = run(app_config).await {
        tracing::error!("fatal: {e}");
        std::process::exit(1);
    }
}

async fn run(app_config: AppConfig) -> Result<(), String> {
    app_config
        .ensure_dirs()
        .map_err(|e| format!("Cannot create working directories: {e}"))?;

    if app_config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY not set; every document will be built from fallback content");
    }
    let api_key = app_config.gemini_api_key.clone().unwrap_or_default();
    let model: Arc<dyn GenerativeModel> = Arc::new(GeminiClient::new(&api_key));

    let store = Arc::new(MemoryStore::new());
    let bind_addr = app_config.bind_addr;
    let ctx = ApiContext::new(Arc::new(app_config), store, model);

    let mut server = start_server(ctx, bind_addr).await?;
    tracing::info!(addr = %server.addr(), "listening");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("Failed to listen for shutdown signal: {e}"))?;
    tracing::info!("shutting down");
    server.shutdown();

    Ok(())
}
