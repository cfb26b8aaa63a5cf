pub mod analytics; // Analytics aggregator (pure snapshot over the collections)
pub mod api; // HTTP/JSON boundary
pub mod auth; // Access gate: password hashing + signed bearer tokens
pub mod config;
pub mod models;
pub mod referral; // Referral lifecycle engine (status state machine)
pub mod store; // Flat-file document store

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

/// Wire everything together and serve until interrupted.
pub async fn run() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let data_dir = config::data_dir();
    let store = Arc::new(
        store::Store::open(&data_dir)
            .map_err(|e| format!("Failed to open document store at {data_dir:?}: {e}"))?,
    );

    let signer = auth::TokenSigner::new(config::token_secret());
    let ctx = api::ApiContext::new(store, signer);

    let mut server = api::server::start_api_server(ctx, config::bind_addr()).await?;
    tracing::info!("Access the API at http://{}", server.addr);

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("Failed to listen for shutdown signal: {e}"))?;
    server.shutdown();

    Ok(())
}
