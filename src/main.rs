use std::sync::Arc;

use chat_relay::config::{Cli, Config};
use chat_relay::pool::HttpPool;
use chat_relay::server::chat_api::{build_router, AppState};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments.
    let cli = Cli::parse();

    // Initialize tracing/logging.
    let filter = if cli.verbose {
        "chat_relay=debug,tower_http=debug"
    } else {
        "chat_relay=info,tower_http=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with_target(true)
        .init();

    info!("chat-relay v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration.
    let config = Config::load(&cli.config)?;
    let config = Arc::new(config);

    info!(
        backend = %config.backend.host,
        port = config.backend.port,
        model = %config.chat.default_model,
        provider = %config.chat.default_provider,
        assets = %config.assets.root.display(),
        "Configuration loaded"
    );

    // Initialize the shared HTTP client pool before accepting traffic.
    let pool = Arc::new(HttpPool::new());
    pool.initialize(&config.pool).await?;

    // Build application state and the HTTP router.
    let state = Arc::new(AppState {
        config: config.clone(),
        pool: pool.clone(),
    });
    let app = build_router(state);

    // Start the server.
    let listen_addr = cli.listen.unwrap_or_else(|| config.server.listen.clone());
    info!(addr = listen_addr, "Starting server");

    let listener = TcpListener::bind(&listen_addr).await?;
    info!("Listening on {listen_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Release pooled connections once the listener has stopped accepting.
    pool.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
    info!("Shutdown signal received");
}
