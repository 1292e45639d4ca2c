//! Cheato Server - Main entry point

use std::sync::Arc;

use cheato_core::{
    api::{self, AppState},
    config::{Config, Environment},
    db::Database,
    error,
    execution::{Dispatcher, MockGenerator},
    history::{HistoryRecorder, InMemoryStore, InteractionStore},
    observability,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    observability::init("cheato-server", &config.observability)?;
    let metrics = observability::install_metrics()?;
    error::expose_internal_details(config.environment == Environment::Development);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        "Starting Cheato Server"
    );

    let store: Arc<dyn InteractionStore> = match config.database.url.as_deref() {
        Some(url) => {
            let db = Database::connect(url, &config.database).await?;
            db.migrate().await?;
            db.ping().await?;
            tracing::info!("Connected to database");
            Arc::new(db)
        }
        None => {
            tracing::warn!("No database URL configured; interaction history is kept in memory");
            Arc::new(InMemoryStore::new())
        }
    };

    let dispatcher = Dispatcher::new(Arc::new(MockGenerator::new(
        config.llm.mock_latency_scale,
    )));

    let state = AppState::new(
        dispatcher,
        HistoryRecorder::new(store),
        metrics,
        config.environment,
    );
    let app = api::create_router(state, &config);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Starting HTTP server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    observability::shutdown();
    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Wait for shutdown signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
