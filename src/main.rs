use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use turbine_sync::common::AppState;
use turbine_sync::config::{Config, LogFormat};
use turbine_sync::routes;
use turbine_sync::store::DataStore;

const DEFAULT_LOG_FILTER: &str = "info,turbine_sync=debug,sqlx=warn";

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration first so the log format can be honoured (fail-fast)
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    tracing::info!("Starting turbine-sync...");
    tracing::info!(
        deployment = ?config.deployment,
        host = %config.api_host,
        port = config.api_port,
        mirror_stores = ?config.mirror_stores,
        plant_stores = ?config.plant_stores,
        fault_report_assignment = %config.fault_report_assignment,
        "Configuration loaded"
    );

    // Connect to the three stores (fail-fast)
    tracing::info!("Connecting to stores...");
    let store = DataStore::connect(&config).await?;
    tracing::info!("Store connections established");

    // Run migrations on every store
    tracing::info!("Running migrations...");
    store.migrate().await?;
    tracing::info!("Migrations completed");

    let addr = config.bind_address();
    let state = AppState::new(store, config);
    let app = routes::build_router(state);

    // Start server with graceful shutdown
    tracing::info!(address = %addr, "Starting server");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        },
    }
}
