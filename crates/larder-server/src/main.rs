//! # Larder Server
//!
//! Entry point: load configuration, connect the database and cache, serve
//! the REST API until SIGINT or SIGTERM.

use anyhow::Context;
use larder_config::ConfigLoader;
use larder_repository::DatabasePool;
use larder_server::{
    di::AppModule,
    startup::{init_logging, log_startup_info},
};
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Application error: {:#}", e);
        eprintln!("larder-server: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = ConfigLoader::from_default_location()
        .load()
        .context("Failed to load configuration")?;

    init_logging(&config.observability);
    info!("Starting Larder Server...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.environment);

    let database = DatabasePool::connect(&config.database)
        .await
        .context("Failed to connect to the database")?;

    if config.database.run_migrations {
        database.run_migrations().await.context("Failed to run migrations")?;
    }

    let module = AppModule::builder()
        .with_database_pool(database.clone())
        .build(&config)
        .context("Failed to wire application")?;

    if let Err(e) = module.cache_store().health_check().await {
        warn!(error = %e, "Cache store is not reachable; continuing without cached responses");
    }

    let router = module.router(&config);
    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Starting REST server on http://{}", addr);
    log_startup_info(&config.server);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("REST server error")?;

    database.close().await;
    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}
