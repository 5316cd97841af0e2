use catalog_search::{
    api::{build_router, AppState},
    config::Config,
    ingest::CatalogService,
    search::TantivyGateway,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_search=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {e}");
        eprintln!("Using default configuration");
        Config::default()
    });

    tracing::info!("Starting catalog search v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        data_dir = %config.search.data_dir.display(),
        refresh = ?config.search.refresh,
        "Search engine configuration"
    );

    // Open both collection indexes and wire up the service
    let gateway = Arc::new(TantivyGateway::open(&config.search)?);
    let catalog = Arc::new(CatalogService::new(gateway));
    let app = build_router(AppState::new(catalog));

    // Start HTTP server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("HTTP API server listening on http://{addr}");
    tracing::info!("   Health check: http://{addr}/health");
    tracing::info!("   Course search: http://{addr}/course/search");
    tracing::info!("   Timetable search: http://{addr}/timetable/search");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    tracing::info!("Shutting down gracefully...");
    Ok(())
}
