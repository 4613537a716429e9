use rusty_library_reservation::{
    adapters::{
        logging::NotificationService as LoggingNotificationService,
        memory::CatalogStore as InMemoryCatalogStore,
    },
    api::{handlers::AppState, router::create_router},
    application::catalog::ServiceDependencies,
    config::AppConfig,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "rusty_library_reservation=debug,tower_http=debug,axum=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 設定は起動時に一度だけ読み込む
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    tracing::info!(
        workers = config.reservation.worker_count,
        queue_capacity = config.reservation.queue_capacity,
        hold_secs = config.reservation.hold_duration.as_secs(),
        "Reservation configuration loaded"
    );

    // Initialize adapters
    let catalog_store = Arc::new(InMemoryCatalogStore::new());
    let notification_service = Arc::new(LoggingNotificationService::new());

    // Create service dependencies and start the reservation workers
    let service_deps =
        ServiceDependencies::new(&config.reservation, catalog_store, notification_service);
    service_deps
        .reservation_desk
        .start_workers(config.reservation.worker_count);

    let reservation_desk = Arc::clone(&service_deps.reservation_desk);

    // Create application state
    let app_state = Arc::new(AppState { service_deps });

    // Create router
    let app = create_router(app_state);

    // Server configuration
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");

    // 受付済みの予約を処理し終えてから終了する
    reservation_desk.shutdown().await;
    tracing::info!("Server stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
