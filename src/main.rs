//!
//! Rent lifecycle and checkout settlement service for the Stayvia
//! marketplace. Reads configuration from a TOML file
//! (~/.config/stayvia-rent/config.toml).

use std::sync::Arc;

use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use stayvia_rent::application::services::{
    start_checkout_timeout_task, CheckoutService, RentRequestService,
};
use stayvia_rent::config::AppConfig;
use stayvia_rent::infrastructure::crypto::jwt::JwtConfig;
use stayvia_rent::infrastructure::database::migrator::Migrator;
use stayvia_rent::shared::shutdown::ShutdownCoordinator;
use stayvia_rent::{
    create_api_router, create_event_bus, default_config_path, init_database, DatabaseConfig,
    SeaOrmRepositoryProvider,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("RENT_SERVICE_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level)),
                )
                .init();
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        }
    };

    info!("Starting Stayvia rent lifecycle service...");

    // ── Prometheus metrics recorder (must be installed before any metrics calls) ──
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    info!("Prometheus metrics recorder installed");

    // ── Database ───────────────────────────────────────────────
    let db_config = DatabaseConfig {
        url: app_cfg.database.connection_url(),
    };
    info!("Database: {}", db_config.url);

    let db = match init_database(&db_config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    info!("Running database migrations...");
    if let Err(e) = Migrator::up(&db, None).await {
        error!("Failed to run migrations: {}", e);
        return Err(e.into());
    }
    info!("Migrations completed");

    // ── Repositories & services ────────────────────────────────
    let repos: Arc<dyn stayvia_rent::domain::RepositoryProvider> =
        Arc::new(SeaOrmRepositoryProvider::new(db.clone()));

    let event_bus = create_event_bus();
    info!("Event bus initialized for workflow notifications");

    let rent_request_service = Arc::new(RentRequestService::new(
        repos.clone(),
        event_bus.clone(),
        app_cfg.payment.gateway_redirect_base.clone(),
    ));
    let checkout_service = Arc::new(CheckoutService::new(repos.clone(), event_bus.clone()));

    let jwt_config = JwtConfig {
        secret: app_cfg.security.jwt_secret.clone(),
        expiration_hours: app_cfg.security.jwt_expiration_hours,
        issuer: "stayvia-identity".to_string(),
    };
    info!(
        "JWT validation configured ({}h token expiration)",
        jwt_config.expiration_hours
    );

    // ── Shutdown coordination ──────────────────────────────────
    let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
    let shutdown_signal = shutdown.signal();
    shutdown.start_signal_listener();

    // ── Checkout timeout sweep ─────────────────────────────────
    start_checkout_timeout_task(
        checkout_service.clone(),
        shutdown_signal.clone(),
        app_cfg.checkout.sweep_interval_secs,
        app_cfg.checkout.confirmation_window_hours,
    );

    // ── REST API server ────────────────────────────────────────
    let api_router = create_api_router(
        rent_request_service,
        checkout_service,
        jwt_config,
        prometheus_handle,
    );

    let api_addr = format!("{}:{}", app_cfg.server.api_host, app_cfg.server.api_port);
    let listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("REST API server listening on http://{}", api_addr);
    info!("Swagger UI available at http://{}/docs/", api_addr);

    let api_shutdown = shutdown_signal.clone();
    axum::serve(listener, api_router)
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API server received shutdown signal");
        })
        .await?;

    // ── Final cleanup ──────────────────────────────────────────
    info!("Performing final cleanup...");

    if let Err(e) = db.close().await {
        warn!("Error closing database connection: {}", e);
    } else {
        info!("Database connection closed");
    }

    info!("Stayvia rent lifecycle service shutdown complete");
    Ok(())
}
