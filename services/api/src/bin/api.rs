//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, MemoryDb},
    config::Config,
    error::ApiError,
    web::{router, state::AppState},
};
use event_tracker_core::clock::{Clock, SystemClock};
use event_tracker_core::ports::DatabaseService;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");
    if !config.secure_cookies {
        warn!("APP_ENV is not production; session cookies are sent without the Secure flag");
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // --- 2. Connect to the Store & Run Migrations ---
    let db: Arc<dyn DatabaseService> = if config.uses_memory_store() {
        warn!("Using the in-memory store; all data is lost on shutdown");
        Arc::new(MemoryDb::new(clock.clone()))
    } else {
        info!("Connecting to database...");
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&config.database_url)
            .await?;
        let db_adapter = DbAdapter::new(db_pool);
        info!("Running database migrations...");
        db_adapter.run_migrations().await?;
        info!("Database migrations complete.");
        Arc::new(db_adapter)
    };

    // --- 3. Build the Shared AppState ---
    let app_state = AppState::new(config.clone(), db, clock)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    // --- 4. Create the Web Router ---
    let app = router(Arc::new(app_state));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
