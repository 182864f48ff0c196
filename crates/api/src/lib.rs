//! # Slotbook API
//!
//! The API crate provides the web server implementation for the Slotbook
//! booking service. It exposes the booking, lifecycle, and availability
//! endpoints and owns the sweep entry points driven by the server binary's
//! timers.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Thin request/response mapping
//! - **Services**: The booking, lifecycle, and reminder engine
//! - **Middleware**: Error mapping to HTTP responses
//! - **Config**: Environment and application configuration
//!
//! The API uses Axum as the web framework and SQLx for database
//! interactions; the pure scheduling rules live in `slotbook-core`.

/// Configuration module for API settings
pub mod config;
/// Request handlers that map HTTP to the services
pub mod handlers;
/// Middleware for error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;
/// Booking, lifecycle, and reminder orchestration
pub mod services;

use std::sync::Arc;

use axum::Router;
use eyre::Result;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use services::locks::PartitionLocks;

/// Shared application state that is accessible to all request handlers
///
/// Holds the database pool and the in-process partition lock registry that
/// keeps same-partition booking writes from racing within one process.
pub struct ApiState {
    /// PostgreSQL connection pool for database operations
    pub db_pool: PgPool,
    /// Per-(operator, date) booking serialization
    pub partition_locks: PartitionLocks,
}

/// Starts the API server with the provided configuration and database connection
///
/// This function initializes logging, configures routes, and starts the
/// HTTP server. Sweep timers are spawned separately by the binary (see
/// `services::sweeps::spawn_sweeps`) so the sweeps stay timer-driven rather
/// than request-driven.
///
/// # Arguments
///
/// * `config` - API configuration including host, port, and other settings
/// * `db_pool` - PostgreSQL connection pool for database operations
pub async fn start_server(config: config::ApiConfig, db_pool: PgPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Create shared state with dependencies
    let state = Arc::new(ApiState {
        db_pool,
        partition_locks: PartitionLocks::new(),
    });

    // Build the application router with all routes
    let app = Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Appointment booking and lifecycle endpoints
        .merge(routes::appointments::routes())
        // Operator availability window endpoints
        .merge(routes::availability::routes())
        // Attach shared state to all routes
        .with_state(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(
                origins
                    .iter()
                    .map(|origin| origin.parse().unwrap())
                    .collect::<Vec<_>>(),
            )
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware
    let app = app.layer(tower_http::timeout::TimeoutLayer::new(
        std::time::Duration::from_secs(config.request_timeout),
    ));

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
