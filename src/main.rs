use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use slotbook_api::config::ApiConfig;
use slotbook_api::services::notify::LogDispatcher;
use slotbook_api::services::sweeps::{spawn_sweeps, Sweeper};
use slotbook_db::{create_pool, schema::initialize_database};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;

    // Create database connection pool
    let db_pool = create_pool(&config.database_url).await?;

    // Initialize database schema
    initialize_database(&db_pool).await?;

    // Spawn the sweep timers: auto-progress/auto-complete and reminder delivery
    let sweeper = Arc::new(Sweeper::new(db_pool.clone(), Arc::new(LogDispatcher)));
    spawn_sweeps(
        sweeper,
        config.lifecycle_sweep_interval,
        config.reminder_sweep_interval,
    );

    // Start API server
    slotbook_api::start_server(config, db_pool).await?;

    Ok(())
}
