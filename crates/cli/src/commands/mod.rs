//! CLI command implementations.

pub mod migrate;
pub mod seed;
pub mod user;

use shoptrail_server::config::ServerConfig;
use shoptrail_server::db::{self, Storage};

/// Connect to the database named by the server's configuration.
async fn connect() -> Result<Storage, Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url).await?;
    Ok(Storage::postgres(pool))
}
