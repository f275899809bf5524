use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use accounts::config::AccountsConfig;
use accounts::password::Argon2Hasher;
use accounts::repositories::{MicropostRepository, RelationshipRepository, UserRepository};
use accounts::{AccountService, schema, telemetry};
use common::database::{health_check, init_pool};

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing()?;

    info!("Starting accounts service");

    let config = AccountsConfig::from_env()?;
    let pool = init_pool(&config.database).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    schema::migrate(&pool).await?;

    let hasher = Arc::new(Argon2Hasher::new(config.hashing)?);
    let service = AccountService::new(
        Arc::new(UserRepository::new(pool.clone())),
        Arc::new(MicropostRepository::new(pool.clone())),
        Arc::new(RelationshipRepository::new(pool)),
        hasher,
    );

    info!(
        "Accounts schema ready: {} users, {} microposts",
        service.user_count().await?,
        service.micropost_count().await?
    );

    Ok(())
}
