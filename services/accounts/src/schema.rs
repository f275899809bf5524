//! Embedded database migrations

use common::database::run_migrations;
use common::error::DatabaseResult;
use sqlx::PgPool;
use sqlx::migrate::Migrator;

/// Migrations for the users, microposts and relationships tables
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Bring the schema up to date
pub async fn migrate(pool: &PgPool) -> DatabaseResult<()> {
    run_migrations(pool, &MIGRATOR).await
}
