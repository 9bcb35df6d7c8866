use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, Executor, PgPool};
use tracing::info;

use crate::config::DatabaseConfig;
use super::error::DatabaseError;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Handle on the connection pool, built once at startup and passed to
/// every data-access call through the application state.
#[derive(Clone, Debug)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect using the configured URL and pool limits
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool (max_connections={})", config.max_connections);
        Ok(Self { pool })
    }

    /// Connect with every pooled connection pinned to `schema`.
    ///
    /// The schema is created if missing. Integration tests use this to give
    /// each test its own tables inside one shared database.
    pub async fn connect_isolated(url: &str, schema: &str) -> Result<Self, DatabaseError> {
        if !Self::is_valid_schema_name(schema) {
            return Err(DatabaseError::QueryError(format!("Invalid schema name: {}", schema)));
        }

        let admin = PgPoolOptions::new().max_connections(1).connect(url).await?;
        admin
            .execute(format!("CREATE SCHEMA IF NOT EXISTS \"{}\"", schema).as_str())
            .await?;
        admin.close().await;

        let search_path = format!("SET search_path TO \"{}\"", schema);
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .after_connect(move |conn, _meta| {
                let search_path = search_path.clone();
                Box::pin(async move {
                    conn.execute(search_path.as_str()).await?;
                    Ok(())
                })
            })
            .connect(url)
            .await?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending migrations from `migrations/`
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        MIGRATOR.run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Drop an isolated schema created by [`Database::connect_isolated`]
    pub async fn drop_schema(&self, schema: &str) -> Result<(), DatabaseError> {
        if !Self::is_valid_schema_name(schema) {
            return Err(DatabaseError::QueryError(format!("Invalid schema name: {}", schema)));
        }
        self.pool
            .execute(format!("DROP SCHEMA IF EXISTS \"{}\" CASCADE", schema).as_str())
            .await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }

    /// Schema names are spliced into SQL, so only [a-z0-9_] is accepted
    fn is_valid_schema_name(name: &str) -> bool {
        !name.is_empty()
            && name.len() <= 63
            && name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
            && !name.starts_with(|c: char| c.is_ascii_digit())
    }
}
