//! PostgreSQL logo store implementation.

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};

use crate::domain::{AppError, DatabaseError, Logo, LogoStore};

/// PostgreSQL connection pool configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(3),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

/// PostgreSQL logo store with connection pooling
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client with custom configuration
    pub async fn new(database_url: &str, config: PostgresConfig) -> Result<Self, AppError> {
        info!("Connecting to PostgreSQL...");
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
            .connect(database_url)
            .await
            .map_err(|e| AppError::Database(DatabaseError::Connection(e.to_string())))?;
        info!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client with default configuration
    pub async fn with_defaults(database_url: &str) -> Result<Self, AppError> {
        Self::new(database_url, PostgresConfig::default()).await
    }

    /// Run database migrations using sqlx migrate
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Database(DatabaseError::Migration(e.to_string())))?;
        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Get the underlying connection pool (for testing)
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Parse a database row into a Logo
    fn row_to_logo(row: &sqlx::postgres::PgRow) -> Result<Logo, DatabaseError> {
        Ok(Logo {
            external_identifier: row.try_get("external_identifier")?,
            resource_url: row.try_get("resource_url")?,
            content: row.try_get("file_content")?,
            file_name: row.try_get("file_name")?,
            content_type: row.try_get("content_type")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl LogoStore for PostgresClient {
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, external_identifier: &str) -> Result<Option<Logo>, DatabaseError> {
        let row = sqlx::query(
            r#"
            SELECT external_identifier, resource_url, file_content, file_name,
                   content_type, created_at, updated_at
            FROM logo
            WHERE external_identifier = $1
            "#,
        )
        .bind(external_identifier)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_logo).transpose()
    }

    #[instrument(skip(self, logo), fields(identifier = %logo.external_identifier, size = logo.content.len()))]
    async fn save(&self, logo: &Logo) -> Result<Logo, DatabaseError> {
        let row = sqlx::query(
            r#"
            INSERT INTO logo (
                external_identifier, resource_url, file_content, file_name,
                content_type, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING external_identifier, resource_url, file_content, file_name,
                      content_type, created_at, updated_at
            "#,
        )
        .bind(&logo.external_identifier)
        .bind(&logo.resource_url)
        .bind(&logo.content)
        .bind(&logo.file_name)
        .bind(&logo.content_type)
        .bind(logo.created_at)
        .bind(logo.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_logo(&row)
    }
}
