//! Database layer for Cheato.
//!
//! PostgreSQL-backed [`InteractionStore`] using sqlx.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::error::{CheatoError, Result};
use crate::history::InteractionStore;
use crate::types::{InteractionLog, InteractionMetadata, StoredInteraction};

/// Database connection and operations.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(url)
            .await?;

        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Database pool created"
        );
        Ok(Self { pool })
    }

    /// Run migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| CheatoError::from(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Round-trip a trivial query.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Get the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl InteractionStore for Database {
    async fn insert(&self, log: &InteractionLog) -> Result<StoredInteraction> {
        let row = sqlx::query_as::<_, InteractionRow>(
            r#"
            INSERT INTO interaction_history (id, user_id, model, prompt, result, metadata, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, model, prompt, result, metadata, timestamp
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&log.user_id)
        .bind(log.model.as_str())
        .bind(&log.prompt)
        .bind(&log.result)
        .bind(log.metadata.clone().map(Json))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<StoredInteraction>> {
        // NULL limit means no limit in PostgreSQL
        let limit = limit.map(|l| l as i64);

        let rows = sqlx::query_as::<_, InteractionRow>(
            r#"
            SELECT id, user_id, model, prompt, result, metadata, timestamp
            FROM interaction_history
            WHERE user_id = $1
            ORDER BY timestamp DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Row Types (for sqlx queries)
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, sqlx::FromRow)]
pub struct InteractionRow {
    pub id: Uuid,
    pub user_id: String,
    pub model: String,
    pub prompt: String,
    pub result: String,
    pub metadata: Option<Json<InteractionMetadata>>,
    pub timestamp: DateTime<Utc>,
}

impl From<InteractionRow> for StoredInteraction {
    fn from(row: InteractionRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            model: row.model,
            prompt: row.prompt,
            result: row.result,
            metadata: row.metadata.map(|Json(m)| m),
            timestamp: row.timestamp,
        }
    }
}
