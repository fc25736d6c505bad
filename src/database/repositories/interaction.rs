//! Interaction audit log repository implementation

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use crate::utils::errors::EtherealError;

#[derive(Clone)]
#[derive(Debug)]
pub struct InteractionRepository {
    pool: PgPool,
}

impl InteractionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append an audit record; rows are never updated or deleted
    pub async fn log(&self, chat_id: i64, action: &str) -> Result<(), EtherealError> {
        sqlx::query("INSERT INTO interactions (chat_id, action, created_at) VALUES ($1, $2, $3)")
            .bind(chat_id)
            .bind(action)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn count_by_action(&self, action: &str) -> Result<i64, EtherealError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM interactions WHERE action = $1")
            .bind(action)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    pub async fn count_since(&self, since: DateTime<Utc>) -> Result<i64, EtherealError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM interactions WHERE created_at >= $1")
            .bind(since)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
