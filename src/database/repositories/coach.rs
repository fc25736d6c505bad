//! Coach roster repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::coach::Coach;
use crate::utils::errors::EtherealError;

#[derive(Clone)]
#[derive(Debug)]
pub struct CoachRepository {
    pool: PgPool,
}

impl CoachRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Ensure the super-admin coach exists; called once at startup
    pub async fn seed_default(&self, coach_id: i64, name: &str) -> Result<(), EtherealError> {
        sqlx::query(
            r#"
            INSERT INTO coaches (coach_id, name, added_by, added_at)
            VALUES ($1, $2, $1, $3)
            ON CONFLICT (coach_id) DO NOTHING
            "#,
        )
        .bind(coach_id)
        .bind(name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn insert(&self, coach_id: i64, name: &str, added_by: i64) -> Result<Coach, EtherealError> {
        let coach = sqlx::query_as::<_, Coach>(
            r#"
            INSERT INTO coaches (coach_id, name, added_by, added_at)
            VALUES ($1, $2, $3, $4)
            RETURNING coach_id, name, added_by, added_at
            "#,
        )
        .bind(coach_id)
        .bind(name)
        .bind(added_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(coach)
    }

    pub async fn find(&self, coach_id: i64) -> Result<Option<Coach>, EtherealError> {
        let coach = sqlx::query_as::<_, Coach>(
            "SELECT coach_id, name, added_by, added_at FROM coaches WHERE coach_id = $1",
        )
        .bind(coach_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(coach)
    }

    pub async fn exists(&self, coach_id: i64) -> Result<bool, EtherealError> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM coaches WHERE coach_id = $1)")
                .bind(coach_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists.0)
    }

    pub async fn list(&self) -> Result<Vec<Coach>, EtherealError> {
        let coaches = sqlx::query_as::<_, Coach>(
            "SELECT coach_id, name, added_by, added_at FROM coaches ORDER BY added_at",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(coaches)
    }

    /// Hard delete; returns false when no such coach exists
    pub async fn delete(&self, coach_id: i64) -> Result<bool, EtherealError> {
        let result = sqlx::query("DELETE FROM coaches WHERE coach_id = $1")
            .bind(coach_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
