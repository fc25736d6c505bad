//! Task and completion repository implementation

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use crate::models::task::{CreateTaskRequest, Task};
use crate::utils::errors::EtherealError;

const TASK_COLUMNS: &str = "id, task_type, link, reward, created_at, expires_at";

#[derive(Clone)]
#[derive(Debug)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreateTaskRequest) -> Result<Task, EtherealError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (task_type, link, reward, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(request.task_type)
        .bind(request.link)
        .bind(request.reward)
        .bind(Utc::now())
        .bind(request.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(task)
    }

    pub async fn find(&self, task_id: i64) -> Result<Option<Task>, EtherealError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    /// Tasks still open for this user: not expired and not already completed
    pub async fn available_for(&self, chat_id: i64) -> Result<Vec<Task>, EtherealError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks t
            WHERE t.expires_at > $1
            AND t.id NOT IN (SELECT ut.task_id FROM user_tasks ut WHERE ut.user_id = $2)
            ORDER BY t.id
            "#
        ))
        .bind(Utc::now())
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    /// Insert a completion row. Returns false when the (user, task) pair
    /// already exists, which is the double-payout guard.
    pub async fn insert_completion(&self, user_id: i64, task_id: i64) -> Result<bool, EtherealError> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_tasks (user_id, task_id, completed_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, task_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(task_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn completion_exists(&self, user_id: i64, task_id: i64) -> Result<bool, EtherealError> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM user_tasks WHERE user_id = $1 AND task_id = $2)",
        )
        .bind(user_id)
        .bind(task_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists.0)
    }

    /// Roll back a previously recorded completion
    pub async fn delete_completion(&self, user_id: i64, task_id: i64) -> Result<bool, EtherealError> {
        let result = sqlx::query("DELETE FROM user_tasks WHERE user_id = $1 AND task_id = $2")
            .bind(user_id)
            .bind(task_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn completions_since(&self, since: DateTime<Utc>) -> Result<i64, EtherealError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM user_tasks WHERE completed_at >= $1")
                .bind(since)
                .fetch_one(&self.pool)
                .await?;

        Ok(count.0)
    }

    /// Sum of rewards for completions recorded in the window
    pub async fn rewards_distributed_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<f64, EtherealError> {
        let sum: (Option<f64>,) = sqlx::query_as(
            r#"
            SELECT SUM(t.reward)
            FROM user_tasks ut
            JOIN tasks t ON ut.task_id = t.id
            WHERE ut.completed_at >= $1
            "#,
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(sum.0.unwrap_or(0.0))
    }
}
