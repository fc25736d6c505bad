//! Task service implementation
//!
//! Task listing, completion credit and reward revocation. The completion
//! join table is the single source of truth for "already rewarded".

use chrono::{Duration, Utc};
use tracing::{info, warn};

use crate::database::repositories::{TaskRepository, UserRepository};
use crate::models::task::{CreateTaskRequest, Task, TaskType};
use crate::utils::errors::{EtherealError, Result};
use crate::utils::logging;

/// Result of a completion attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompletionOutcome {
    /// Completion recorded and reward credited
    Completed { reward: f64 },
    /// A completion row already existed; nothing was credited
    AlreadyCompleted,
}

/// Result of an admin rejection of a previously approved completion
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RevokeOutcome {
    /// Reward subtracted and completion row removed
    Revoked { reward: f64 },
    /// Balance below the reward: completion and balance left untouched
    InsufficientBalance,
}

/// Task service for verification and reward bookkeeping
#[derive(Clone)]
pub struct TaskService {
    tasks: TaskRepository,
    users: UserRepository,
}

impl TaskService {
    pub fn new(tasks: TaskRepository, users: UserRepository) -> Self {
        Self { tasks, users }
    }

    /// Tasks this user can still earn from: unexpired and not yet completed
    pub async fn available_for(&self, chat_id: i64) -> Result<Vec<Task>> {
        self.tasks.available_for(chat_id).await
    }

    pub async fn find(&self, task_id: i64) -> Result<Option<Task>> {
        self.tasks.find(task_id).await
    }

    /// Create a task from the admin command arguments; expires in 24 hours
    pub async fn add_task(&self, type_arg: &str, link: &str, reward_arg: &str) -> Result<Task> {
        let task_type = TaskType::from_str(type_arg).ok_or_else(|| {
            EtherealError::InvalidInput(format!(
                "unknown task type '{}', expected join_group, join_channel or external_task",
                type_arg
            ))
        })?;

        let reward: f64 = reward_arg
            .parse()
            .map_err(|_| EtherealError::InvalidInput("reward must be a number".to_string()))?;

        self.tasks
            .create(CreateTaskRequest {
                task_type,
                link: link.to_string(),
                reward,
                expires_at: Utc::now() + Duration::days(1),
            })
            .await
    }

    /// Record a completion and credit the reward.
    ///
    /// The unique (user, task) pair makes this idempotent: a second attempt
    /// reports AlreadyCompleted and credits nothing.
    pub async fn complete(&self, chat_id: i64, task_id: i64) -> Result<CompletionOutcome> {
        let task = self
            .tasks
            .find(task_id)
            .await?
            .ok_or(EtherealError::TaskNotFound { task_id })?;

        if !self.tasks.insert_completion(chat_id, task_id).await? {
            warn!(chat_id = chat_id, task_id = task_id, "Duplicate completion attempt");
            return Ok(CompletionOutcome::AlreadyCompleted);
        }

        self.users.credit_balance(chat_id, task.reward).await?;
        logging::log_balance_change(chat_id, task.reward, "task_completed");

        Ok(CompletionOutcome::Completed { reward: task.reward })
    }

    /// Roll back a previously approved completion.
    ///
    /// When the balance no longer covers the reward the rejection is
    /// reported but neither the balance nor the completion row is touched;
    /// under-deduction is preferred over a negative balance.
    pub async fn revoke(&self, chat_id: i64, task_id: i64) -> Result<RevokeOutcome> {
        let task = self
            .tasks
            .find(task_id)
            .await?
            .ok_or(EtherealError::TaskNotFound { task_id })?;

        let user = self
            .users
            .find(chat_id)
            .await?
            .ok_or(EtherealError::UserNotFound { chat_id })?;

        if user.balance < task.reward {
            info!(
                chat_id = chat_id,
                task_id = task_id,
                balance = user.balance,
                reward = task.reward,
                "Rejection without revocation, balance insufficient"
            );
            return Ok(RevokeOutcome::InsufficientBalance);
        }

        self.users.debit_balance(chat_id, task.reward).await?;
        self.tasks.delete_completion(chat_id, task_id).await?;
        logging::log_balance_change(chat_id, -task.reward, "task_rejected");

        Ok(RevokeOutcome::Revoked { reward: task.reward })
    }

    /// Whether a completion row already exists for this pair
    pub async fn is_completed(&self, chat_id: i64, task_id: i64) -> Result<bool> {
        self.tasks.completion_exists(chat_id, task_id).await
    }
}
