//! Task and completion models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// How a task is verified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
pub enum TaskType {
    JoinGroup,
    JoinChannel,
    ExternalTask,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::JoinGroup => "join_group",
            TaskType::JoinChannel => "join_channel",
            TaskType::ExternalTask => "external_task",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "join_group" => Some(TaskType::JoinGroup),
            "join_channel" => Some(TaskType::JoinChannel),
            "external_task" => Some(TaskType::ExternalTask),
            _ => None,
        }
    }

    /// Membership-checked tasks are verified synchronously against the chat;
    /// external tasks go through screenshot review.
    pub fn is_membership_check(&self) -> bool {
        matches!(self, TaskType::JoinGroup | TaskType::JoinChannel)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub task_type: TaskType,
    pub link: String,
    pub reward: f64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Proof a user finished a task and was rewarded exactly once
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Completion {
    pub user_id: i64,
    pub task_id: i64,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub task_type: TaskType,
    pub link: String,
    pub reward: f64,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_type_roundtrip() {
        for tt in [TaskType::JoinGroup, TaskType::JoinChannel, TaskType::ExternalTask] {
            assert_eq!(TaskType::from_str(tt.as_str()), Some(tt));
        }
        assert_eq!(TaskType::from_str("unknown"), None);
    }

    #[test]
    fn test_verification_branch() {
        assert!(TaskType::JoinGroup.is_membership_check());
        assert!(TaskType::JoinChannel.is_membership_check());
        assert!(!TaskType::ExternalTask.is_membership_check());
    }
}
