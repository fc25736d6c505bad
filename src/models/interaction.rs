//! Interaction audit log model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Append-only audit record; written by every routed event, read only by
/// reporting.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InteractionLogEntry {
    pub id: i64,
    pub chat_id: i64,
    pub action: String,
    pub created_at: DateTime<Utc>,
}
