//! Coach model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A coach is addressed by their own chat id, so a coach can also act as a
/// regular bot user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Coach {
    pub coach_id: i64,
    pub name: String,
    pub added_by: i64,
    pub added_at: DateTime<Utc>,
}

/// Display name of the seeded super-admin coach
pub const DEFAULT_COACH_NAME: &str = "Big Scott Media";
