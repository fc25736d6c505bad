//! Database service layer
//!
//! This module provides a high-level interface to database operations

use tracing::warn;

use crate::database::{
    AccountRepository, CoachRepository, DatabasePool, InteractionRepository, PaymentRepository,
    TaskRepository, UserRepository,
};
use crate::models::DEFAULT_COACH_NAME;
use crate::utils::errors::EtherealError;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub users: UserRepository,
    pub payments: PaymentRepository,
    pub tasks: TaskRepository,
    pub coaches: CoachRepository,
    pub accounts: AccountRepository,
    pub interactions: InteractionRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            payments: PaymentRepository::new(pool.clone()),
            tasks: TaskRepository::new(pool.clone()),
            coaches: CoachRepository::new(pool.clone()),
            accounts: AccountRepository::new(pool.clone()),
            interactions: InteractionRepository::new(pool),
        }
    }

    /// Seed ledger invariants that must hold before the first event:
    /// the super-admin is always present on the coach roster.
    pub async fn seed(&self, admin_id: i64) -> Result<(), EtherealError> {
        self.coaches.seed_default(admin_id, DEFAULT_COACH_NAME).await
    }

    /// Append to the interaction audit log.
    ///
    /// Fire-and-forget: a failed append is logged and swallowed so it can
    /// never abort the flow that triggered it.
    pub async fn log_interaction(&self, chat_id: i64, action: &str) {
        if let Err(e) = self.interactions.log(chat_id, action).await {
            warn!(chat_id = chat_id, action = action, error = %e, "Failed to record interaction");
        }
    }
}
