//! Services module
//!
//! This module contains business logic services

pub mod notification;
pub mod payment;
pub mod reporting;
pub mod task;
pub mod user;

// Re-export commonly used services
pub use notification::{BroadcastOutcome, NotificationService};
pub use payment::PaymentService;
pub use reporting::ReportingService;
pub use task::{CompletionOutcome, RevokeOutcome, TaskService};
pub use user::{CredentialIssue, UserService};

use teloxide::Bot;

use crate::config::Settings;
use crate::database::DatabaseService;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub settings: Settings,
    pub db: DatabaseService,
    pub user_service: UserService,
    pub payment_service: PaymentService,
    pub task_service: TaskService,
    pub notification_service: NotificationService,
    pub reporting_service: ReportingService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(bot: Bot, settings: Settings, db: DatabaseService) -> Self {
        let user_service = UserService::new(db.users.clone());
        let payment_service = PaymentService::new(db.payments.clone());
        let task_service = TaskService::new(db.tasks.clone(), db.users.clone());
        let notification_service = NotificationService::new(bot, settings.clone());
        let reporting_service = ReportingService::new(db.clone());

        Self {
            settings,
            db,
            user_service,
            payment_service,
            task_service,
            notification_service,
            reporting_service,
        }
    }

    /// Whether this chat id is the super-admin
    pub fn is_admin(&self, chat_id: i64) -> bool {
        chat_id == self.settings.bot.admin_id
    }
}
