//! Database module
//!
//! Connection pooling, migrations, repositories and the service facade.

pub mod connection;
pub mod repositories;
pub mod service;

pub use connection::{create_pool, run_migrations, DatabaseConfig, DatabasePool};
pub use repositories::{
    AccountRepository, CoachRepository, InteractionRepository, PaymentRepository, TaskRepository,
    UserRepository,
};
pub use service::DatabaseService;
