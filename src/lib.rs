//! EtherealBot Telegram Bot
//!
//! A Telegram bot for the Ethereal membership and earnings platform.
//! This library provides modular components for registration, coupon
//! purchases, task verification with admin approval gates, coach
//! management and broadcast reporting.

#![allow(non_snake_case)]

pub mod config;
pub mod content;
pub mod database;
pub mod handlers;
pub mod models;
pub mod scheduler;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{EtherealError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use scheduler::ReminderScheduler;
pub use services::ServiceFactory;
pub use state::{Expectation, SessionStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
