//! Configuration module
//!
//! Settings loading and validation.

pub mod settings;
pub mod validation;

pub use settings::{Settings, BotConfig, DatabaseConfig, LinksConfig, LoggingConfig};
