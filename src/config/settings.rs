//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub bot: BotConfig,
    pub database: DatabaseConfig,
    pub links: LinksConfig,
    pub logging: LoggingConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    pub token: String,
    /// Super-admin chat id; approvals, credentials and reports go here
    pub admin_id: i64,
    /// Designated broadcast channel limited to read-only sub-commands
    pub channel_id: i64,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// External links surfaced in bot copy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LinksConfig {
    pub group_link: String,
    pub site_link: String,
    pub ai_boost_link: String,
    pub verification_group: String,
    pub daily_task_link: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("ETHEREAL").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::EtherealError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                token: String::new(),
                admin_id: 0,
                channel_id: 0,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/ethereal".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            links: LinksConfig {
                group_link: "@etherealplus".to_string(),
                site_link: "https://etherealweb.site/signup".to_string(),
                ai_boost_link: "https://etherealweb.site/account/social-boost".to_string(),
                verification_group: "@taskchecked".to_string(),
                daily_task_link: "https://etherealweb.site/account/social/snapchat-streak".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "/var/log/ethereal".to_string(),
            },
        }
    }
}
