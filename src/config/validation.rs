//! Configuration validation
//!
//! Startup-time sanity checks over the loaded settings.

use crate::config::Settings;
use crate::utils::errors::EtherealError;

/// Validate the loaded settings before the bot starts
pub fn validate_settings(settings: &Settings) -> Result<(), EtherealError> {
    if settings.bot.token.trim().is_empty() {
        return Err(EtherealError::Config("bot.token must not be empty".to_string()));
    }

    if settings.bot.admin_id == 0 {
        return Err(EtherealError::Config("bot.admin_id must be set".to_string()));
    }

    if !settings.database.url.starts_with("postgres") {
        return Err(EtherealError::Config(format!(
            "database.url must be a postgres URL, got '{}'",
            settings.database.url
        )));
    }

    if settings.database.max_connections == 0
        || settings.database.min_connections > settings.database.max_connections
    {
        return Err(EtherealError::Config(
            "database connection bounds are inconsistent".to_string(),
        ));
    }

    if settings.links.group_link.trim().is_empty() || settings.links.site_link.trim().is_empty() {
        return Err(EtherealError::Config(
            "links.group_link and links.site_link must be set".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.bot.token = "123:abc".to_string();
        settings.bot.admin_id = 5646269450;
        settings
    }

    #[test]
    fn test_valid_settings_pass() {
        assert!(validate_settings(&valid_settings()).is_ok());
    }

    #[test]
    fn test_missing_token_rejected() {
        let mut settings = valid_settings();
        settings.bot.token = String::new();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_missing_admin_rejected() {
        let mut settings = valid_settings();
        settings.bot.admin_id = 0;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_bad_database_url_rejected() {
        let mut settings = valid_settings();
        settings.database.url = "mysql://localhost/ethereal".to_string();
        assert!(validate_settings(&settings).is_err());
    }
}
