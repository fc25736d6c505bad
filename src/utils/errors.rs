//! Error handling for EtherealBot
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for the EtherealBot application
#[derive(Error, Debug)]
pub enum EtherealError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("User not found: {chat_id}")]
    UserNotFound { chat_id: i64 },

    #[error("Task not found: {task_id}")]
    TaskNotFound { task_id: i64 },

    #[error("Payment not found: {payment_id}")]
    PaymentNotFound { payment_id: i64 },

    #[error("Coach not found: {coach_id}")]
    CoachNotFound { coach_id: i64 },

    #[error("Payment account not found: {country}")]
    AccountNotFound { country: String },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for EtherealBot operations
pub type Result<T> = std::result::Result<T, EtherealError>;

impl EtherealError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            EtherealError::Database(_) => false,
            EtherealError::Migration(_) => false,
            EtherealError::Telegram(_) => true,
            EtherealError::Config(_) => false,
            EtherealError::PermissionDenied(_) => false,
            EtherealError::UserNotFound { .. } => false,
            EtherealError::TaskNotFound { .. } => false,
            EtherealError::PaymentNotFound { .. } => false,
            EtherealError::CoachNotFound { .. } => false,
            EtherealError::AccountNotFound { .. } => false,
            EtherealError::InvalidStateTransition { .. } => false,
            EtherealError::Serialization(_) => false,
            EtherealError::Io(_) => true,
            EtherealError::InvalidInput(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtherealError::Database(_) => ErrorSeverity::Critical,
            EtherealError::Migration(_) => ErrorSeverity::Critical,
            EtherealError::Config(_) => ErrorSeverity::Critical,
            EtherealError::PermissionDenied(_) => ErrorSeverity::Warning,
            EtherealError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
