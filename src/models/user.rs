//! User model and registration lifecycle types

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::utils::errors::{EtherealError, Result};
use crate::utils::helpers;

/// Registration lifecycle of a user.
///
/// Transitions are monotonic forward; there is no rejected state, an
/// unapproved submission simply stays where it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
pub enum PaymentStatus {
    New,
    PendingPayment,
    PendingDetails,
    Registered,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::New => "new",
            PaymentStatus::PendingPayment => "pending_payment",
            PaymentStatus::PendingDetails => "pending_details",
            PaymentStatus::Registered => "registered",
        }
    }

    /// Position in the forward-only lifecycle, used to reject backward moves
    pub fn rank(&self) -> u8 {
        match self {
            PaymentStatus::New => 0,
            PaymentStatus::PendingPayment => 1,
            PaymentStatus::PendingDetails => 2,
            PaymentStatus::Registered => 3,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Membership package tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum Package {
    Standard,
    X,
}

impl Package {
    /// Unit price in naira
    pub fn unit_price(&self) -> i64 {
        match self {
            Package::Standard => 9_000,
            Package::X => 14_000,
        }
    }

    /// Referral bonus paid to the referrer when the referred user registers
    pub fn referral_bonus(&self) -> f64 {
        match self {
            Package::Standard => 0.4,
            Package::X => 0.9,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Package::Standard => "Standard",
            Package::X => "X",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "Standard" | "standard" => Some(Package::Standard),
            "X" | "x" => Some(Package::X),
            _ => None,
        }
    }
}

impl std::fmt::Display for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub chat_id: i64,
    pub package: Option<Package>,
    pub payment_status: PaymentStatus,
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub join_date: DateTime<Utc>,
    pub alarm_setting: bool,
    pub streaks: i32,
    pub invites: i32,
    pub balance: f64,
    pub screenshot_uploaded_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub registration_date: Option<DateTime<Utc>>,
    pub referral_code: String,
    pub referred_by: Option<i64>,
    pub selected_coach: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub chat_id: i64,
    pub username: Option<String>,
    pub referral_code: String,
    pub referred_by: Option<i64>,
}

/// The four-line detail submission sent while a user is `pending_details`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationDetails {
    pub email: String,
    pub full_name: String,
    pub username: String,
    pub phone: String,
}

impl RegistrationDetails {
    /// Parse and validate the one-message detail submission.
    ///
    /// Exactly four non-empty lines: email / full name / @username / phone.
    pub fn parse(text: &str) -> Result<Self> {
        let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        if lines.len() < 4 {
            return Err(EtherealError::InvalidInput(
                "expected four lines: email, full name, username, phone".to_string(),
            ));
        }

        let (email, full_name, username, phone) = (lines[0], lines[1], lines[2], lines[3]);

        if !helpers::is_valid_email(email) {
            return Err(EtherealError::InvalidInput(format!("invalid email: {}", email)));
        }
        if !helpers::is_valid_handle(username) {
            return Err(EtherealError::InvalidInput(
                "username must start with @".to_string(),
            ));
        }

        Ok(Self {
            email: email.to_string(),
            full_name: full_name.to_string(),
            username: username.to_string(),
            phone: phone.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_ranks_are_forward_only() {
        assert!(PaymentStatus::New.rank() < PaymentStatus::PendingPayment.rank());
        assert!(PaymentStatus::PendingPayment.rank() < PaymentStatus::PendingDetails.rank());
        assert!(PaymentStatus::PendingDetails.rank() < PaymentStatus::Registered.rank());
    }

    #[test]
    fn test_package_pricing() {
        assert_eq!(Package::Standard.unit_price(), 9_000);
        assert_eq!(Package::X.unit_price(), 14_000);
        assert_eq!(Package::Standard.referral_bonus(), 0.4);
        assert_eq!(Package::X.referral_bonus(), 0.9);
    }

    #[test]
    fn test_details_parse_ok() {
        let details = RegistrationDetails::parse(
            "user@example.com\nJane Doe\n@janedoe\n+2348012345678",
        )
        .unwrap();
        assert_eq!(details.email, "user@example.com");
        assert_eq!(details.username, "@janedoe");
    }

    #[test]
    fn test_details_parse_skips_blank_lines() {
        let details = RegistrationDetails::parse(
            "user@example.com\n\nJane Doe\n@janedoe\n\n+234801",
        )
        .unwrap();
        assert_eq!(details.full_name, "Jane Doe");
        assert_eq!(details.phone, "+234801");
    }

    #[test]
    fn test_details_parse_rejects_short_submission() {
        assert!(RegistrationDetails::parse("user@example.com\nJane Doe\n@janedoe").is_err());
    }

    #[test]
    fn test_details_parse_rejects_bad_email() {
        assert!(RegistrationDetails::parse("not-an-email\nJane\n@jane\n+1").is_err());
    }

    #[test]
    fn test_details_parse_rejects_bad_username() {
        assert!(RegistrationDetails::parse("a@b.co\nJane\njane\n+1").is_err());
    }
}
