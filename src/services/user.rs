//! User service implementation
//!
//! Registration lifecycle logic: first contact, referral credits, detail
//! submission, credential issuance and password recovery.

use tracing::{debug, info};

use crate::database::repositories::UserRepository;
use crate::models::user::{CreateUserRequest, PaymentStatus, RegistrationDetails, User};
use crate::utils::errors::{EtherealError, Result};
use crate::utils::helpers;

/// Outcome of the admin's two-line credential submission
#[derive(Debug, Clone)]
pub struct CredentialIssue {
    pub user: User,
    pub username: String,
    pub password: String,
    /// Whether the referrer was credited this time (false on re-issue)
    pub referral_credited: bool,
}

/// User service for registration lifecycle operations
#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
}

impl UserService {
    pub fn new(users: UserRepository) -> Self {
        Self { users }
    }

    /// Register a user at first contact or return the existing row.
    ///
    /// A brand-new referred user earns the referrer the flat click bonus
    /// and an invite count; repeat /start never credits again.
    pub async fn register_or_get(
        &self,
        chat_id: i64,
        username: Option<String>,
        referred_by: Option<i64>,
    ) -> Result<User> {
        if let Some(existing) = self.users.find(chat_id).await? {
            debug!(chat_id = chat_id, "User already exists");
            return Ok(existing);
        }

        let user = self
            .users
            .create(CreateUserRequest {
                chat_id,
                username,
                referral_code: helpers::generate_referral_code(),
                referred_by,
            })
            .await?;

        if let Some(referrer) = referred_by {
            self.users.record_referral_click(referrer).await?;
            info!(chat_id = chat_id, referrer = referrer, "Referral click credited");
        }

        info!(chat_id = chat_id, "New user registered");
        Ok(user)
    }

    pub async fn find(&self, chat_id: i64) -> Result<Option<User>> {
        self.users.find(chat_id).await
    }

    /// Authoritative registration status from the ledger
    pub async fn status(&self, chat_id: i64) -> Result<Option<PaymentStatus>> {
        self.users.status(chat_id).await
    }

    /// Validate and persist the four-line detail submission.
    ///
    /// Validation failure leaves the ledger untouched so the user can
    /// simply resend.
    pub async fn submit_details(&self, chat_id: i64, text: &str) -> Result<RegistrationDetails> {
        let details = RegistrationDetails::parse(text)?;
        let password = helpers::generate_password();
        self.users.update_details(chat_id, &details, &password).await?;

        info!(chat_id = chat_id, "Registration details stored");
        Ok(details)
    }

    /// Finalize a registration from the admin's two-line credential message.
    ///
    /// The referral payout is gated on the user's pre-update status so a
    /// second issuance can never double-credit the referrer.
    pub async fn issue_credentials(&self, for_user: i64, text: &str) -> Result<CredentialIssue> {
        let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        if lines.len() != 2 {
            return Err(EtherealError::InvalidInput(
                "expected exactly two lines: username and password".to_string(),
            ));
        }
        let (username, password) = (lines[0], lines[1]);

        let before = self
            .users
            .find(for_user)
            .await?
            .ok_or(EtherealError::UserNotFound { chat_id: for_user })?;

        self.users.set_registered(for_user, username, password).await?;

        let mut referral_credited = false;
        if before.payment_status != PaymentStatus::Registered {
            if let (Some(referrer), Some(package)) = (before.referred_by, before.package) {
                self.users.credit_balance(referrer, package.referral_bonus()).await?;
                referral_credited = true;
                info!(
                    chat_id = for_user,
                    referrer = referrer,
                    bonus = package.referral_bonus(),
                    "Referral registration bonus credited"
                );
            }
        }

        let user = self
            .users
            .find(for_user)
            .await?
            .ok_or(EtherealError::UserNotFound { chat_id: for_user })?;

        Ok(CredentialIssue {
            user,
            username: username.to_string(),
            password: password.to_string(),
            referral_credited,
        })
    }

    /// Reset the password for a registered user whose email matches.
    /// Returns the fresh password, or None when no account matched.
    pub async fn recover_password(&self, chat_id: i64, email: &str) -> Result<Option<(User, String)>> {
        match self.users.find_registered_by_email(chat_id, email).await? {
            Some(user) => {
                let new_password = helpers::generate_password();
                self.users.set_password(chat_id, &new_password).await?;
                info!(chat_id = chat_id, "Password reset");
                Ok(Some((user, new_password)))
            }
            None => Ok(None),
        }
    }

    /// Flip the daily-reminder setting; returns the new value
    pub async fn toggle_alarm(&self, chat_id: i64) -> Result<bool> {
        let user = self
            .users
            .find(chat_id)
            .await?
            .ok_or(EtherealError::UserNotFound { chat_id })?;

        let enabled = !user.alarm_setting;
        self.users.set_alarm(chat_id, enabled).await?;
        Ok(enabled)
    }

    /// Set the daily-reminder setting directly (post-registration opt-in)
    pub async fn set_alarm(&self, chat_id: i64, enabled: bool) -> Result<()> {
        self.users.set_alarm(chat_id, enabled).await
    }
}
