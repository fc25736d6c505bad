//! User repository implementation

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use crate::models::user::{CreateUserRequest, Package, PaymentStatus, RegistrationDetails, User};
use crate::utils::errors::EtherealError;

const USER_COLUMNS: &str = "chat_id, package, payment_status, name, username, email, phone, password, join_date, alarm_setting, streaks, invites, balance, screenshot_uploaded_at, approved_at, registration_date, referral_code, referred_by, selected_coach";

#[derive(Clone)]
#[derive(Debug)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user at first contact
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, EtherealError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (chat_id, username, referral_code, referred_by, join_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(request.chat_id)
        .bind(request.username)
        .bind(request.referral_code)
        .bind(request.referred_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by chat id
    pub async fn find(&self, chat_id: i64) -> Result<Option<User>, EtherealError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE chat_id = $1"
        ))
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Read the authoritative registration status from the ledger
    pub async fn status(&self, chat_id: i64) -> Result<Option<PaymentStatus>, EtherealError> {
        let status: Option<(PaymentStatus,)> =
            sqlx::query_as("SELECT payment_status FROM users WHERE chat_id = $1")
                .bind(chat_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(status.map(|row| row.0))
    }

    /// Record a package choice, moving the user to pending_payment.
    /// Creates the row if the user somehow skipped /start.
    pub async fn select_package(
        &self,
        chat_id: i64,
        package: Package,
        username: Option<&str>,
        referral_code: &str,
    ) -> Result<(), EtherealError> {
        let updated = sqlx::query(
            "UPDATE users SET package = $2, payment_status = 'pending_payment' WHERE chat_id = $1",
        )
        .bind(chat_id)
        .bind(package)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            sqlx::query(
                r#"
                INSERT INTO users (chat_id, package, payment_status, username, referral_code, join_date)
                VALUES ($1, $2, 'pending_payment', $3, $4, $5)
                "#,
            )
            .bind(chat_id)
            .bind(package)
            .bind(username)
            .bind(referral_code)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    pub async fn set_selected_coach(&self, chat_id: i64, coach_id: i64) -> Result<(), EtherealError> {
        sqlx::query("UPDATE users SET selected_coach = $2 WHERE chat_id = $1")
            .bind(chat_id)
            .bind(coach_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn set_screenshot_uploaded(&self, chat_id: i64) -> Result<(), EtherealError> {
        sqlx::query("UPDATE users SET screenshot_uploaded_at = $2 WHERE chat_id = $1")
            .bind(chat_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Admin approval of the payment screenshot: pending_payment -> pending_details
    pub async fn approve_registration(&self, chat_id: i64) -> Result<(), EtherealError> {
        sqlx::query(
            "UPDATE users SET payment_status = 'pending_details', approved_at = $2 WHERE chat_id = $1",
        )
        .bind(chat_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Persist the validated four-line detail submission
    pub async fn update_details(
        &self,
        chat_id: i64,
        details: &RegistrationDetails,
        password: &str,
    ) -> Result<(), EtherealError> {
        sqlx::query(
            r#"
            UPDATE users
            SET email = $2, name = $3, username = $4, phone = $5, password = $6
            WHERE chat_id = $1
            "#,
        )
        .bind(chat_id)
        .bind(&details.email)
        .bind(&details.full_name)
        .bind(&details.username)
        .bind(&details.phone)
        .bind(password)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Final credential issuance: any state -> registered
    pub async fn set_registered(
        &self,
        chat_id: i64,
        username: &str,
        password: &str,
    ) -> Result<(), EtherealError> {
        sqlx::query(
            r#"
            UPDATE users
            SET username = $2, password = $3, payment_status = 'registered', registration_date = $4
            WHERE chat_id = $1
            "#,
        )
        .bind(chat_id)
        .bind(username)
        .bind(password)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Referral-click bonus at first contact: invites + 1, balance + 0.1
    pub async fn record_referral_click(&self, referrer: i64) -> Result<(), EtherealError> {
        sqlx::query(
            "UPDATE users SET invites = invites + 1, balance = balance + 0.1 WHERE chat_id = $1",
        )
        .bind(referrer)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn credit_balance(&self, chat_id: i64, amount: f64) -> Result<(), EtherealError> {
        sqlx::query("UPDATE users SET balance = balance + $2 WHERE chat_id = $1")
            .bind(chat_id)
            .bind(amount)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Subtract from balance; callers must have checked sufficiency first
    pub async fn debit_balance(&self, chat_id: i64, amount: f64) -> Result<(), EtherealError> {
        sqlx::query("UPDATE users SET balance = balance - $2 WHERE chat_id = $1")
            .bind(chat_id)
            .bind(amount)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn set_alarm(&self, chat_id: i64, enabled: bool) -> Result<(), EtherealError> {
        sqlx::query("UPDATE users SET alarm_setting = $2 WHERE chat_id = $1")
            .bind(chat_id)
            .bind(enabled)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn set_password(&self, chat_id: i64, password: &str) -> Result<(), EtherealError> {
        sqlx::query("UPDATE users SET password = $2 WHERE chat_id = $1")
            .bind(chat_id)
            .bind(password)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Password-recovery lookup: email must match the caller's own registered row
    pub async fn find_registered_by_email(
        &self,
        chat_id: i64,
        email: &str,
    ) -> Result<Option<User>, EtherealError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND chat_id = $2 AND payment_status = 'registered'"
        ))
        .bind(email)
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn registered_ids(&self) -> Result<Vec<i64>, EtherealError> {
        let rows: Vec<(i64,)> =
            sqlx::query_as("SELECT chat_id FROM users WHERE payment_status = 'registered'")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|row| row.0).collect())
    }

    pub async fn alarm_ids(&self) -> Result<Vec<i64>, EtherealError> {
        let rows: Vec<(i64,)> =
            sqlx::query_as("SELECT chat_id FROM users WHERE alarm_setting = TRUE")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|row| row.0).collect())
    }

    pub async fn registered_users(&self) -> Result<Vec<User>, EtherealError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE payment_status = 'registered' ORDER BY registration_date"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Registered users assigned to a given coach
    pub async fn registered_by_coach(&self, coach_id: i64) -> Result<Vec<User>, EtherealError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE selected_coach = $1 AND payment_status = 'registered' ORDER BY registration_date"
        ))
        .bind(coach_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    pub async fn count(&self) -> Result<i64, EtherealError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    pub async fn count_registered(&self) -> Result<i64, EtherealError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE payment_status = 'registered'")
                .fetch_one(&self.pool)
                .await?;

        Ok(count.0)
    }

    pub async fn count_registered_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<i64, EtherealError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE registration_date >= $1")
                .bind(since)
                .fetch_one(&self.pool)
                .await?;

        Ok(count.0)
    }

    /// Package-priced revenue of registrations approved in the window
    pub async fn registration_revenue_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<i64, EtherealError> {
        let sum: (Option<i64>,) = sqlx::query_as(
            r#"
            SELECT SUM(CASE package WHEN 'Standard' THEN 9000 WHEN 'X' THEN 14000 ELSE 0 END)::BIGINT
            FROM users
            WHERE approved_at >= $1 AND payment_status = 'registered'
            "#,
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(sum.0.unwrap_or(0))
    }

    /// Registered-user counts grouped by package
    pub async fn package_counts(&self) -> Result<Vec<(Option<Package>, i64)>, EtherealError> {
        let rows: Vec<(Option<Package>, i64)> = sqlx::query_as(
            "SELECT package, COUNT(*) FROM users WHERE payment_status = 'registered' GROUP BY package",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Registered-user counts grouped by selected coach
    pub async fn coach_counts(&self) -> Result<Vec<(Option<i64>, i64)>, EtherealError> {
        let rows: Vec<(Option<i64>, i64)> = sqlx::query_as(
            "SELECT selected_coach, COUNT(*) FROM users WHERE payment_status = 'registered' GROUP BY selected_coach",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
