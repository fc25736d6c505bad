//! Payment account repository implementation

use sqlx::PgPool;
use crate::models::account::PaymentAccount;
use crate::utils::errors::EtherealError;

#[derive(Clone)]
#[derive(Debug)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        country: &str,
        flag: &str,
        details: &str,
    ) -> Result<PaymentAccount, EtherealError> {
        let account = sqlx::query_as::<_, PaymentAccount>(
            r#"
            INSERT INTO payment_accounts (country, flag, details)
            VALUES ($1, $2, $3)
            RETURNING id, country, flag, details, is_active
            "#,
        )
        .bind(country)
        .bind(flag)
        .bind(details)
        .fetch_one(&self.pool)
        .await?;

        Ok(account)
    }

    /// Hard delete by country label; returns false when nothing matched
    pub async fn delete_by_country(&self, country: &str) -> Result<bool, EtherealError> {
        let result = sqlx::query("DELETE FROM payment_accounts WHERE country = $1")
            .bind(country)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list(&self) -> Result<Vec<PaymentAccount>, EtherealError> {
        let accounts = sqlx::query_as::<_, PaymentAccount>(
            "SELECT id, country, flag, details, is_active FROM payment_accounts ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    /// Accounts offered during selection; inactive ones are excluded
    pub async fn list_active(&self) -> Result<Vec<PaymentAccount>, EtherealError> {
        let accounts = sqlx::query_as::<_, PaymentAccount>(
            "SELECT id, country, flag, details, is_active FROM payment_accounts WHERE is_active = TRUE ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    pub async fn find_active_by_country(
        &self,
        country: &str,
    ) -> Result<Option<PaymentAccount>, EtherealError> {
        let account = sqlx::query_as::<_, PaymentAccount>(
            "SELECT id, country, flag, details, is_active FROM payment_accounts WHERE country = $1 AND is_active = TRUE",
        )
        .bind(country)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }
}
