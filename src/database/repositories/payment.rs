//! Payment and coupon repository implementation

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use crate::models::payment::{Coupon, CreatePaymentRequest, Payment};
use crate::utils::errors::EtherealError;

const PAYMENT_COLUMNS: &str = "id, chat_id, kind, package, quantity, total_amount, payment_account, status, created_at, approved_at";

#[derive(Clone)]
#[derive(Debug)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a coupon purchase record in pending_payment
    pub async fn create(&self, request: CreatePaymentRequest) -> Result<Payment, EtherealError> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            r#"
            INSERT INTO payments (chat_id, kind, package, quantity, total_amount, payment_account, created_at)
            VALUES ($1, 'coupon', $2, $3, $4, $5, $6)
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(request.chat_id)
        .bind(request.package)
        .bind(request.quantity)
        .bind(request.total_amount)
        .bind(request.payment_account)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(payment)
    }

    pub async fn find(&self, payment_id: i64) -> Result<Option<Payment>, EtherealError> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1"
        ))
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    /// Admin approval: pending_payment -> approved
    pub async fn approve(&self, payment_id: i64) -> Result<Payment, EtherealError> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            r#"
            UPDATE payments
            SET status = 'approved', approved_at = $2
            WHERE id = $1
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(payment_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(payment)
    }

    /// Attach one coupon code to an approved payment
    pub async fn insert_coupon(&self, payment_id: i64, code: &str) -> Result<Coupon, EtherealError> {
        let coupon = sqlx::query_as::<_, Coupon>(
            r#"
            INSERT INTO coupons (payment_id, code)
            VALUES ($1, $2)
            RETURNING id, payment_id, code
            "#,
        )
        .bind(payment_id)
        .bind(code)
        .fetch_one(&self.pool)
        .await?;

        Ok(coupon)
    }

    /// Coupons issued under a payment, in insertion order
    pub async fn coupons_for(&self, payment_id: i64) -> Result<Vec<Coupon>, EtherealError> {
        let coupons = sqlx::query_as::<_, Coupon>(
            "SELECT id, payment_id, code FROM coupons WHERE payment_id = $1 ORDER BY id",
        )
        .bind(payment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(coupons)
    }

    /// Sum of coupon payments approved in the window
    pub async fn sum_approved_since(&self, since: DateTime<Utc>) -> Result<i64, EtherealError> {
        let sum: (Option<i64>,) = sqlx::query_as(
            "SELECT SUM(total_amount) FROM payments WHERE approved_at >= $1 AND status = 'approved'",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(sum.0.unwrap_or(0))
    }
}
