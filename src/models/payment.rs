//! Payment and coupon models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::user::Package;

/// Lifecycle of a coupon purchase record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
pub enum PaymentState {
    PendingPayment,
    Approved,
}

impl PaymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::PendingPayment => "pending_payment",
            PaymentState::Approved => "approved",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: i64,
    pub chat_id: i64,
    pub kind: String,
    pub package: Package,
    pub quantity: i32,
    pub total_amount: i64,
    pub payment_account: String,
    pub status: PaymentState,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
}

/// A coupon code issued under an approved payment
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Coupon {
    pub id: i64,
    pub payment_id: i64,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    pub chat_id: i64,
    pub package: Package,
    pub quantity: i32,
    pub total_amount: i64,
    pub payment_account: String,
}

impl CreatePaymentRequest {
    /// Build a coupon purchase record; total is quantity x unit price
    pub fn coupon(chat_id: i64, package: Package, quantity: i32, payment_account: String) -> Self {
        Self {
            chat_id,
            package,
            quantity,
            total_amount: quantity as i64 * package.unit_price(),
            payment_account,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coupon_totals() {
        let req = CreatePaymentRequest::coupon(7, Package::Standard, 3, "Kuda Account".to_string());
        assert_eq!(req.total_amount, 27_000);

        let req = CreatePaymentRequest::coupon(7, Package::X, 2, "Opay Account".to_string());
        assert_eq!(req.total_amount, 28_000);
    }
}
