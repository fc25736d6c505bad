//! Payment service implementation
//!
//! Coupon purchase records, admin approval and code issuance.

use tracing::info;

use crate::database::repositories::PaymentRepository;
use crate::models::payment::{CreatePaymentRequest, Payment};
use crate::models::user::Package;
use crate::utils::errors::{EtherealError, Result};

/// Payment service for the coupon purchase pipeline
#[derive(Clone)]
pub struct PaymentService {
    payments: PaymentRepository,
}

impl PaymentService {
    pub fn new(payments: PaymentRepository) -> Self {
        Self { payments }
    }

    /// Open a coupon purchase in pending_payment
    pub async fn create_coupon_purchase(
        &self,
        chat_id: i64,
        package: Package,
        quantity: i32,
        payment_account: String,
    ) -> Result<Payment> {
        let payment = self
            .payments
            .create(CreatePaymentRequest::coupon(chat_id, package, quantity, payment_account))
            .await?;

        info!(
            payment_id = payment.id,
            chat_id = chat_id,
            total = payment.total_amount,
            "Coupon purchase created"
        );
        Ok(payment)
    }

    pub async fn find(&self, payment_id: i64) -> Result<Option<Payment>> {
        self.payments.find(payment_id).await
    }

    /// Admin approval of a coupon payment
    pub async fn approve(&self, payment_id: i64) -> Result<Payment> {
        if self.payments.find(payment_id).await?.is_none() {
            return Err(EtherealError::PaymentNotFound { payment_id });
        }

        let payment = self.payments.approve(payment_id).await?;
        info!(payment_id = payment_id, "Coupon payment approved");
        Ok(payment)
    }

    /// Turn the admin's newline-separated submission into coupon rows.
    ///
    /// Every non-blank line becomes one coupon under this payment; the
    /// returned list preserves submission order for verbatim delivery.
    pub async fn submit_codes(&self, payment_id: i64, text: &str) -> Result<Vec<String>> {
        let payment = self
            .payments
            .find(payment_id)
            .await?
            .ok_or(EtherealError::PaymentNotFound { payment_id })?;

        let codes: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        if codes.is_empty() {
            return Err(EtherealError::InvalidInput(
                "no coupon codes found in submission".to_string(),
            ));
        }

        for code in &codes {
            self.payments.insert_coupon(payment.id, code).await?;
        }

        info!(payment_id = payment_id, count = codes.len(), "Coupon codes stored");
        Ok(codes)
    }
}

#[cfg(test)]
mod tests {
    /// Line-splitting contract used by submit_codes; the filter must drop
    /// blank lines but keep order and content verbatim.
    #[test]
    fn test_code_line_filtering() {
        let text = "ABC123\n\n  XYZ999  \n\n";
        let codes: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        assert_eq!(codes, vec!["ABC123".to_string(), "XYZ999".to_string()]);
    }
}
