//! Payment destination accounts

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A country-labelled payment destination offered during account selection.
/// Inactive accounts are hidden from selection but kept for history.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PaymentAccount {
    pub id: i64,
    pub country: String,
    pub flag: String,
    pub details: String,
    pub is_active: bool,
}

impl PaymentAccount {
    /// Button label shown during country selection
    pub fn label(&self) -> String {
        format!("{} {}", self.flag, self.country)
    }
}
