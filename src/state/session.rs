//! Per-chat conversation session
//!
//! A session tracks the single pending expectation for one chat identity
//! plus the flow-scoped scratch values accumulated on the way there. It is
//! transient by design: the ledger, not the session, is the durable source
//! of truth for anything that must survive a restart.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::user::Package;

/// Sessions idle longer than this are swept
pub const SESSION_IDLE_TTL_HOURS: i64 = 24;

/// What the next free-form input from this chat should be interpreted as.
///
/// Exactly one expectation may be pending per identity; setting a new one
/// replaces any prior one. Variants carrying data identify the business
/// object the input belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expectation {
    /// Free-text support request, relayed to the admin
    SupportMessage,
    /// Admin-only: next message is broadcast to all registered users
    BroadcastMessage,
    /// Positive integer: how many coupons to purchase
    CouponQuantity,
    /// Country name for a registration outside the listed accounts
    OtherCountry,
    /// Free-form FAQ question, relayed to the admin
    FaqQuestion,
    /// Registered email for password recovery
    PasswordRecovery,
    /// Payment screenshot for a registration
    RegScreenshot,
    /// Payment screenshot for a coupon purchase
    CouponScreenshot,
    /// Verification screenshot for an external task
    TaskScreenshot { task_id: i64 },
    /// Admin-only: newline-separated coupon codes for an approved payment
    CouponCodes { payment_id: i64 },
    /// Admin-only: two-line username/password finalizing a registration
    UserCredentials { for_user: i64 },
}

impl Expectation {
    /// Whether this expectation is satisfied by a photo (rather than text)
    pub fn accepts_photo(&self) -> bool {
        matches!(
            self,
            Expectation::RegScreenshot
                | Expectation::CouponScreenshot
                | Expectation::TaskScreenshot { .. }
        )
    }

    /// Expectations that only the super-admin may hold
    pub fn admin_only(&self) -> bool {
        matches!(
            self,
            Expectation::BroadcastMessage
                | Expectation::CouponCodes { .. }
                | Expectation::UserCredentials { .. }
        )
    }

    /// Stable tag for the interaction audit log
    pub fn tag(&self) -> &'static str {
        match self {
            Expectation::SupportMessage => "support_message",
            Expectation::BroadcastMessage => "broadcast_message",
            Expectation::CouponQuantity => "coupon_quantity",
            Expectation::OtherCountry => "other_country",
            Expectation::FaqQuestion => "faq",
            Expectation::PasswordRecovery => "password_recovery",
            Expectation::RegScreenshot => "reg_screenshot",
            Expectation::CouponScreenshot => "coupon_screenshot",
            Expectation::TaskScreenshot { .. } => "task_screenshot",
            Expectation::CouponCodes { .. } => "coupon_codes",
            Expectation::UserCredentials { .. } => "user_credentials",
        }
    }
}

/// Which two-party approval this chat is currently waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingApproval {
    Registration,
    Coupon { payment_id: i64 },
}

/// Conversation state for one chat identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub chat_id: i64,
    /// The single pending expectation, if any
    pub expectation: Option<Expectation>,
    /// Package chosen during registration
    pub package: Option<Package>,
    /// Coupon flow scratch: requested quantity
    pub coupon_quantity: Option<i32>,
    /// Coupon flow scratch: chosen package
    pub coupon_package: Option<Package>,
    /// Payment account label picked before paying
    pub selected_account: Option<String>,
    /// Approval handshake this chat is waiting on
    pub waiting_approval: Option<PendingApproval>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Create a fresh session for a chat; called on first routed event
    pub fn new(chat_id: i64) -> Self {
        let now = Utc::now();
        Self {
            chat_id,
            expectation: None,
            package: None,
            coupon_quantity: None,
            coupon_package: None,
            selected_account: None,
            waiting_approval: None,
            updated_at: now,
            expires_at: now + Duration::hours(SESSION_IDLE_TTL_HOURS),
        }
    }

    /// Refresh the idle deadline
    pub fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = now;
        self.expires_at = now + Duration::hours(SESSION_IDLE_TTL_HOURS);
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Set the pending expectation, silently replacing any prior one
    pub fn expect(&mut self, expectation: Expectation) {
        self.expectation = Some(expectation);
        self.touch();
    }

    /// Consume the pending expectation once its input arrived
    pub fn take_expectation(&mut self) -> Option<Expectation> {
        self.touch();
        self.expectation.take()
    }

    pub fn clear_expectation(&mut self) {
        self.expectation = None;
        self.touch();
    }

    /// Total coupon price once both quantity and package are chosen
    pub fn coupon_total(&self) -> Option<i64> {
        let quantity = self.coupon_quantity?;
        let package = self.coupon_package?;
        Some(quantity as i64 * package.unit_price())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_new_session_is_blank() {
        let session = Session::new(123);
        assert_eq!(session.chat_id, 123);
        assert!(session.expectation.is_none());
        assert!(session.waiting_approval.is_none());
        assert!(!session.is_expired());
    }

    #[test]
    fn test_expectation_is_replaced_not_queued() {
        let mut session = Session::new(123);
        session.expect(Expectation::CouponQuantity);
        session.expect(Expectation::RegScreenshot);
        assert_matches!(session.expectation, Some(Expectation::RegScreenshot));
    }

    #[test]
    fn test_take_consumes_expectation() {
        let mut session = Session::new(123);
        session.expect(Expectation::TaskScreenshot { task_id: 9 });
        assert_matches!(
            session.take_expectation(),
            Some(Expectation::TaskScreenshot { task_id: 9 })
        );
        assert!(session.expectation.is_none());
    }

    #[test]
    fn test_photo_routing_split() {
        assert!(Expectation::RegScreenshot.accepts_photo());
        assert!(Expectation::CouponScreenshot.accepts_photo());
        assert!(Expectation::TaskScreenshot { task_id: 1 }.accepts_photo());
        assert!(!Expectation::CouponQuantity.accepts_photo());
        assert!(!Expectation::CouponCodes { payment_id: 1 }.accepts_photo());
    }

    #[test]
    fn test_admin_only_expectations() {
        assert!(Expectation::BroadcastMessage.admin_only());
        assert!(Expectation::CouponCodes { payment_id: 1 }.admin_only());
        assert!(Expectation::UserCredentials { for_user: 1 }.admin_only());
        assert!(!Expectation::SupportMessage.admin_only());
        assert!(!Expectation::PasswordRecovery.admin_only());
    }

    #[test]
    fn test_coupon_total() {
        let mut session = Session::new(123);
        assert_eq!(session.coupon_total(), None);
        session.coupon_quantity = Some(3);
        session.coupon_package = Some(Package::Standard);
        assert_eq!(session.coupon_total(), Some(27_000));
        session.coupon_package = Some(Package::X);
        assert_eq!(session.coupon_total(), Some(42_000));
    }
}
