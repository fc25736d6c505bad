//! Conversation flow integration tests
//!
//! Walks the per-chat session machinery through the registration, coupon
//! and task flows the way the handlers drive it, checking the invariants
//! the flows rely on: one expectation per chat, silent replacement,
//! clear-on-consume, and flow-scoped scratch data.

use assert_matches::assert_matches;

use EtherealBot::models::user::{Package, RegistrationDetails};
use EtherealBot::state::{Expectation, PendingApproval, SessionStore};

const USER: i64 = 1_001;
const ADMIN: i64 = 5_646_269_450;

#[tokio::test]
async fn test_registration_flow_session_walk() {
    let store = SessionStore::new();

    // Package chosen
    store.with_session(USER, |session| session.package = Some(Package::Standard));

    // Country chosen: account recorded, screenshot expected
    store.with_session(USER, |session| {
        session.selected_account = Some("Nigeria".to_string());
        session.expect(Expectation::RegScreenshot);
    });
    assert_matches!(store.expectation(USER), Some(Expectation::RegScreenshot));

    // Screenshot arrives: the photo router consumes the expectation and
    // records the pending approval handshake
    assert_matches!(store.take_expectation(USER), Some(Expectation::RegScreenshot));
    store.with_session(USER, |session| {
        session.waiting_approval = Some(PendingApproval::Registration);
    });

    // Re-entrant screenshot: no expectation is set any more, so the photo
    // router has nothing to match and the event is a no-op
    assert_eq!(store.expectation(USER), None);
    assert_eq!(store.take_expectation(USER), None);

    // Scratch survives until the session is cleared
    assert_eq!(
        store.peek(USER, |s| s.selected_account.clone()).flatten(),
        Some("Nigeria".to_string())
    );
    assert_matches!(
        store.peek(USER, |s| s.waiting_approval).flatten(),
        Some(PendingApproval::Registration)
    );
}

#[tokio::test]
async fn test_admin_credential_expectation_carries_target() {
    let store = SessionStore::new();

    // Finalize button arms the admin's credential expectation for one user
    store.set_expectation(ADMIN, Expectation::UserCredentials { for_user: USER });

    // A later finalize for another user silently replaces the first
    store.set_expectation(ADMIN, Expectation::UserCredentials { for_user: 2_002 });

    assert_matches!(
        store.take_expectation(ADMIN),
        Some(Expectation::UserCredentials { for_user: 2_002 })
    );
    assert_eq!(store.expectation(ADMIN), None);
}

#[tokio::test]
async fn test_coupon_flow_session_walk() {
    let store = SessionStore::new();

    // Flow start resets scratch and expects a quantity
    store.with_session(USER, |session| {
        session.coupon_quantity = None;
        session.coupon_package = None;
        session.selected_account = None;
        session.expect(Expectation::CouponQuantity);
    });

    // Quantity consumed
    assert_matches!(store.expectation(USER), Some(Expectation::CouponQuantity));
    store.with_session(USER, |session| {
        session.coupon_quantity = Some(3);
        session.clear_expectation();
    });

    // Package chosen; total derives from scratch
    store.with_session(USER, |session| session.coupon_package = Some(Package::X));
    assert_eq!(store.peek(USER, |s| s.coupon_total()).flatten(), Some(42_000));

    // Account chosen: payment opened, screenshot expected
    store.with_session(USER, |session| {
        session.selected_account = Some("Nigeria".to_string());
        session.waiting_approval = Some(PendingApproval::Coupon { payment_id: 7 });
        session.expect(Expectation::CouponScreenshot);
    });

    // Screenshot consumed; the payment id stays on the approval handshake
    assert_matches!(store.take_expectation(USER), Some(Expectation::CouponScreenshot));
    assert_matches!(
        store.peek(USER, |s| s.waiting_approval).flatten(),
        Some(PendingApproval::Coupon { payment_id: 7 })
    );

    // Admin's code expectation is keyed by the same payment
    store.set_expectation(ADMIN, Expectation::CouponCodes { payment_id: 7 });
    assert_matches!(
        store.take_expectation(ADMIN),
        Some(Expectation::CouponCodes { payment_id: 7 })
    );
}

#[tokio::test]
async fn test_task_screenshot_expectation_carries_task() {
    let store = SessionStore::new();

    store.set_expectation(USER, Expectation::TaskScreenshot { task_id: 42 });

    // The photo router reads the task id straight off the expectation
    let expectation = store.take_expectation(USER);
    assert_matches!(expectation, Some(Expectation::TaskScreenshot { task_id: 42 }));
    assert!(expectation.unwrap().accepts_photo());
}

#[tokio::test]
async fn test_menu_reentry_abandons_flow() {
    let store = SessionStore::new();

    store.with_session(USER, |session| {
        session.coupon_quantity = Some(5);
        session.expect(Expectation::CouponScreenshot);
    });

    // Opening the main menu clears the whole session
    store.clear(USER);

    assert_eq!(store.expectation(USER), None);
    assert_eq!(store.peek(USER, |s| s.coupon_quantity), None);
}

#[tokio::test]
async fn test_flows_do_not_leak_across_chats() {
    let store = SessionStore::new();

    store.set_expectation(USER, Expectation::RegScreenshot);
    store.set_expectation(2_002, Expectation::CouponQuantity);
    store.set_expectation(ADMIN, Expectation::BroadcastMessage);

    assert_matches!(store.take_expectation(2_002), Some(Expectation::CouponQuantity));
    assert_matches!(store.expectation(USER), Some(Expectation::RegScreenshot));
    assert_matches!(store.expectation(ADMIN), Some(Expectation::BroadcastMessage));
}

#[test]
fn test_detail_submission_validation_matrix() {
    // Valid four-line submission
    let ok = RegistrationDetails::parse("jane@mail.com\nJane Doe\n@jane\n+2348012345678");
    assert!(ok.is_ok());

    // Fewer than four non-empty lines re-prompts without state change
    assert!(RegistrationDetails::parse("jane@mail.com\nJane Doe\n@jane").is_err());
    assert!(RegistrationDetails::parse("").is_err());

    // Email must be local@domain.tld
    assert!(RegistrationDetails::parse("janemail.com\nJane\n@jane\n+234").is_err());
    assert!(RegistrationDetails::parse("jane@mail\nJane\n@jane\n+234").is_err());

    // Username must start with @
    assert!(RegistrationDetails::parse("jane@mail.com\nJane\njane\n+234").is_err());

    // Extra lines beyond four are tolerated, first four are taken
    let extra = RegistrationDetails::parse("jane@mail.com\nJane Doe\n@jane\n+234\nspare line");
    assert_eq!(extra.unwrap().phone, "+234");
}

#[test]
fn test_expectation_tags_are_distinct() {
    let tags = [
        Expectation::SupportMessage.tag(),
        Expectation::BroadcastMessage.tag(),
        Expectation::CouponQuantity.tag(),
        Expectation::OtherCountry.tag(),
        Expectation::FaqQuestion.tag(),
        Expectation::PasswordRecovery.tag(),
        Expectation::RegScreenshot.tag(),
        Expectation::CouponScreenshot.tag(),
        Expectation::TaskScreenshot { task_id: 1 }.tag(),
        Expectation::CouponCodes { payment_id: 1 }.tag(),
        Expectation::UserCredentials { for_user: 1 }.tag(),
    ];

    for (i, a) in tags.iter().enumerate() {
        for b in tags.iter().skip(i + 1) {
            assert_ne!(a, b);
        }
    }
}
