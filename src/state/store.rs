//! In-memory session store
//!
//! Owns every live conversation session, keyed by chat id. Sessions are
//! created on first touch, replaced wholesale never, and evicted either by
//! an explicit clear or by the idle sweeper. Process restarts lose all of
//! them; flows recover from the ledger's `payment_status` instead.

use std::sync::Arc;
use std::time::Duration;
use dashmap::DashMap;
use tracing::{debug, info, warn};

use super::session::{Expectation, Session};

#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<i64, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
        }
    }

    /// Run a closure against the chat's session, creating it if absent.
    /// The idle deadline is refreshed on every access.
    pub fn with_session<R>(&self, chat_id: i64, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut entry = self
            .sessions
            .entry(chat_id)
            .or_insert_with(|| Session::new(chat_id));
        entry.touch();
        f(entry.value_mut())
    }

    /// Read-only peek that does not create a session
    pub fn peek<R>(&self, chat_id: i64, f: impl FnOnce(&Session) -> R) -> Option<R> {
        self.sessions.get(&chat_id).map(|entry| f(entry.value()))
    }

    /// The chat's pending expectation, if any
    pub fn expectation(&self, chat_id: i64) -> Option<Expectation> {
        self.sessions
            .get(&chat_id)
            .and_then(|entry| entry.expectation)
    }

    /// Set the pending expectation, silently replacing any prior one
    pub fn set_expectation(&self, chat_id: i64, expectation: Expectation) {
        debug!(chat_id = chat_id, tag = expectation.tag(), "Setting expectation");
        self.with_session(chat_id, |session| session.expect(expectation));
    }

    /// Consume the pending expectation (cleared exactly once the expected
    /// input arrives)
    pub fn take_expectation(&self, chat_id: i64) -> Option<Expectation> {
        self.sessions
            .get_mut(&chat_id)
            .and_then(|mut entry| entry.take_expectation())
    }

    pub fn clear_expectation(&self, chat_id: i64) {
        if let Some(mut entry) = self.sessions.get_mut(&chat_id) {
            entry.clear_expectation();
        }
    }

    /// Drop the whole session (explicit /reset or menu re-entry)
    pub fn clear(&self, chat_id: i64) {
        if self.sessions.remove(&chat_id).is_some() {
            debug!(chat_id = chat_id, "Session cleared");
        }
    }

    /// Evict idle sessions; returns how many were removed
    pub fn sweep_expired(&self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired());
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            info!(removed = removed, "Swept expired sessions");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Session store with an automatic idle sweeper
#[derive(Debug)]
pub struct SessionStoreManager {
    store: SessionStore,
    sweep_interval: Duration,
    sweep_handle: Option<tokio::task::JoinHandle<()>>,
}

impl SessionStoreManager {
    pub fn new(store: SessionStore, sweep_interval: Duration) -> Self {
        Self {
            store,
            sweep_interval,
            sweep_handle: None,
        }
    }

    /// Start the periodic idle sweep
    pub fn start_sweeper(&mut self) {
        if self.sweep_handle.is_some() {
            warn!("Session sweeper is already running");
            return;
        }

        let store = self.store.clone();
        let interval = self.sweep_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);

            loop {
                ticker.tick().await;
                store.sweep_expired();
            }
        });

        self.sweep_handle = Some(handle);
        info!("Started session sweeper with interval {:?}", self.sweep_interval);
    }

    pub fn stop_sweeper(&mut self) {
        if let Some(handle) = self.sweep_handle.take() {
            handle.abort();
            info!("Stopped session sweeper");
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }
}

impl Drop for SessionStoreManager {
    fn drop(&mut self) {
        self.stop_sweeper();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::session::PendingApproval;
    use assert_matches::assert_matches;

    #[test]
    fn test_session_created_on_first_touch() {
        let store = SessionStore::new();
        assert!(store.is_empty());
        store.with_session(1, |_| ());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_expectation_roundtrip() {
        let store = SessionStore::new();
        assert_eq!(store.expectation(1), None);

        store.set_expectation(1, Expectation::CouponQuantity);
        assert_matches!(store.expectation(1), Some(Expectation::CouponQuantity));

        // take consumes it exactly once
        assert_matches!(store.take_expectation(1), Some(Expectation::CouponQuantity));
        assert_eq!(store.expectation(1), None);
        assert_eq!(store.take_expectation(1), None);
    }

    #[test]
    fn test_set_replaces_prior_expectation() {
        let store = SessionStore::new();
        store.set_expectation(1, Expectation::SupportMessage);
        store.set_expectation(1, Expectation::CouponCodes { payment_id: 7 });
        assert_matches!(
            store.expectation(1),
            Some(Expectation::CouponCodes { payment_id: 7 })
        );
    }

    #[test]
    fn test_clear_drops_scratch_state() {
        let store = SessionStore::new();
        store.with_session(1, |session| {
            session.coupon_quantity = Some(4);
            session.waiting_approval = Some(PendingApproval::Registration);
        });
        store.clear(1);
        assert_eq!(store.peek(1, |s| s.coupon_quantity), None);
    }

    #[test]
    fn test_sessions_are_isolated_per_chat() {
        let store = SessionStore::new();
        store.set_expectation(1, Expectation::RegScreenshot);
        store.set_expectation(2, Expectation::CouponScreenshot);

        assert_matches!(store.expectation(1), Some(Expectation::RegScreenshot));
        assert_matches!(store.expectation(2), Some(Expectation::CouponScreenshot));
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let store = SessionStore::new();
        store.with_session(1, |_| ());
        store.with_session(2, |session| {
            session.expires_at = chrono::Utc::now() - chrono::Duration::hours(1);
        });

        assert_eq!(store.sweep_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.peek(1, |_| ()).is_some());
    }
}
