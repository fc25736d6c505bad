//! Deferred work coordinator
//!
//! One-shot payment reminders keyed by (flow, business id) plus the daily
//! clock jobs. Reminders re-read authoritative state from the ledger at
//! fire time (the session store may have been cleared or superseded) and
//! no-op unless the flow is still pending. Terminal transitions cancel the
//! pending reminder so stale notices never fire.

use std::sync::Arc;
use std::time::Duration;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use teloxide::{
    prelude::*,
    types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup},
    Bot,
};
use tracing::{debug, error, info, warn};

use crate::config::Settings;
use crate::database::DatabaseService;
use crate::models::user::PaymentStatus;
use crate::models::payment::PaymentState;
use crate::services::ReportingService;
use crate::utils::errors::Result;

/// Default delay before a pending payment is re-surfaced
pub const PAYMENT_REMINDER_DELAY: Duration = Duration::from_secs(3600);

/// Hour of day (UTC) for the task reminder fan-out
const DAILY_REMINDER_HOUR: u32 = 8;
/// Hour of day (UTC) for the admin summary
const DAILY_SUMMARY_HOUR: u32 = 20;

/// The two deferred reminder flows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReminderKind {
    /// Keyed by the registering user's chat id
    RegistrationPayment,
    /// Keyed by the payment id
    CouponPayment,
}

/// Schedules and fires one-shot reminders and the daily jobs
#[derive(Clone)]
pub struct ReminderScheduler {
    bot: Bot,
    db: DatabaseService,
    settings: Settings,
    reporting: ReportingService,
    handles: Arc<DashMap<(ReminderKind, i64), tokio::task::JoinHandle<()>>>,
}

impl ReminderScheduler {
    pub fn new(bot: Bot, db: DatabaseService, settings: Settings) -> Self {
        let reporting = ReportingService::new(db.clone());
        Self {
            bot,
            db,
            settings,
            reporting,
            handles: Arc::new(DashMap::new()),
        }
    }

    /// Schedule the one-hour follow-up for a registration payment
    pub fn schedule_registration_reminder(&self, chat_id: i64) {
        self.schedule(ReminderKind::RegistrationPayment, chat_id, PAYMENT_REMINDER_DELAY);
    }

    /// Schedule the one-hour follow-up for a coupon payment
    pub fn schedule_coupon_reminder(&self, payment_id: i64) {
        self.schedule(ReminderKind::CouponPayment, payment_id, PAYMENT_REMINDER_DELAY);
    }

    fn schedule(&self, kind: ReminderKind, id: i64, delay: Duration) {
        // A fresh submission replaces any reminder still pending for the key
        self.cancel(kind, id);

        let this = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let result = match kind {
                ReminderKind::RegistrationPayment => this.fire_registration_reminder(id).await,
                ReminderKind::CouponPayment => this.fire_coupon_reminder(id).await,
            };

            if let Err(e) = result {
                error!(kind = ?kind, id = id, error = %e, "Reminder firing failed");
            }

            this.handles.remove(&(kind, id));
        });

        self.handles.insert((kind, id), handle);
        debug!(kind = ?kind, id = id, delay = ?delay, "Reminder scheduled");
    }

    /// Cancel a pending reminder once its flow reached a terminal state
    pub fn cancel(&self, kind: ReminderKind, id: i64) {
        if let Some((_, handle)) = self.handles.remove(&(kind, id)) {
            handle.abort();
            debug!(kind = ?kind, id = id, "Reminder cancelled");
        }
    }

    /// Number of reminders currently pending
    pub fn pending(&self) -> usize {
        self.handles.len()
    }

    /// Registration reminder: only acts while the user is still
    /// pending_payment; pings the assigned coach and re-notifies the user.
    async fn fire_registration_reminder(&self, chat_id: i64) -> Result<()> {
        match self.db.users.status(chat_id).await? {
            Some(PaymentStatus::PendingPayment) => {}
            _ => {
                debug!(chat_id = chat_id, "Registration reminder no-op, state moved on");
                return Ok(());
            }
        }

        if let Some(user) = self.db.users.find(chat_id).await? {
            if let Some(coach_id) = user.selected_coach {
                if let Err(e) = self
                    .bot
                    .send_message(
                        ChatId(coach_id),
                        format!(
                            "Reminder: User (chat_id: {}) has not completed registration within the time limit.",
                            chat_id
                        ),
                    )
                    .await
                {
                    warn!(coach_id = coach_id, error = %e, "Failed to ping coach");
                }
            }
        }

        let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
            "Payment Approval Stats",
            "check_approval",
        )]]);
        self.bot
            .send_message(
                ChatId(chat_id),
                "Your payment is still being reviewed. Click below to check status:",
            )
            .reply_markup(keyboard)
            .await?;

        Ok(())
    }

    /// Coupon reminder: only acts while the payment is still pending
    async fn fire_coupon_reminder(&self, payment_id: i64) -> Result<()> {
        let payment = match self.db.payments.find(payment_id).await? {
            Some(payment) if payment.status == PaymentState::PendingPayment => payment,
            _ => {
                debug!(payment_id = payment_id, "Coupon reminder no-op, state moved on");
                return Ok(());
            }
        };

        let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
            "Payment Approval Stats",
            "check_approval",
        )]]);
        self.bot
            .send_message(
                ChatId(payment.chat_id),
                "Your coupon payment is still being reviewed. Click below to check status:",
            )
            .reply_markup(keyboard)
            .await?;

        Ok(())
    }

    /// Spawn the daily clock loop: 08:00 reminder fan-out, 20:00 summary
    pub fn spawn_daily_jobs(&self) -> tokio::task::JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            loop {
                let now = Utc::now();
                let next_reminder = next_occurrence(now, DAILY_REMINDER_HOUR);
                let next_summary = next_occurrence(now, DAILY_SUMMARY_HOUR);

                let (when, is_reminder) = if next_reminder <= next_summary {
                    (next_reminder, true)
                } else {
                    (next_summary, false)
                };

                let wait = (when - Utc::now()).to_std().unwrap_or_default();
                tokio::time::sleep(wait).await;

                let result = if is_reminder {
                    this.run_daily_reminder().await
                } else {
                    this.run_daily_summary().await
                };

                if let Err(e) = result {
                    error!(error = %e, "Daily job failed");
                }
            }
        })
    }

    /// Message every user who opted into daily reminders
    async fn run_daily_reminder(&self) -> Result<()> {
        let recipients = self.db.users.alarm_ids().await?;
        info!(count = recipients.len(), "Sending daily reminders");

        for chat_id in recipients {
            match self
                .bot
                .send_message(
                    ChatId(chat_id),
                    "\u{1F31F} Daily Reminder: Complete your Ethereal tasks to maximize your earnings!",
                )
                .await
            {
                Ok(_) => self.db.log_interaction(chat_id, "daily_reminder").await,
                Err(e) => warn!(chat_id = chat_id, error = %e, "Failed to send daily reminder"),
            }
        }

        Ok(())
    }

    /// Send the evening roll-up to the admin
    async fn run_daily_summary(&self) -> Result<()> {
        let summary = self.reporting.daily_summary().await?;
        self.bot
            .send_message(ChatId(self.settings.bot.admin_id), summary)
            .await?;
        Ok(())
    }
}

/// Next occurrence of the given UTC hour, strictly after `now`
fn next_occurrence(now: DateTime<Utc>, hour: u32) -> DateTime<Utc> {
    let today = now
        .date_naive()
        .and_hms_opt(hour, 0, 0)
        .expect("valid wall-clock hour")
        .and_utc();

    if today > now {
        today
    } else {
        today + chrono::Duration::days(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_next_occurrence_later_today() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 6, 30, 0).unwrap();
        let next = next_occurrence(now, 8);
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_next_occurrence_rolls_to_tomorrow() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let next = next_occurrence(now, 8);
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 3, 2, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_next_occurrence_exact_hour_rolls_forward() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        let next = next_occurrence(now, 8);
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 3, 2, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_reminder_keys_are_per_flow() {
        let reg = (ReminderKind::RegistrationPayment, 42_i64);
        let coupon = (ReminderKind::CouponPayment, 42_i64);
        assert_ne!(reg, coupon);
    }
}
