//! Reporting service implementation
//!
//! Read-only aggregate queries rendered into admin-facing reports. Nothing
//! here mutates flow state.

use chrono::{DateTime, Duration, Utc};

use crate::database::DatabaseService;
use crate::utils::errors::Result;
use crate::utils::helpers;

/// Reporting service over the ledger's aggregate queries
#[derive(Clone)]
pub struct ReportingService {
    db: DatabaseService,
}

impl ReportingService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Runtime + usage counters for /botstats
    pub async fn bot_stats(&self, started_at: DateTime<Utc>) -> Result<String> {
        let now = Utc::now();
        let runtime = (now - started_at).num_seconds().max(0) as u64;

        let total_users = self.db.users.count().await?;
        let registered_users = self.db.users.count_registered().await?;
        let link_clicks = self.db.interactions.count_by_action("start").await?;
        let hourly_usage = self.db.interactions.count_since(now - Duration::hours(1)).await?;
        let daily_usage = self.db.interactions.count_since(now - Duration::hours(24)).await?;

        Ok(format!(
            "\u{1F916} Bot Stats:\n\n\
             \u{2022} Runtime: {}\n\
             \u{2022} Total Users: {}\n\
             \u{2022} Registered Users: {}\n\
             \u{2022} Bot Link Clicks: {}\n\
             \u{2022} Hourly Interactions: {}\n\
             \u{2022} Daily Interactions: {}",
            helpers::format_runtime(runtime),
            total_users,
            registered_users,
            link_clicks,
            hourly_usage,
            daily_usage
        ))
    }

    /// Flat list of registered users for /registered_users
    pub async fn registered_users_report(&self) -> Result<Option<String>> {
        let users = self.db.users.registered_users().await?;
        if users.is_empty() {
            return Ok(None);
        }

        let mut text = String::from("Registered Users:\n\n");
        for user in users {
            text.push_str(&format!(
                "Chat ID: {}, Username: {}, Package: {}, Registered: {}\n",
                user.chat_id,
                user.username.as_deref().unwrap_or("Unknown"),
                user.package.map(|p| p.as_str()).unwrap_or("None"),
                user.registration_date
                    .map(helpers::format_timestamp)
                    .unwrap_or_else(|| "Unknown".to_string()),
            ));
        }

        Ok(Some(text))
    }

    /// Per-package and per-coach registration breakdown
    pub async fn registration_stats(&self) -> Result<String> {
        let total = self.db.users.count_registered().await?;
        let package_counts = self.db.users.package_counts().await?;
        let coach_counts = self.db.users.coach_counts().await?;

        let mut text = format!(
            "\u{1F4CA} Registration Statistics:\n\nTotal Registered Users: {}\n\nRegistrations per Package:\n",
            total
        );
        for (package, count) in package_counts {
            text.push_str(&format!(
                "- {}: {}\n",
                package.map(|p| p.as_str()).unwrap_or("None"),
                count
            ));
        }

        text.push_str("\nRegistrations per Coach:\n");
        for (coach_id, count) in coach_counts {
            match coach_id {
                Some(id) => {
                    let name = self
                        .db
                        .coaches
                        .find(id)
                        .await?
                        .map(|coach| coach.name)
                        .unwrap_or_else(|| format!("Coach {}", id));
                    text.push_str(&format!("- {}: {}\n", name, count));
                }
                None => text.push_str(&format!("- No coach: {}\n", count)),
            }
        }

        Ok(text)
    }

    /// Registered users assigned to one coach, for /my_users
    pub async fn my_users_report(&self, coach_id: i64) -> Result<Option<String>> {
        let users = self.db.users.registered_by_coach(coach_id).await?;
        if users.is_empty() {
            return Ok(None);
        }

        let mut text = String::from("Your Registered Users:\n\n");
        for user in users {
            text.push_str(&format!(
                "Chat ID: {}, Username: {}, Package: {}, Registered: {}\n",
                user.chat_id,
                user.username.as_deref().unwrap_or("Unknown"),
                user.package.map(|p| p.as_str()).unwrap_or("None"),
                user.registration_date
                    .map(helpers::format_timestamp)
                    .unwrap_or_else(|| "Unknown".to_string()),
            ));
        }

        Ok(Some(text))
    }

    /// Last-24h roll-up sent to the admin every evening
    pub async fn daily_summary(&self) -> Result<String> {
        let now = Utc::now();
        let since = now - Duration::days(1);

        let new_users = self.db.users.count_registered_since(since).await?;
        let reg_payments = self.db.users.registration_revenue_since(since).await?;
        let coupon_payments = self.db.payments.sum_approved_since(since).await?;
        let tasks_completed = self.db.tasks.completions_since(since).await?;
        let total_distributed = self.db.tasks.rewards_distributed_since(since).await?;

        Ok(format!(
            "\u{1F4CA} Daily Summary ({}):\n\n\
             \u{2022} New Users: {}\n\
             \u{2022} Total Payments Approved: \u{20A6}{}\n\
             \u{2022} Tasks Completed: {}\n\
             \u{2022} Total Balance Distributed: ${}",
            now.format("%Y-%m-%d"),
            new_users,
            reg_payments + coupon_payments,
            tasks_completed,
            total_distributed
        ))
    }
}
