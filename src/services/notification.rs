//! Notification service implementation
//!
//! Outbound messaging helpers: admin/coach notices and the broadcast
//! fan-out. Broadcast failures are per-recipient; one blocked user never
//! aborts the batch.

use futures::{stream, StreamExt};
use teloxide::{
    prelude::*,
    types::{ChatId, InlineKeyboardMarkup},
    Bot,
};
use tracing::{error, info};

use crate::config::Settings;
use crate::utils::errors::Result;

const BROADCAST_CONCURRENCY: usize = 8;

/// Outcome of a broadcast fan-out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastOutcome {
    pub sent: usize,
    pub failed: usize,
}

/// Notification service for outbound messages
#[derive(Clone)]
pub struct NotificationService {
    bot: Bot,
    settings: Settings,
}

impl NotificationService {
    pub fn new(bot: Bot, settings: Settings) -> Self {
        Self { bot, settings }
    }

    /// Send a plain message to the super-admin
    pub async fn notify_admin(&self, text: impl Into<String>) -> Result<()> {
        self.bot
            .send_message(ChatId(self.settings.bot.admin_id), text.into())
            .await?;
        Ok(())
    }

    /// Send a plain message to any chat
    pub async fn notify(&self, chat_id: i64, text: impl Into<String>) -> Result<()> {
        self.bot.send_message(ChatId(chat_id), text.into()).await?;
        Ok(())
    }

    /// Send a message with inline buttons to the super-admin
    pub async fn notify_admin_with_keyboard(
        &self,
        text: impl Into<String>,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<()> {
        self.bot
            .send_message(ChatId(self.settings.bot.admin_id), text.into())
            .reply_markup(keyboard)
            .await?;
        Ok(())
    }

    /// Fan a message out to the given recipients.
    ///
    /// Failed sends (blocked bot, deleted account) are logged and skipped.
    pub async fn broadcast(&self, recipients: &[i64], text: &str) -> BroadcastOutcome {
        let results: Vec<bool> = stream::iter(recipients.iter().copied())
            .map(|chat_id| {
                let bot = self.bot.clone();
                let text = text.to_string();
                async move {
                    match bot.send_message(ChatId(chat_id), text).await {
                        Ok(_) => true,
                        Err(e) => {
                            error!(chat_id = chat_id, error = %e, "Failed to send broadcast");
                            false
                        }
                    }
                }
            })
            .buffer_unordered(BROADCAST_CONCURRENCY)
            .collect()
            .await;

        let sent = results.iter().filter(|ok| **ok).count();
        let outcome = BroadcastOutcome {
            sent,
            failed: results.len() - sent,
        };

        info!(sent = outcome.sent, failed = outcome.failed, "Broadcast finished");
        outcome
    }
}
