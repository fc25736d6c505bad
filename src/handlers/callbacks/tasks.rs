//! Task flow callback handlers
//!
//! Listing, synchronous membership verification, screenshot verification
//! and the admin approve/reject actions.

use teloxide::{
    prelude::*,
    types::{ChatId, ChatMemberStatus, InlineKeyboardButton, InlineKeyboardMarkup, MessageId, Recipient, UserId},
    Bot,
};
use url::Url;
use tracing::{info, warn};

use crate::models::user::Package;
use crate::services::{CompletionOutcome, RevokeOutcome, ServiceFactory};
use crate::state::{Expectation, SessionStore};
use crate::utils::errors::{EtherealError, Result};
use crate::utils::helpers;

use super::menu_only_keyboard;

/// List the tasks this user can still earn from
pub async fn handle_earn_extra(
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
    services: ServiceFactory,
) -> Result<()> {
    let tasks = services.task_service.available_for(chat_id.0).await?;
    if tasks.is_empty() {
        bot.edit_message_text(chat_id, message_id, "No extra tasks available right now. Please check back later.")
            .reply_markup(menu_only_keyboard())
            .await?;
        return Ok(());
    }

    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    for task in &tasks {
        let verify = InlineKeyboardButton::callback("Verify", format!("verify:{}", task.id));
        let label = format!("Join {} (${})", task.task_type.as_str(), task.reward);

        let join_url = Url::parse(&task.link).or_else(|_| {
            Url::parse(&format!("https://t.me/{}", task.link.trim_start_matches('@')))
        });
        match join_url {
            Ok(url) => rows.push(vec![InlineKeyboardButton::url(label, url), verify]),
            Err(_) => rows.push(vec![verify]),
        }
    }
    rows.push(vec![InlineKeyboardButton::callback("\u{1F519} Main Menu", "menu")]);

    bot.edit_message_text(chat_id, message_id, "Available extra tasks for today:")
        .reply_markup(InlineKeyboardMarkup::new(rows))
        .await?;
    Ok(())
}

/// Verify button: membership tasks are checked synchronously and answered
/// inline; external tasks arm the screenshot expectation.
pub async fn handle_verify_task(
    bot: Bot,
    query_id: String,
    chat_id: ChatId,
    task_id: i64,
    services: ServiceFactory,
    store: SessionStore,
) -> Result<()> {
    let task = match services.task_service.find(task_id).await? {
        Some(task) => task,
        None => {
            bot.answer_callback_query(query_id).text("Task not found.").await?;
            return Ok(());
        }
    };

    if task.task_type.is_membership_check() {
        let handle = helpers::chat_handle_from_link(&task.link);
        let member = bot
            .get_chat_member(Recipient::ChannelUsername(handle), UserId(chat_id.0 as u64))
            .await;

        match member {
            Ok(member) => {
                let satisfied = matches!(
                    member.status(),
                    ChatMemberStatus::Member
                        | ChatMemberStatus::Administrator
                        | ChatMemberStatus::Owner
                );

                if satisfied {
                    match services.task_service.complete(chat_id.0, task_id).await? {
                        CompletionOutcome::Completed { reward } => {
                            bot.answer_callback_query(query_id)
                                .text(format!("Task completed! You earned ${}.", reward))
                                .await?;
                        }
                        CompletionOutcome::AlreadyCompleted => {
                            bot.answer_callback_query(query_id)
                                .text("You already completed this task.")
                                .await?;
                        }
                    }
                } else {
                    bot.answer_callback_query(query_id)
                        .text("You are not in the group/channel yet.")
                        .await?;
                }
            }
            Err(e) => {
                warn!(task_id = task_id, error = %e, "Membership check failed");
                bot.answer_callback_query(query_id)
                    .text("Error verifying task. Try again later.")
                    .await?;
            }
        }
    } else {
        store.set_expectation(chat_id.0, Expectation::TaskScreenshot { task_id });
        bot.answer_callback_query(query_id).await?;
        bot.send_message(
            chat_id,
            format!("Please send the screenshot for task #{} verification.", task_id),
        )
        .await?;
    }
    Ok(())
}

/// Admin approved a screenshot verification.
///
/// Defends against double invocation: an existing completion row means the
/// reward was already paid, so the action degrades to a notice.
pub async fn handle_approve_task(
    bot: Bot,
    admin_chat: ChatId,
    message_id: MessageId,
    task_id: i64,
    user_chat_id: i64,
    services: ServiceFactory,
) -> Result<()> {
    if services.task_service.is_completed(user_chat_id, task_id).await? {
        bot.edit_message_text(admin_chat, message_id, "Task already rewarded.").await?;
        return Ok(());
    }

    let outcome = match services.task_service.complete(user_chat_id, task_id).await {
        Ok(outcome) => outcome,
        Err(EtherealError::TaskNotFound { .. }) => {
            bot.edit_message_text(admin_chat, message_id, "Task not found.").await?;
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    match outcome {
        CompletionOutcome::Completed { reward } => {
            info!(chat_id = user_chat_id, task_id = task_id, reward = reward, "Task approved");
            bot.send_message(
                ChatId(user_chat_id),
                format!("Task approved! You earned ${}.", reward),
            )
            .await?;
            bot.edit_message_text(admin_chat, message_id, "Task approved and reward awarded.")
                .await?;
        }
        CompletionOutcome::AlreadyCompleted => {
            bot.edit_message_text(admin_chat, message_id, "Task already rewarded.").await?;
        }
    }
    Ok(())
}

/// Admin rejected a verification, revoking a previously paid reward when
/// the balance still covers it.
pub async fn handle_reject_task(
    bot: Bot,
    admin_chat: ChatId,
    message_id: MessageId,
    task_id: i64,
    user_chat_id: i64,
    services: ServiceFactory,
) -> Result<()> {
    let outcome = match services.task_service.revoke(user_chat_id, task_id).await {
        Ok(outcome) => outcome,
        Err(EtherealError::TaskNotFound { .. } | EtherealError::UserNotFound { .. }) => {
            bot.edit_message_text(admin_chat, message_id, "Task or user not found.").await?;
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    match outcome {
        RevokeOutcome::Revoked { .. } => {
            bot.send_message(ChatId(user_chat_id), "Task verification rejected. Reward revoked.")
                .await?;
            bot.edit_message_text(admin_chat, message_id, "Task rejected and reward removed.")
                .await?;
        }
        RevokeOutcome::InsufficientBalance => {
            bot.edit_message_text(
                admin_chat,
                message_id,
                "Task rejected, but balance insufficient to revoke reward.",
            )
            .await?;
        }
    }
    Ok(())
}

/// Daily-task link, with special copy for X users
pub async fn handle_daily_tasks(
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
    services: ServiceFactory,
) -> Result<()> {
    let package = services
        .user_service
        .find(chat_id.0)
        .await?
        .and_then(|user| user.package);

    let link = &services.settings.links.daily_task_link;
    let text = if package == Some(Package::X) {
        format!("\u{1F31F} X Users: Maximize your earnings with this special daily task link: {}", link)
    } else {
        format!("Follow this link to perform your daily tasks and earn: {}", link)
    };

    bot.edit_message_text(chat_id, message_id, text)
        .reply_markup(menu_only_keyboard())
        .await?;
    Ok(())
}
