//! Coach-facing command handlers

use teloxide::{prelude::*, types::Message, Bot};

use crate::models::user::PaymentStatus;
use crate::services::ServiceFactory;
use crate::utils::errors::Result;

/// Handle /coach - registered users apply to join the roster
pub async fn handle_apply_coach(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let chat_id = msg.chat.id;

    let status = services.user_service.status(chat_id.0).await?;
    if status != Some(PaymentStatus::Registered) {
        bot.send_message(chat_id, "Only registered users can apply to be a coach.").await?;
        return Ok(());
    }

    let username = msg
        .from
        .as_ref()
        .and_then(|user| user.username.clone())
        .unwrap_or_else(|| "Unknown".to_string());

    services
        .notification_service
        .notify_admin(format!(
            "User @{} (chat_id: {}) wants to apply to be a coach.",
            username, chat_id.0
        ))
        .await?;

    bot.send_message(chat_id, "Your application has been sent. An admin will contact you soon.")
        .await?;
    services.db.log_interaction(chat_id.0, "apply_coach").await;
    Ok(())
}

/// Handle /my_users - coach-scoped registration listing
pub async fn handle_my_users(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let chat_id = msg.chat.id;

    if !services.db.coaches.exists(chat_id.0).await? {
        bot.send_message(chat_id, "You are not a coach.").await?;
        return Ok(());
    }

    match services.reporting_service.my_users_report(chat_id.0).await? {
        Some(report) => bot.send_message(chat_id, report).await?,
        None => bot.send_message(chat_id, "You have no registered users.").await?,
    };
    services.db.log_interaction(chat_id.0, "my_users").await;
    Ok(())
}
