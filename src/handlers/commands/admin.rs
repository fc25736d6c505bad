//! Admin command handlers
//!
//! Super-admin-only commands: broadcast, reporting, task creation, coach
//! roster and payment account management.

use chrono::{DateTime, Utc};
use teloxide::{prelude::*, types::Message, Bot};
use tracing::info;

use crate::services::ServiceFactory;
use crate::state::{Expectation, SessionStore};
use crate::utils::errors::Result;
use crate::utils::logging;

const RESTRICTED: &str = "This command is restricted to the super admin.";

/// Guard for super-admin commands; replies and returns false for others
async fn require_admin(bot: &Bot, msg: &Message, services: &ServiceFactory) -> Result<bool> {
    if services.is_admin(msg.chat.id.0) {
        Ok(true)
    } else {
        bot.send_message(msg.chat.id, RESTRICTED).await?;
        Ok(false)
    }
}

/// Handle /broadcast - next admin message fans out to registered users
pub async fn handle_broadcast(
    bot: Bot,
    msg: Message,
    services: ServiceFactory,
    store: SessionStore,
) -> Result<()> {
    if !require_admin(&bot, &msg, &services).await? {
        return Ok(());
    }

    store.set_expectation(msg.chat.id.0, Expectation::BroadcastMessage);
    services.db.log_interaction(msg.chat.id.0, "broadcast_initiated").await;

    bot.send_message(
        msg.chat.id,
        "Please enter the broadcast message to send to all registered users:",
    )
    .await?;
    Ok(())
}

/// Handle /botstats
pub async fn handle_botstats(
    bot: Bot,
    msg: Message,
    services: ServiceFactory,
    started_at: DateTime<Utc>,
) -> Result<()> {
    if !require_admin(&bot, &msg, &services).await? {
        return Ok(());
    }

    let report = services.reporting_service.bot_stats(started_at).await?;
    bot.send_message(msg.chat.id, report).await?;
    services.db.log_interaction(msg.chat.id.0, "botstats").await;
    Ok(())
}

/// Handle /registered_users
pub async fn handle_registered_users(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    if !require_admin(&bot, &msg, &services).await? {
        return Ok(());
    }

    match services.reporting_service.registered_users_report().await? {
        Some(report) => bot.send_message(msg.chat.id, report).await?,
        None => bot.send_message(msg.chat.id, "No registered users found.").await?,
    };
    services.db.log_interaction(msg.chat.id.0, "registered_users").await;
    Ok(())
}

/// Handle /registration_stats
pub async fn handle_registration_stats(
    bot: Bot,
    msg: Message,
    services: ServiceFactory,
) -> Result<()> {
    if !require_admin(&bot, &msg, &services).await? {
        return Ok(());
    }

    let report = services.reporting_service.registration_stats().await?;
    bot.send_message(msg.chat.id, report).await?;
    services.db.log_interaction(msg.chat.id.0, "registration_stats").await;
    Ok(())
}

/// Handle /add_task <type> <link> <reward>
pub async fn handle_add_task(
    bot: Bot,
    msg: Message,
    args: String,
    services: ServiceFactory,
) -> Result<()> {
    if !require_admin(&bot, &msg, &services).await? {
        return Ok(());
    }

    let parts: Vec<&str> = args.split_whitespace().collect();
    if parts.len() != 3 {
        bot.send_message(msg.chat.id, "Usage: /add_task <type> <link> <reward>").await?;
        return Ok(());
    }

    match services.task_service.add_task(parts[0], parts[1], parts[2]).await {
        Ok(task) => {
            info!(task_id = task.id, task_type = task.task_type.as_str(), "Task added");
            bot.send_message(msg.chat.id, "Task added successfully.").await?;
            services.db.log_interaction(msg.chat.id.0, "add_task").await;
        }
        Err(crate::utils::errors::EtherealError::InvalidInput(reason)) => {
            bot.send_message(msg.chat.id, reason).await?;
        }
        Err(e) => return Err(e),
    }

    Ok(())
}

/// Handle /addcoach <chat_id>
pub async fn handle_add_coach(
    bot: Bot,
    msg: Message,
    args: String,
    services: ServiceFactory,
) -> Result<()> {
    if !require_admin(&bot, &msg, &services).await? {
        return Ok(());
    }

    let coach_id: i64 = match args.trim().parse() {
        Ok(id) => id,
        Err(_) => {
            bot.send_message(msg.chat.id, "Usage: /addcoach <chat_id>").await?;
            return Ok(());
        }
    };

    if services.db.coaches.exists(coach_id).await? {
        bot.send_message(msg.chat.id, "This user is already a coach.").await?;
        return Ok(());
    }

    let name = format!("Coach {}", coach_id);
    let coach = services.db.coaches.insert(coach_id, &name, msg.chat.id.0).await?;
    logging::log_admin_action(msg.chat.id.0, "add_coach", Some(&coach_id.to_string()));

    bot.send_message(
        msg.chat.id,
        format!("Coach {} added successfully as {}.", coach_id, coach.name),
    )
    .await?;
    services.db.log_interaction(msg.chat.id.0, "add_coach").await;
    Ok(())
}

/// Handle /list_coaches
pub async fn handle_list_coaches(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    if !require_admin(&bot, &msg, &services).await? {
        return Ok(());
    }

    let coaches = services.db.coaches.list().await?;
    if coaches.is_empty() {
        bot.send_message(msg.chat.id, "No coaches found.").await?;
        return Ok(());
    }

    let mut text = String::from("List of Coaches:\n\n");
    for coach in coaches {
        text.push_str(&format!("Coach ID: {}, Name: {}\n", coach.coach_id, coach.name));
    }
    bot.send_message(msg.chat.id, text).await?;
    services.db.log_interaction(msg.chat.id.0, "list_coaches").await;
    Ok(())
}

/// Handle /remove_coach <coach_id>
pub async fn handle_remove_coach(
    bot: Bot,
    msg: Message,
    args: String,
    services: ServiceFactory,
) -> Result<()> {
    if !require_admin(&bot, &msg, &services).await? {
        return Ok(());
    }

    let coach_id: i64 = match args.trim().parse() {
        Ok(id) => id,
        Err(_) => {
            bot.send_message(msg.chat.id, "Usage: /remove_coach <coach_id>").await?;
            return Ok(());
        }
    };

    if services.db.coaches.delete(coach_id).await? {
        logging::log_admin_action(msg.chat.id.0, "remove_coach", Some(&coach_id.to_string()));
        bot.send_message(msg.chat.id, format!("Coach {} removed successfully.", coach_id))
            .await?;
    } else {
        bot.send_message(msg.chat.id, "Coach not found.").await?;
    }
    services.db.log_interaction(msg.chat.id.0, "remove_coach").await;
    Ok(())
}

/// Handle /add_account <country> <flag> <details...>
pub async fn handle_add_account(
    bot: Bot,
    msg: Message,
    args: String,
    services: ServiceFactory,
) -> Result<()> {
    if !require_admin(&bot, &msg, &services).await? {
        return Ok(());
    }

    let parts: Vec<&str> = args.split_whitespace().collect();
    if parts.len() < 3 {
        bot.send_message(msg.chat.id, "Usage: /add_account <country> <flag> <details>").await?;
        return Ok(());
    }

    let country = parts[0];
    let flag = parts[1];
    let details = parts[2..].join(" ");

    services.db.accounts.insert(country, flag, &details).await?;
    logging::log_admin_action(msg.chat.id.0, "add_account", Some(country));

    bot.send_message(
        msg.chat.id,
        format!("Payment account for {} added successfully.", country),
    )
    .await?;
    services.db.log_interaction(msg.chat.id.0, "add_account").await;
    Ok(())
}

/// Handle /delete_account <country>
pub async fn handle_delete_account(
    bot: Bot,
    msg: Message,
    args: String,
    services: ServiceFactory,
) -> Result<()> {
    if !require_admin(&bot, &msg, &services).await? {
        return Ok(());
    }

    let country = args.trim();
    if country.is_empty() {
        bot.send_message(msg.chat.id, "Usage: /delete_account <country>").await?;
        return Ok(());
    }

    if services.db.accounts.delete_by_country(country).await? {
        logging::log_admin_action(msg.chat.id.0, "delete_account", Some(country));
        bot.send_message(
            msg.chat.id,
            format!("Payment account for {} deleted successfully.", country),
        )
        .await?;
    } else {
        bot.send_message(msg.chat.id, "Account not found.").await?;
    }
    services.db.log_interaction(msg.chat.id.0, "delete_account").await;
    Ok(())
}

/// Handle /list_accounts
pub async fn handle_list_accounts(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    if !require_admin(&bot, &msg, &services).await? {
        return Ok(());
    }

    let accounts = services.db.accounts.list().await?;
    if accounts.is_empty() {
        bot.send_message(msg.chat.id, "No payment accounts found.").await?;
        return Ok(());
    }

    let mut text = String::from("Payment Accounts:\n\n");
    for account in accounts {
        let status = if account.is_active { "Active" } else { "Inactive" };
        text.push_str(&format!(
            "Country: {} {}, Details: {}, Status: {}\n",
            account.country, account.flag, account.details, status
        ));
    }
    bot.send_message(msg.chat.id, text).await?;
    services.db.log_interaction(msg.chat.id.0, "list_accounts").await;
    Ok(())
}
