//! Callback query handlers module
//!
//! The flow router for button presses: every callback data string maps to
//! exactly one handler, parameterized actions carry their business ids in
//! colon-separated segments. Unknown identifiers are logged and dropped.

pub mod coupon;
pub mod help;
pub mod registration;
pub mod tasks;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, ChatId, InlineKeyboardButton, InlineKeyboardMarkup},
    Bot,
};
use tracing::{debug, warn};

use crate::handlers::commands::start;
use crate::scheduler::ReminderScheduler;
use crate::services::ServiceFactory;
use crate::state::SessionStore;
use crate::utils::errors::Result;

/// Actions that answer their own callback query (with ephemeral text)
const SELF_ANSWERING: &[&str] = &["verify", "withdraw"];

/// Single-row "back to menu" keyboard shared across flows
pub(crate) fn menu_only_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "\u{1F519} Main Menu",
        "menu",
    )]])
}

/// Main callback query dispatcher
pub async fn handle_callback_query(
    bot: Bot,
    query: CallbackQuery,
    services: ServiceFactory,
    store: SessionStore,
    scheduler: ReminderScheduler,
) -> Result<()> {
    let user = query.from;
    let user_id = user.id.0 as i64;
    let username = user.username.clone();

    let Some(data) = query.data else {
        return Ok(());
    };
    debug!(user_id = user_id, callback_data = %data, "Processing callback query");

    services.db.log_interaction(user_id, &format!("button_{}", data)).await;

    let Some((chat_id, message_id)) = query.message.as_ref().map(|m| (m.chat().id, m.id())) else {
        warn!(user_id = user_id, callback_data = %data, "Callback without accessible message");
        return Ok(());
    };

    let parts: Vec<&str> = data.split(':').collect();
    let action = parts[0];

    // Answer early to clear the client's loading state, except for the
    // actions that reply with their own ephemeral notice
    if !SELF_ANSWERING.contains(&action) {
        if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
            warn!(error = %e, "Failed to answer callback query");
        }
    }

    match action {
        "menu" => {
            store.clear(user_id);
            let (text, keyboard) = start::main_menu_view(&services, user_id).await?;
            bot.edit_message_text(chat_id, message_id, text)
                .reply_markup(keyboard)
                .await?;
        }
        "stats" => {
            services.db.log_interaction(user_id, "stats").await;
            match start::stats_view(&services, user_id).await? {
                Some((text, keyboard)) => {
                    bot.edit_message_text(chat_id, message_id, text)
                        .reply_markup(keyboard)
                        .await?;
                }
                None => {
                    bot.edit_message_text(chat_id, message_id, "No user data found. Please start with /start.")
                        .await?;
                }
            }
        }
        "help" => {
            help::show_help_menu(bot, chat_id, message_id, services).await?;
        }
        "how_it_works" => {
            registration::handle_how_it_works(bot, chat_id, message_id).await?;
        }
        "package_selector" => {
            registration::handle_package_selector(bot, chat_id, message_id, services).await?;
        }
        "reg_pkg" if parts.len() >= 2 => {
            registration::handle_package_chosen(
                bot, chat_id, message_id, parts[1], username, services, store,
            )
            .await?;
        }
        "coach" if parts.len() >= 2 => {
            if let Ok(coach_id) = parts[1].parse::<i64>() {
                registration::handle_coach_selected(bot, chat_id, message_id, coach_id, services)
                    .await?;
            }
        }
        "country" => {
            if let Some(country) = data.strip_prefix("country:") {
                registration::handle_country_selected(bot, chat_id, country, services, store)
                    .await?;
            }
        }
        "country_menu" => {
            registration::show_country_selection(bot, chat_id, message_id, services, store).await?;
        }
        "country_other" => {
            registration::handle_other_country(bot, chat_id, message_id, store).await?;
        }
        "coupon" => {
            coupon::handle_coupon_start(bot, chat_id, message_id, store).await?;
        }
        "coupon_pkg" if parts.len() >= 2 => {
            coupon::handle_coupon_package(
                bot, chat_id, message_id, parts[1], username, services, store,
            )
            .await?;
        }
        "coupon_account" => {
            if let Some(country) = data.strip_prefix("coupon_account:") {
                coupon::handle_account_selected(bot, chat_id, country, services, store).await?;
            }
        }
        "coupon_account_menu" => {
            coupon::show_account_selection(bot, chat_id, message_id, services, store).await?;
        }
        "approve" if parts.len() >= 3 => match (parts[1], parts[2].parse::<i64>()) {
            ("reg", Ok(target)) => {
                registration::handle_approve_registration(
                    bot, chat_id, message_id, target, services, scheduler,
                )
                .await?;
            }
            ("coupon", Ok(payment_id)) => {
                coupon::handle_approve_payment(
                    bot, chat_id, message_id, payment_id, services, store, scheduler,
                )
                .await?;
            }
            ("task", Ok(task_id)) => {
                if let Some(Ok(target)) = parts.get(3).map(|p| p.parse::<i64>()) {
                    tasks::handle_approve_task(bot, chat_id, message_id, task_id, target, services)
                        .await?;
                }
            }
            _ => warn!(callback_data = %data, "Malformed approve callback"),
        },
        "pending" if parts.len() >= 3 => match (parts[1], parts[2].parse::<i64>()) {
            ("reg", Ok(target)) => {
                registration::handle_pending_registration(bot, target).await?;
            }
            ("coupon", Ok(payment_id)) => {
                coupon::handle_pending_payment(bot, payment_id, services).await?;
            }
            _ => warn!(callback_data = %data, "Malformed pending callback"),
        },
        "reject" if parts.len() >= 4 => {
            if let (Ok(task_id), Ok(target)) = (parts[2].parse::<i64>(), parts[3].parse::<i64>()) {
                tasks::handle_reject_task(bot, chat_id, message_id, task_id, target, services)
                    .await?;
            }
        }
        "finalize" if parts.len() >= 2 => {
            if let Ok(target) = parts[1].parse::<i64>() {
                registration::handle_finalize(bot, chat_id, message_id, target, store).await?;
            }
        }
        "verify" if parts.len() >= 2 => {
            if let Ok(task_id) = parts[1].parse::<i64>() {
                tasks::handle_verify_task(bot, query.id.clone(), chat_id, task_id, services, store)
                    .await?;
            }
        }
        "earn_extra" => {
            tasks::handle_earn_extra(bot, chat_id, message_id, services).await?;
        }
        "daily_tasks" => {
            tasks::handle_daily_tasks(bot, chat_id, message_id, services).await?;
        }
        "boost_ai" => {
            help::handle_boost_ai(bot, chat_id, message_id, services).await?;
        }
        "refer_friend" => {
            help::handle_refer_friend(bot, chat_id, message_id, services).await?;
        }
        "withdraw" => {
            help::handle_withdraw(bot, query.id.clone(), chat_id, message_id, username, services)
                .await?;
        }
        "check_approval" => {
            registration::handle_check_approval(bot, ChatId(user_id), services, store).await?;
        }
        "faq" => {
            if parts.len() >= 2 {
                help::handle_faq_entry(bot, chat_id, message_id, parts[1], store).await?;
            } else {
                help::show_faq_menu(bot, chat_id, message_id).await?;
            }
        }
        "topic" if parts.len() >= 2 => {
            help::handle_help_topic(bot, chat_id, message_id, parts[1], store).await?;
        }
        "toggle_reminder" => {
            help::handle_toggle_reminder(bot, chat_id, message_id, services).await?;
        }
        "reminders" if parts.len() >= 2 => {
            registration::handle_reminder_optin(
                bot,
                chat_id,
                message_id,
                parts[1] == "on",
                services,
            )
            .await?;
        }
        "user_registered" => {
            registration::handle_registration_recap(bot, chat_id, message_id, services).await?;
        }
        _ => {
            warn!(action = %action, "Unknown callback action");
        }
    }

    Ok(())
}
