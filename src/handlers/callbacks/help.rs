//! Help menu, FAQ, reminder toggle and withdrawal callback handlers

use teloxide::{
    prelude::*,
    types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId},
    Bot,
};

use crate::content::{self, HelpTopicKind};
use crate::models::user::PaymentStatus;
use crate::services::ServiceFactory;
use crate::state::{Expectation, SessionStore};
use crate::utils::errors::Result;

use super::menu_only_keyboard;

fn help_back_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "\u{1F519} Help Menu",
        "help",
    )]])
}

/// Render the help topic menu
pub async fn show_help_menu(
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
    services: ServiceFactory,
) -> Result<()> {
    let status = services.user_service.status(chat_id.0).await?;

    let mut rows: Vec<Vec<InlineKeyboardButton>> = content::HELP_TOPICS
        .iter()
        .map(|topic| {
            // The FAQ topic is a routing alias straight into the FAQ menu
            let data = match topic.kind {
                HelpTopicKind::Faq => "faq".to_string(),
                _ => format!("topic:{}", topic.key),
            };
            vec![InlineKeyboardButton::callback(topic.label, data)]
        })
        .collect();
    if status == Some(PaymentStatus::Registered) {
        rows.push(vec![InlineKeyboardButton::callback("\u{1F465} Refer a Friend", "refer_friend")]);
    }
    rows.push(vec![InlineKeyboardButton::callback("\u{1F519} Main Menu", "menu")]);

    bot.edit_message_text(chat_id, message_id, "What would you like help with?")
        .reply_markup(InlineKeyboardMarkup::new(rows))
        .await?;
    services.db.log_interaction(chat_id.0, "help_menu").await;
    Ok(())
}

/// Open one help topic
pub async fn handle_help_topic(
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
    key: &str,
    store: SessionStore,
) -> Result<()> {
    let Some(topic) = content::help_topic(key) else {
        bot.edit_message_text(chat_id, message_id, "Topic not found.")
            .reply_markup(help_back_keyboard())
            .await?;
        return Ok(());
    };

    match topic.kind {
        HelpTopicKind::Text => {
            bot.edit_message_text(chat_id, message_id, topic.body)
                .reply_markup(help_back_keyboard())
                .await?;
        }
        HelpTopicKind::Video => {
            bot.edit_message_text(chat_id, message_id, format!("Watch here: {}", topic.body))
                .reply_markup(help_back_keyboard())
                .await?;
        }
        HelpTopicKind::Toggle => {
            let keyboard = InlineKeyboardMarkup::new(vec![
                vec![InlineKeyboardButton::callback("Toggle Reminder On/Off", "toggle_reminder")],
                vec![InlineKeyboardButton::callback("\u{1F519} Help Menu", "help")],
            ]);
            bot.edit_message_text(chat_id, message_id, topic.body)
                .reply_markup(keyboard)
                .await?;
        }
        HelpTopicKind::Input => {
            store.set_expectation(chat_id.0, Expectation::PasswordRecovery);
            bot.edit_message_text(chat_id, message_id, topic.body)
                .reply_markup(help_back_keyboard())
                .await?;
        }
        HelpTopicKind::Faq => {
            show_faq_menu(bot, chat_id, message_id).await?;
        }
    }
    Ok(())
}

/// Render the canned FAQ list
pub async fn show_faq_menu(bot: Bot, chat_id: ChatId, message_id: MessageId) -> Result<()> {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = content::FAQS
        .iter()
        .map(|entry| {
            vec![InlineKeyboardButton::callback(entry.question, format!("faq:{}", entry.key))]
        })
        .collect();
    rows.push(vec![InlineKeyboardButton::callback("Ask Another Question", "faq:custom")]);
    rows.push(vec![InlineKeyboardButton::callback("\u{1F519} Help Menu", "help")]);

    bot.edit_message_text(chat_id, message_id, "Select a question or ask your own:")
        .reply_markup(InlineKeyboardMarkup::new(rows))
        .await?;
    Ok(())
}

/// Open one FAQ entry, or arm the free-form question expectation
pub async fn handle_faq_entry(
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
    key: &str,
    store: SessionStore,
) -> Result<()> {
    if key == "custom" {
        store.set_expectation(chat_id.0, Expectation::FaqQuestion);
        bot.edit_message_text(chat_id, message_id, "Please type your question:")
            .reply_markup(help_back_keyboard())
            .await?;
        return Ok(());
    }

    match content::faq(key) {
        Some(entry) => {
            let keyboard = InlineKeyboardMarkup::new(vec![vec![
                InlineKeyboardButton::callback("\u{1F519} FAQ Menu", "faq"),
                InlineKeyboardButton::callback("\u{1F519} Help Menu", "help"),
            ]]);
            bot.edit_message_text(
                chat_id,
                message_id,
                format!("\u{2753} {}\n\n{}", entry.question, entry.answer),
            )
            .reply_markup(keyboard)
            .await?;
        }
        None => {
            bot.edit_message_text(chat_id, message_id, "FAQ not found.")
                .reply_markup(help_back_keyboard())
                .await?;
        }
    }
    Ok(())
}

/// Flip the daily-reminder setting
pub async fn handle_toggle_reminder(
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
    services: ServiceFactory,
) -> Result<()> {
    let enabled = services.user_service.toggle_alarm(chat_id.0).await?;
    let status = if enabled { "enabled" } else { "disabled" };

    bot.edit_message_text(chat_id, message_id, format!("Daily reminder {}.", status))
        .reply_markup(help_back_keyboard())
        .await?;
    Ok(())
}

/// AI boost copy with the external feature link
pub async fn handle_boost_ai(
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
    services: ServiceFactory,
) -> Result<()> {
    bot.edit_message_text(
        chat_id,
        message_id,
        format!(
            "\u{1F680} Boost with AI\n\nAccess AI-powered features to maximize your earnings: {}",
            services.settings.links.ai_boost_link
        ),
    )
    .reply_markup(menu_only_keyboard())
    .await?;
    Ok(())
}

/// Referral link and bonus copy
pub async fn handle_refer_friend(
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
    services: ServiceFactory,
) -> Result<()> {
    let me = bot.get_me().await?;
    let referral_link = format!(
        "https://t.me/{}?start=ref_{}",
        me.username.as_deref().unwrap_or_default(),
        chat_id.0
    );

    let text = format!(
        "\u{1F465} Refer a Friend and Earn Rewards!\n\n\
         Share your referral link with friends. For each friend who joins using your link, you earn $0.1. \
         If they register, you earn an additional $0.4 for Standard or $0.9 for X package.\n\n\
         Your referral link: {}",
        referral_link
    );
    bot.edit_message_text(chat_id, message_id, text)
        .reply_markup(help_back_keyboard())
        .await?;
    services.db.log_interaction(chat_id.0, "refer_friend").await;
    Ok(())
}

/// Withdrawal request; only allowed from a $30 balance upward
pub async fn handle_withdraw(
    bot: Bot,
    query_id: String,
    chat_id: ChatId,
    message_id: MessageId,
    username: Option<String>,
    services: ServiceFactory,
) -> Result<()> {
    let balance = services
        .user_service
        .find(chat_id.0)
        .await?
        .map(|user| user.balance)
        .unwrap_or(0.0);

    if balance < 30.0 {
        bot.answer_callback_query(query_id)
            .text("Your balance is less than $30.")
            .await?;
        return Ok(());
    }
    bot.answer_callback_query(query_id).await?;

    services
        .notification_service
        .notify_admin(format!(
            "Withdrawal request from @{} (chat_id: {})\nAmount: ${}",
            username.as_deref().unwrap_or("Unknown"),
            chat_id.0,
            balance
        ))
        .await?;

    bot.edit_message_text(
        chat_id,
        message_id,
        "Your withdrawal request has been sent to the admin. Please wait for processing.",
    )
    .reply_markup(menu_only_keyboard())
    .await?;
    Ok(())
}
