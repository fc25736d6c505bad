//! Start, menu and user-facing command handlers
//!
//! Entry points for /start (first contact + referral credit), the main
//! menu, the personal stats card, /reset and /support.

use teloxide::{
    prelude::*,
    types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, Message},
    Bot,
};
use tracing::{debug, info};

use crate::content;
use crate::models::user::{Package, PaymentStatus};
use crate::services::ServiceFactory;
use crate::state::{Expectation, SessionStore};
use crate::utils::errors::Result;
use crate::utils::helpers;

/// Handle /start - first contact, referral credit and welcome copy
pub async fn handle_start(
    bot: Bot,
    msg: Message,
    arg: String,
    services: ServiceFactory,
    store: SessionStore,
) -> Result<()> {
    let user = msg.from.as_ref().ok_or_else(|| {
        crate::utils::errors::EtherealError::InvalidInput("No user in message".to_string())
    })?;

    let chat_id = msg.chat.id;
    let referred_by = helpers::parse_referral_arg(arg.trim());

    debug!(chat_id = ?chat_id, referred_by = ?referred_by, "Processing /start command");
    services.db.log_interaction(chat_id.0, "start").await;

    services
        .user_service
        .register_or_get(chat_id.0, user.username.clone(), referred_by)
        .await?;

    // Fresh /start always abandons any half-finished flow
    store.clear(chat_id.0);

    let me = bot.get_me().await?;
    let referral_link = format!(
        "https://t.me/{}?start=ref_{}",
        me.username.as_deref().unwrap_or_default(),
        chat_id.0
    );

    let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "\u{1F680} Proceed",
        "menu",
    )]]);
    bot.send_message(chat_id, content::welcome_text(&referral_link))
        .reply_markup(keyboard)
        .await?;

    // Escape hatch for users stuck mid-flow
    let mut reply_keyboard = KeyboardMarkup::new(vec![vec![KeyboardButton::new("/menu")]]);
    reply_keyboard.resize_keyboard = true;
    bot.send_message(chat_id, "Use the button below 'ONLY' if you get stuck on a process:")
        .reply_markup(reply_keyboard)
        .await?;

    info!(chat_id = ?chat_id, "Start handled");
    Ok(())
}

/// Render the status-dependent main menu
pub async fn main_menu_view(
    services: &ServiceFactory,
    chat_id: i64,
) -> Result<(String, InlineKeyboardMarkup)> {
    let user = services.user_service.find(chat_id).await?;

    let keyboard = match &user {
        Some(user) if user.payment_status == PaymentStatus::Registered => {
            let mut rows = vec![
                vec![InlineKeyboardButton::callback("\u{1F4CA} My Stats", "stats")],
                vec![InlineKeyboardButton::callback("Do Daily Tasks", "daily_tasks")],
                vec![InlineKeyboardButton::callback("\u{1F4B0} Earn Extra for the Day", "earn_extra")],
                vec![InlineKeyboardButton::callback("Purchase Coupon", "coupon")],
                vec![InlineKeyboardButton::callback("\u{2753} Help", "help")],
            ];
            if user.package == Some(Package::X) {
                rows.insert(1, vec![InlineKeyboardButton::callback("\u{1F680} Boost with AI", "boost_ai")]);
            }
            InlineKeyboardMarkup::new(rows)
        }
        _ => InlineKeyboardMarkup::new(vec![
            vec![InlineKeyboardButton::callback("How It Works", "how_it_works")],
            vec![InlineKeyboardButton::callback("Purchase Coupon", "coupon")],
            vec![InlineKeyboardButton::callback("\u{1F4B8} Register & Make Payment", "package_selector")],
            vec![InlineKeyboardButton::callback("\u{2753} Help", "help")],
        ]),
    };

    Ok(("Select an option below:".to_string(), keyboard))
}

/// Handle /menu - clears the session and shows the main menu
pub async fn handle_menu(
    bot: Bot,
    msg: Message,
    services: ServiceFactory,
    store: SessionStore,
) -> Result<()> {
    let chat_id = msg.chat.id;
    store.clear(chat_id.0);
    services.db.log_interaction(chat_id.0, "show_main_menu").await;

    let (text, keyboard) = main_menu_view(&services, chat_id.0).await?;
    bot.send_message(chat_id, text).reply_markup(keyboard).await?;
    Ok(())
}

/// Render the personal stats card; None when the user has no row yet
pub async fn stats_view(
    services: &ServiceFactory,
    chat_id: i64,
) -> Result<Option<(String, InlineKeyboardMarkup)>> {
    let user = match services.user_service.find(chat_id).await? {
        Some(user) => user,
        None => return Ok(None),
    };

    let text = format!(
        "\u{1F4CA} Your Platform Stats:\n\n\
         \u{2022} Package: {}\n\
         \u{2022} Payment Status: {}\n\
         \u{2022} Streaks: {}\n\
         \u{2022} Invites: {}\n\
         \u{2022} Balance: ${:.2}",
        user.package.map(|p| p.as_str()).unwrap_or("Not selected"),
        user.payment_status,
        user.streaks,
        user.invites,
        user.balance
    );

    let keyboard = if user.balance >= 30.0 {
        InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
            "\u{1F4B8} Withdraw",
            "withdraw",
        )]])
    } else {
        InlineKeyboardMarkup::new(Vec::<Vec<InlineKeyboardButton>>::new())
    };

    Ok(Some((text, keyboard)))
}

/// Handle /stats
pub async fn handle_stats(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let chat_id = msg.chat.id;
    services.db.log_interaction(chat_id.0, "stats").await;

    match stats_view(&services, chat_id.0).await? {
        Some((text, keyboard)) => {
            bot.send_message(chat_id, text).reply_markup(keyboard).await?;
        }
        None => {
            bot.send_message(chat_id, "No user data found. Please start with /start.")
                .await?;
        }
    }

    Ok(())
}

/// Handle /reset - drop any in-flight conversation state
pub async fn handle_reset(
    bot: Bot,
    msg: Message,
    services: ServiceFactory,
    store: SessionStore,
) -> Result<()> {
    let chat_id = msg.chat.id;
    store.clear(chat_id.0);
    services.db.log_interaction(chat_id.0, "reset_state").await;

    bot.send_message(chat_id, "State reset. Try the flow again.").await?;
    Ok(())
}

/// Handle /support - next text message is relayed to the admin
pub async fn handle_support(
    bot: Bot,
    msg: Message,
    services: ServiceFactory,
    store: SessionStore,
) -> Result<()> {
    let chat_id = msg.chat.id;
    store.set_expectation(chat_id.0, Expectation::SupportMessage);
    services.db.log_interaction(chat_id.0, "support_initiated").await;

    bot.send_message(chat_id, "Please describe your issue or question:").await?;
    Ok(())
}

/// Send the main menu to a chat without an inbound message (used after
/// flows that end outside a callback, e.g. the reminder opt-in)
pub async fn send_main_menu(bot: &Bot, services: &ServiceFactory, chat_id: i64) -> Result<()> {
    let (text, keyboard) = main_menu_view(services, chat_id).await?;
    bot.send_message(ChatId(chat_id), text).reply_markup(keyboard).await?;
    Ok(())
}
