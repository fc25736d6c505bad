//! Registration flow callback handlers
//!
//! package selection -> coach selection -> country/account selection ->
//! screenshot expectation -> admin approval -> detail collection ->
//! credential issuance. The ledger's payment_status carries the durable
//! state; the session only holds the pending expectation and scratch picks.

use teloxide::{
    prelude::*,
    types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId},
    Bot,
};
use tracing::{info, warn};

use crate::models::payment::PaymentState;
use crate::models::user::{Package, PaymentStatus};
use crate::scheduler::{ReminderKind, ReminderScheduler};
use crate::services::ServiceFactory;
use crate::state::{Expectation, PendingApproval, SessionStore};
use crate::utils::errors::Result;
use crate::utils::helpers;
use crate::content;

use super::menu_only_keyboard;

/// Package comparison copy behind the How-It-Works button
pub async fn handle_how_it_works(bot: Bot, chat_id: ChatId, message_id: MessageId) -> Result<()> {
    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("\u{1F48E}Get Started", "package_selector")],
        vec![InlineKeyboardButton::callback("\u{1F519} Main Menu", "menu")],
    ]);
    bot.edit_message_text(chat_id, message_id, content::HOW_IT_WORKS)
        .reply_markup(keyboard)
        .await?;
    Ok(())
}

/// Entry into the registration flow: choose a package
pub async fn handle_package_selector(
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
    services: ServiceFactory,
) -> Result<()> {
    if services.user_service.status(chat_id.0).await? == Some(PaymentStatus::Registered) {
        bot.send_message(chat_id, "You are already registered.").await?;
        return Ok(());
    }

    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("\u{1F680}X (\u{20A6}14,000)", "reg_pkg:x")],
        vec![InlineKeyboardButton::callback("\u{2708}\u{FE0F}Standard (\u{20A6}9,000)", "reg_pkg:standard")],
        vec![InlineKeyboardButton::callback("\u{1F519} Main Menu", "menu")],
    ]);
    bot.edit_message_text(chat_id, message_id, "Choose your package:")
        .reply_markup(keyboard)
        .await?;
    Ok(())
}

/// Package chosen: persist pending_payment and offer the coach roster
pub async fn handle_package_chosen(
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
    package_arg: &str,
    username: Option<String>,
    services: ServiceFactory,
    store: SessionStore,
) -> Result<()> {
    let package = match Package::from_str(package_arg) {
        Some(package) => package,
        None => {
            warn!(package_arg = package_arg, "Unknown package in callback");
            return Ok(());
        }
    };

    services
        .db
        .users
        .select_package(
            chat_id.0,
            package,
            username.as_deref(),
            &helpers::generate_referral_code(),
        )
        .await?;
    store.with_session(chat_id.0, |session| session.package = Some(package));

    let coaches = services.db.coaches.list().await?;
    if coaches.is_empty() {
        bot.edit_message_text(chat_id, message_id, "No coaches available. Please contact @bigscottmedia.")
            .await?;
        return Ok(());
    }

    let mut rows: Vec<Vec<InlineKeyboardButton>> = coaches
        .iter()
        .map(|coach| {
            vec![InlineKeyboardButton::callback(
                coach.name.clone(),
                format!("coach:{}", coach.coach_id),
            )]
        })
        .collect();
    rows.push(vec![InlineKeyboardButton::callback("\u{1F519} Main Menu", "menu")]);

    bot.edit_message_text(chat_id, message_id, "Select your coach:")
        .reply_markup(InlineKeyboardMarkup::new(rows))
        .await?;
    Ok(())
}

/// Country keyboard built from the active payment accounts
async fn country_keyboard(services: &ServiceFactory) -> Result<Option<InlineKeyboardMarkup>> {
    let accounts = services.db.accounts.list_active().await?;
    if accounts.is_empty() {
        return Ok(None);
    }

    let mut rows: Vec<Vec<InlineKeyboardButton>> = accounts
        .iter()
        .map(|account| {
            vec![InlineKeyboardButton::callback(
                account.label(),
                format!("country:{}", account.country),
            )]
        })
        .collect();
    rows.push(vec![InlineKeyboardButton::callback("Others", "country_other")]);
    rows.push(vec![InlineKeyboardButton::callback("\u{1F519} Main Menu", "menu")]);

    Ok(Some(InlineKeyboardMarkup::new(rows)))
}

/// Coach chosen: record it and offer the payment countries
pub async fn handle_coach_selected(
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
    coach_id: i64,
    services: ServiceFactory,
) -> Result<()> {
    if services.db.coaches.find(coach_id).await?.is_none() {
        bot.edit_message_text(chat_id, message_id, "Coach not found. Please pick another.")
            .await?;
        return Ok(());
    }

    services.db.users.set_selected_coach(chat_id.0, coach_id).await?;

    match country_keyboard(&services).await? {
        Some(keyboard) => {
            bot.edit_message_text(chat_id, message_id, "Select your country for payment:")
                .reply_markup(keyboard)
                .await?;
        }
        None => {
            bot.edit_message_text(
                chat_id,
                message_id,
                "No active payment accounts available. Contact @bigscottmedia.",
            )
            .await?;
        }
    }
    Ok(())
}

/// Country chosen: render the account's payment details and expect the
/// screenshot. The user may still change country before paying.
pub async fn handle_country_selected(
    bot: Bot,
    chat_id: ChatId,
    country: &str,
    services: ServiceFactory,
    store: SessionStore,
) -> Result<()> {
    let account = match services.db.accounts.find_active_by_country(country).await? {
        Some(account) => account,
        None => {
            bot.send_message(chat_id, "Error: Invalid country. Contact @bigscottmedia.")
                .reply_markup(menu_only_keyboard())
                .await?;
            return Ok(());
        }
    };

    store.with_session(chat_id.0, |session| {
        session.selected_account = Some(account.country.clone());
        session.expect(Expectation::RegScreenshot);
    });

    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("Change Country", "country_menu")],
        vec![InlineKeyboardButton::callback("\u{1F519} Main Menu", "menu")],
    ]);
    bot.send_message(
        chat_id,
        format!(
            "Payment details for {}:\n\n{}\n\nPlease make the payment and send the screenshot.",
            account.country, account.details
        ),
    )
    .reply_markup(keyboard)
    .await?;
    Ok(())
}

/// Re-show the country list (the "Change Country" path)
pub async fn show_country_selection(
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
    services: ServiceFactory,
    store: SessionStore,
) -> Result<()> {
    let has_package = store.peek(chat_id.0, |session| session.package.is_some()).unwrap_or(false);
    if !has_package {
        bot.edit_message_text(chat_id, message_id, "Please select a package first.")
            .reply_markup(menu_only_keyboard())
            .await?;
        return Ok(());
    }

    if let Some(keyboard) = country_keyboard(&services).await? {
        bot.edit_message_text(chat_id, message_id, "Select your country for payment:")
            .reply_markup(keyboard)
            .await?;
    } else {
        bot.edit_message_text(
            chat_id,
            message_id,
            "No active payment accounts available. Contact @bigscottmedia.",
        )
        .await?;
    }
    Ok(())
}

/// The "Others" path: free-text country relayed to the admin
pub async fn handle_other_country(
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
    store: SessionStore,
) -> Result<()> {
    store.set_expectation(chat_id.0, Expectation::OtherCountry);

    let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "\u{1F519} Country Selection",
        "country_menu",
    )]]);
    bot.edit_message_text(chat_id, message_id, "Please enter your country:")
        .reply_markup(keyboard)
        .await?;
    Ok(())
}

/// Admin approved the registration screenshot: pending_payment -> pending_details
pub async fn handle_approve_registration(
    bot: Bot,
    admin_chat: ChatId,
    message_id: MessageId,
    user_chat_id: i64,
    services: ServiceFactory,
    scheduler: ReminderScheduler,
) -> Result<()> {
    services.db.users.approve_registration(user_chat_id).await?;
    scheduler.cancel(ReminderKind::RegistrationPayment, user_chat_id);
    info!(chat_id = user_chat_id, "Registration payment approved");

    bot.send_message(
        ChatId(user_chat_id),
        "\u{2705} Your payment is approved!\n\nKINDLY \u{1F3AF} SEND YOUR DETAILS FOR YOUR REGISTRATION\n\
         \u{27A1}\u{FE0F} Email address\n\u{27A1}\u{FE0F} Full name\n\u{27A1}\u{FE0F} Username (e.g. @you)\n\u{27A1}\u{FE0F} Phone number (with your country code)\n\n\
         All in one message, each on its own line as seen.",
    )
    .await?;

    bot.edit_message_text(admin_chat, message_id, "Payment approved. Waiting for user details.")
        .await?;
    Ok(())
}

/// Admin pressed Pending: just tell the user to wait
pub async fn handle_pending_registration(bot: Bot, user_chat_id: i64) -> Result<()> {
    bot.send_message(
        ChatId(user_chat_id),
        "Your payment is still being reviewed. Please check back later.",
    )
    .await?;
    Ok(())
}

/// Admin pressed Finalize after the details came in: expect the two-line
/// credential message next
pub async fn handle_finalize(
    bot: Bot,
    admin_chat: ChatId,
    message_id: MessageId,
    user_chat_id: i64,
    store: SessionStore,
) -> Result<()> {
    store.set_expectation(admin_chat.0, Expectation::UserCredentials { for_user: user_chat_id });

    bot.send_message(
        admin_chat,
        format!(
            "Please send the username and password for user {} in the format:\nusername\npassword",
            user_chat_id
        ),
    )
    .await?;
    bot.edit_message_text(admin_chat, message_id, "Waiting for user credentials.")
        .await?;
    Ok(())
}

/// Check-approval button: report progress from the ledger, never the session
pub async fn handle_check_approval(
    bot: Bot,
    chat_id: ChatId,
    services: ServiceFactory,
    store: SessionStore,
) -> Result<()> {
    let waiting = store.peek(chat_id.0, |session| session.waiting_approval).flatten();

    let Some(waiting) = waiting else {
        bot.send_message(chat_id, "You have no pending payments.").await?;
        return Ok(());
    };

    match waiting {
        PendingApproval::Registration => {
            let text = match services.user_service.status(chat_id.0).await? {
                Some(PaymentStatus::PendingDetails) => "Payment approved. Please send your details.",
                Some(PaymentStatus::Registered) => "Your registration is complete.",
                _ => "Your payment is being reviewed.",
            };
            bot.send_message(chat_id, text).await?;
        }
        PendingApproval::Coupon { payment_id } => {
            let approved = services
                .payment_service
                .find(payment_id)
                .await?
                .map(|payment| payment.status == PaymentState::Approved)
                .unwrap_or(false);

            let text = if approved {
                "Coupon payment approved. Check your coupons above."
            } else {
                "Your coupon payment is being reviewed."
            };
            bot.send_message(chat_id, text).await?;
        }
    }
    Ok(())
}

/// Post-registration reminder opt-in buttons set the alarm directly
pub async fn handle_reminder_optin(
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
    enabled: bool,
    services: ServiceFactory,
) -> Result<()> {
    services.user_service.set_alarm(chat_id.0, enabled).await?;

    let text = if enabled {
        "\u{2705} Daily reminders enabled!"
    } else {
        "\u{274C} Okay, daily reminders not set."
    };
    bot.edit_message_text(chat_id, message_id, text)
        .reply_markup(menu_only_keyboard())
        .await?;
    Ok(())
}

/// Re-render the registration recap with site link and credentials
pub async fn handle_registration_recap(
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
    services: ServiceFactory,
) -> Result<()> {
    match services.user_service.find(chat_id.0).await? {
        Some(user) if user.payment_status == PaymentStatus::Registered => {
            let text = format!(
                "\u{1F389} Registration Complete!\n\n\
                 \u{2022} Site: {}\n\
                 \u{2022} Username: {}\n\
                 \u{2022} Email: {}\n\
                 \u{2022} Password: {}\n\n\
                 Keep your credentials safe. Use 'Password Recovery' in the Help menu if needed.",
                services.settings.links.site_link,
                user.username.as_deref().unwrap_or("Unknown"),
                user.email.as_deref().unwrap_or("Unknown"),
                user.password.as_deref().unwrap_or("Unknown"),
            );
            bot.edit_message_text(chat_id, message_id, text)
                .reply_markup(menu_only_keyboard())
                .await?;
        }
        _ => {
            bot.edit_message_text(chat_id, message_id, "No registration data found.")
                .reply_markup(menu_only_keyboard())
                .await?;
        }
    }
    Ok(())
}
