//! Coupon purchase callback handlers
//!
//! quantity -> package -> payment account -> screenshot expectation ->
//! admin approval -> code issuance -> delivery.

use teloxide::{
    prelude::*,
    types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId},
    Bot,
};
use tracing::{info, warn};

use crate::models::user::Package;
use crate::scheduler::{ReminderKind, ReminderScheduler};
use crate::services::ServiceFactory;
use crate::state::{Expectation, PendingApproval, SessionStore};
use crate::utils::errors::{EtherealError, Result};

use super::menu_only_keyboard;

/// Start the coupon flow: expect a quantity
pub async fn handle_coupon_start(
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
    store: SessionStore,
) -> Result<()> {
    store.with_session(chat_id.0, |session| {
        // A fresh purchase discards any half-finished one
        session.coupon_quantity = None;
        session.coupon_package = None;
        session.selected_account = None;
        session.expect(Expectation::CouponQuantity);
    });

    bot.edit_message_text(chat_id, message_id, "How many coupons do you want to purchase?")
        .reply_markup(menu_only_keyboard())
        .await?;
    Ok(())
}

/// Account keyboard built from the active payment accounts
async fn account_keyboard(services: &ServiceFactory) -> Result<Option<InlineKeyboardMarkup>> {
    let accounts = services.db.accounts.list_active().await?;
    if accounts.is_empty() {
        return Ok(None);
    }

    let mut rows: Vec<Vec<InlineKeyboardButton>> = accounts
        .iter()
        .map(|account| {
            vec![InlineKeyboardButton::callback(
                account.label(),
                format!("coupon_account:{}", account.country),
            )]
        })
        .collect();
    rows.push(vec![InlineKeyboardButton::callback("\u{1F519} Main Menu", "menu")]);

    Ok(Some(InlineKeyboardMarkup::new(rows)))
}

/// Package chosen for the coupons: show total and the account choices
pub async fn handle_coupon_package(
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
            warn!(package_arg = package_arg, "Unknown coupon package in callback");
            return Ok(());
        }
    };

    let quantity = store.peek(chat_id.0, |session| session.coupon_quantity).flatten();
    let Some(quantity) = quantity else {
        bot.edit_message_text(chat_id, message_id, "Please start the coupon purchase again.")
            .reply_markup(menu_only_keyboard())
            .await?;
        return Ok(());
    };

    store.with_session(chat_id.0, |session| session.coupon_package = Some(package));
    let total = quantity as i64 * package.unit_price();

    services
        .notification_service
        .notify_admin(format!(
            "User @{} (chat_id: {}) wants to purchase {} {} coupons for \u{20A6}{}.",
            username.as_deref().unwrap_or("Unknown"),
            chat_id.0,
            quantity,
            package,
            total
        ))
        .await?;

    match account_keyboard(&services).await? {
        Some(keyboard) => {
            bot.edit_message_text(
                chat_id,
                message_id,
                format!(
                    "You are purchasing {} {} coupons.\nTotal amount: \u{20A6}{}\n\n\
                     Select the account to pay to:\n\n\
                     For coupon payment accounts in other countries not listed, contact @bigscottmedia",
                    quantity, package, total
                ),
            )
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

/// Account chosen: open the payment record and expect the screenshot
pub async fn handle_account_selected(
    bot: Bot,
    chat_id: ChatId,
    country: &str,
    services: ServiceFactory,
    store: SessionStore,
) -> Result<()> {
    let account = match services.db.accounts.find_active_by_country(country).await? {
        Some(account) => account,
        None => {
            bot.send_message(chat_id, "Error: Invalid account. Contact @bigscottmedia.")
                .reply_markup(menu_only_keyboard())
                .await?;
            return Ok(());
        }
    };

    let scratch = store
        .peek(chat_id.0, |session| (session.coupon_quantity, session.coupon_package))
        .unwrap_or((None, None));
    let (Some(quantity), Some(package)) = scratch else {
        bot.send_message(chat_id, "Please start the coupon purchase again.")
            .reply_markup(menu_only_keyboard())
            .await?;
        return Ok(());
    };

    let payment = services
        .payment_service
        .create_coupon_purchase(chat_id.0, package, quantity, account.country.clone())
        .await?;

    store.with_session(chat_id.0, |session| {
        session.selected_account = Some(account.country.clone());
        session.waiting_approval = Some(PendingApproval::Coupon { payment_id: payment.id });
        session.expect(Expectation::CouponScreenshot);
    });

    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("Change Account", "coupon_account_menu")],
        vec![InlineKeyboardButton::callback("\u{1F519} Main Menu", "menu")],
    ]);
    bot.send_message(
        chat_id,
        format!(
            "Payment details:\n\n{}\n\nPlease make the payment and send the screenshot.",
            account.details
        ),
    )
    .reply_markup(keyboard)
    .await?;
    Ok(())
}

/// Re-show the account list (the "Change Account" path)
pub async fn show_account_selection(
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
    services: ServiceFactory,
    store: SessionStore,
) -> Result<()> {
    let scratch = store
        .peek(chat_id.0, |session| (session.coupon_quantity, session.coupon_package))
        .unwrap_or((None, None));
    let (Some(quantity), Some(package)) = scratch else {
        bot.edit_message_text(chat_id, message_id, "Please start the coupon purchase again.")
            .reply_markup(menu_only_keyboard())
            .await?;
        return Ok(());
    };

    if let Some(keyboard) = account_keyboard(&services).await? {
        bot.edit_message_text(
            chat_id,
            message_id,
            format!(
                "You are purchasing {} {} coupons.\nTotal amount: \u{20A6}{}\n\nSelect the account to pay to:",
                quantity,
                package,
                quantity as i64 * package.unit_price()
            ),
        )
        .reply_markup(keyboard)
        .await?;
    }
    Ok(())
}

/// Admin approved the coupon payment: expect the code lines next
pub async fn handle_approve_payment(
    bot: Bot,
    admin_chat: ChatId,
    message_id: MessageId,
    payment_id: i64,
    services: ServiceFactory,
    store: SessionStore,
    scheduler: ReminderScheduler,
) -> Result<()> {
    match services.payment_service.approve(payment_id).await {
        Ok(_) => {}
        Err(EtherealError::PaymentNotFound { .. }) => {
            bot.edit_message_text(admin_chat, message_id, "Payment not found.").await?;
            return Ok(());
        }
        Err(e) => return Err(e),
    }
    scheduler.cancel(ReminderKind::CouponPayment, payment_id);
    info!(payment_id = payment_id, "Coupon payment approved by admin");

    store.set_expectation(admin_chat.0, Expectation::CouponCodes { payment_id });

    bot.send_message(
        admin_chat,
        format!("Payment {} approved. Please send the coupon codes (one per line).", payment_id),
    )
    .await?;
    bot.edit_message_text(admin_chat, message_id, "Payment approved. Waiting for coupon codes.")
        .await?;
    Ok(())
}

/// Admin pressed Pending on a coupon payment: tell the purchaser to wait
pub async fn handle_pending_payment(bot: Bot, payment_id: i64, services: ServiceFactory) -> Result<()> {
    match services.payment_service.find(payment_id).await? {
        Some(payment) => {
            bot.send_message(ChatId(payment.chat_id), "Your coupon payment is still being reviewed.")
                .await?;
        }
        None => warn!(payment_id = payment_id, "Pending pressed for unknown payment"),
    }
    Ok(())
}
