//! Message handlers module
//!
//! The flow router for free-form input. Text is routed by the sender's
//! pending expectation, falling back to the ledger's payment_status
//! (pending_details text is the four-line detail submission). Photos route
//! purely by expectation tag; anything unmatched is ignored.

use teloxide::{
    prelude::*,
    types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, Message},
    Bot,
};
use tracing::{debug, info, warn};

use crate::models::user::PaymentStatus;
use crate::scheduler::ReminderScheduler;
use crate::services::ServiceFactory;
use crate::state::{Expectation, PendingApproval, SessionStore};
use crate::utils::errors::{EtherealError, Result};

use crate::handlers::callbacks::menu_only_keyboard;

fn sender_username(msg: &Message) -> String {
    msg.from
        .as_ref()
        .and_then(|user| user.username.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Handle incoming text messages
pub async fn handle_message(
    bot: Bot,
    msg: Message,
    services: ServiceFactory,
    store: SessionStore,
) -> Result<()> {
    let Some(text) = msg.text().map(str::to_string) else {
        return Ok(());
    };
    let chat_id = msg.chat.id;

    services.db.log_interaction(chat_id.0, "text_message").await;
    debug!(chat_id = ?chat_id, expectation = ?store.expectation(chat_id.0), "Routing text message");

    match store.expectation(chat_id.0) {
        Some(Expectation::CouponQuantity) => {
            handle_coupon_quantity(bot, chat_id, &text, store).await?;
        }
        Some(Expectation::OtherCountry) => {
            services
                .notification_service
                .notify_admin(format!(
                    "User @{} (chat_id: {}) requested registration for country: {}",
                    sender_username(&msg),
                    chat_id.0,
                    text.trim()
                ))
                .await?;
            store.clear_expectation(chat_id.0);

            bot.send_message(
                chat_id,
                "Your request has been sent to the admin. Please contact @bigscottmedia to complete your registration.",
            )
            .reply_markup(menu_only_keyboard())
            .await?;
        }
        Some(Expectation::FaqQuestion) => {
            services
                .notification_service
                .notify_admin(format!(
                    "FAQ from @{} (chat_id: {}): {}",
                    sender_username(&msg),
                    chat_id.0,
                    text
                ))
                .await?;
            store.clear_expectation(chat_id.0);
            bot.send_message(chat_id, "Thank you! We'll get back to you soon.").await?;
        }
        Some(Expectation::PasswordRecovery) => {
            handle_password_recovery(bot, chat_id, &text, &services, &store).await?;
        }
        Some(Expectation::SupportMessage) => {
            services
                .notification_service
                .notify_admin(format!(
                    "Support request from @{} (chat_id: {}): {}",
                    sender_username(&msg),
                    chat_id.0,
                    text
                ))
                .await?;
            store.clear_expectation(chat_id.0);
            bot.send_message(chat_id, "Thank you! Our support team will get back to you soon.")
                .await?;
        }
        Some(Expectation::BroadcastMessage) if services.is_admin(chat_id.0) => {
            let recipients = services.db.users.registered_ids().await?;
            let outcome = services.notification_service.broadcast(
                &recipients,
                &format!("\u{1F4E2} Broadcast: {}", text),
            )
            .await;
            store.clear_expectation(chat_id.0);

            bot.send_message(chat_id, format!("Broadcast sent to {} users.", outcome.sent))
                .await?;
        }
        Some(Expectation::CouponCodes { payment_id }) if services.is_admin(chat_id.0) => {
            handle_coupon_codes(bot, chat_id, payment_id, &text, &services, &store).await?;
        }
        Some(Expectation::UserCredentials { for_user }) if services.is_admin(chat_id.0) => {
            handle_user_credentials(bot, chat_id, for_user, &text, &services, &store).await?;
        }
        Some(expectation) if expectation.accepts_photo() => {
            // A screenshot is pending; free text neither satisfies nor
            // clears the expectation
            debug!(chat_id = ?chat_id, tag = expectation.tag(), "Text ignored, awaiting photo");
        }
        Some(_) | None => {
            // No usable expectation: fall back to the ledger status
            if services.user_service.status(chat_id.0).await? == Some(PaymentStatus::PendingDetails)
            {
                handle_details_submission(bot, msg, &text, &services).await?;
            }
        }
    }

    Ok(())
}

/// Coupon quantity input: positive integer or re-prompt
async fn handle_coupon_quantity(
    bot: Bot,
    chat_id: ChatId,
    text: &str,
    store: SessionStore,
) -> Result<()> {
    let quantity = match text.trim().parse::<i32>() {
        Ok(quantity) if quantity > 0 => quantity,
        _ => {
            // Invalid input: re-prompt, expectation stays armed
            bot.send_message(chat_id, "Please enter a valid positive integer.").await?;
            return Ok(());
        }
    };

    store.with_session(chat_id.0, |session| {
        session.coupon_quantity = Some(quantity);
        session.clear_expectation();
    });

    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("Standard (\u{20A6}9,000)", "coupon_pkg:standard")],
        vec![InlineKeyboardButton::callback("X (\u{20A6}14,000)", "coupon_pkg:x")],
        vec![InlineKeyboardButton::callback("\u{1F519} Main Menu", "menu")],
    ]);
    bot.send_message(chat_id, "Select the package for your coupons:")
        .reply_markup(keyboard)
        .await?;
    Ok(())
}

/// Password recovery email input
async fn handle_password_recovery(
    bot: Bot,
    chat_id: ChatId,
    text: &str,
    services: &ServiceFactory,
    store: &SessionStore,
) -> Result<()> {
    match services.user_service.recover_password(chat_id.0, text.trim()).await? {
        Some((user, new_password)) => {
            bot.send_message(
                chat_id,
                format!(
                    "Your password has been reset.\nNew Password: {}\nKeep it safe and use 'Password Recovery' if needed again.",
                    new_password
                ),
            )
            .await?;
            services
                .notification_service
                .notify_admin(format!(
                    "Password reset for @{} (chat_id: {}, email: {})",
                    user.username.as_deref().unwrap_or("Unknown"),
                    chat_id.0,
                    user.email.as_deref().unwrap_or("Unknown")
                ))
                .await?;
        }
        None => {
            bot.send_message(
                chat_id,
                "No account found with that email or you are not fully registered. Please try again or contact @bigscottmedia.",
            )
            .await?;
        }
    }

    store.clear_expectation(chat_id.0);
    Ok(())
}

/// Admin's newline-separated coupon codes for an approved payment
async fn handle_coupon_codes(
    bot: Bot,
    admin_chat: ChatId,
    payment_id: i64,
    text: &str,
    services: &ServiceFactory,
    store: &SessionStore,
) -> Result<()> {
    let codes = match services.payment_service.submit_codes(payment_id, text).await {
        Ok(codes) => codes,
        Err(EtherealError::InvalidInput(reason)) => {
            bot.send_message(admin_chat, reason).await?;
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let payment = services
        .payment_service
        .find(payment_id)
        .await?
        .ok_or(EtherealError::PaymentNotFound { payment_id })?;

    // Codes are delivered verbatim, one per line, in submission order
    bot.send_message(
        ChatId(payment.chat_id),
        format!(
            "\u{1F389} Your coupon purchase is approved!\n\nHere are your coupons:\n{}",
            codes.join("\n")
        ),
    )
    .await?;

    store.clear_expectation(admin_chat.0);
    bot.send_message(admin_chat, "Coupons sent to the user successfully.").await?;
    Ok(())
}

/// Admin's two-line credential message finalizing a registration
async fn handle_user_credentials(
    bot: Bot,
    admin_chat: ChatId,
    for_user: i64,
    text: &str,
    services: &ServiceFactory,
    store: &SessionStore,
) -> Result<()> {
    let issue = match services.user_service.issue_credentials(for_user, text).await {
        Ok(issue) => issue,
        Err(EtherealError::InvalidInput(_)) => {
            // Malformed submission: re-prompt, expectation stays armed
            bot.send_message(admin_chat, "Please send username and password in two lines.")
                .await?;
            return Ok(());
        }
        Err(EtherealError::UserNotFound { .. }) => {
            store.clear_expectation(admin_chat.0);
            bot.send_message(admin_chat, format!("User {} not found.", for_user)).await?;
            return Ok(());
        }
        Err(e) => return Err(e),
    };
    info!(chat_id = for_user, referral_credited = issue.referral_credited, "Registration finalized");

    let recap_keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "\u{1F389} My Registration Details",
        "user_registered",
    )]]);
    bot.send_message(
        ChatId(for_user),
        format!(
            "\u{1F389} Registration successful! Your username is\n {}\n and password is\n {}\n\n Join the group using the link below to keep up with info:\n {}",
            issue.username, issue.password, services.settings.links.group_link
        ),
    )
    .reply_markup(recap_keyboard)
    .await?;

    let user = &issue.user;
    let mut coach_name = "None".to_string();
    if let Some(coach_id) = user.selected_coach {
        if let Some(coach) = services.db.coaches.find(coach_id).await? {
            coach_name = coach.name;
            bot.send_message(
                ChatId(coach_id),
                format!(
                    "New registration under your coaching:\nUser ID: {}\nUsername: {}\nPackage: {}\nEmail: {}\nName: {}\nPhone: {}",
                    for_user,
                    issue.username,
                    user.package.map(|p| p.as_str()).unwrap_or("None"),
                    user.email.as_deref().unwrap_or("Unknown"),
                    user.name.as_deref().unwrap_or("Unknown"),
                    user.phone.as_deref().unwrap_or("Unknown"),
                ),
            )
            .await?;
        }
    }

    services
        .notification_service
        .notify_admin(format!(
            "New registration:\nUser ID: {}\nUsername: {}\nPackage: {}\nEmail: {}\nName: {}\nPhone: {}\nCoach: {}",
            for_user,
            issue.username,
            user.package.map(|p| p.as_str()).unwrap_or("None"),
            user.email.as_deref().unwrap_or("Unknown"),
            user.name.as_deref().unwrap_or("Unknown"),
            user.phone.as_deref().unwrap_or("Unknown"),
            coach_name,
        ))
        .await?;

    bot.send_message(admin_chat, "Credentials set and sent to the user.").await?;

    // Reminder opt-in sets alarm_setting directly via buttons
    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("Yes, enable reminders", "reminders:on")],
        vec![InlineKeyboardButton::callback("No, disable reminders", "reminders:off")],
    ]);
    bot.send_message(
        ChatId(for_user),
        "Would you like to receive daily reminders to complete your tasks?",
    )
    .reply_markup(keyboard)
    .await?;

    store.clear(admin_chat.0);
    Ok(())
}

/// The pending_details fallback: free text with no expectation is the
/// four-line detail submission
async fn handle_details_submission(
    bot: Bot,
    msg: Message,
    text: &str,
    services: &ServiceFactory,
) -> Result<()> {
    let chat_id = msg.chat.id;

    let details = match services.user_service.submit_details(chat_id.0, text).await {
        Ok(details) => details,
        Err(EtherealError::InvalidInput(reason)) => {
            // Validation failure: no state change, user just resends
            bot.send_message(chat_id, format!("\u{2757}\u{FE0F} {}", reason)).await?;
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let package = services
        .user_service
        .find(chat_id.0)
        .await?
        .and_then(|user| user.package);

    let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "Finalize Registration",
        format!("finalize:{}", chat_id.0),
    )]]);
    services.notification_service.notify_admin_with_keyboard(
        format!(
            "\u{1F195} User Details Received:\nUser ID: {}\nUsername: {}\nPackage: {}\nEmail: {}\nName: {}\nPhone: {}\n\nPlease finalize registration by providing credentials.",
            chat_id.0,
            details.username,
            package.map(|p| p.as_str()).unwrap_or("None"),
            details.email,
            details.full_name,
            details.phone,
        ),
        keyboard,
    )
    .await?;

    bot.send_message(chat_id, "\u{2705} Details received! Awaiting admin finalization.")
        .reply_markup(menu_only_keyboard())
        .await?;
    Ok(())
}

/// Handle incoming photos, routed purely by expectation tag
pub async fn handle_photo(
    bot: Bot,
    msg: Message,
    services: ServiceFactory,
    store: SessionStore,
    scheduler: ReminderScheduler,
) -> Result<()> {
    let chat_id = msg.chat.id;

    let Some(expectation) = store.expectation(chat_id.0) else {
        // Photos with no matching expectation are ignored
        return Ok(());
    };
    if !expectation.accepts_photo() {
        return Ok(());
    }

    let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) else {
        return Ok(());
    };
    let photo_file = photo.file.id.clone();
    let username = sender_username(&msg);
    let admin_chat = ChatId(services.settings.bot.admin_id);

    match expectation {
        Expectation::RegScreenshot => {
            services.db.users.set_screenshot_uploaded(chat_id.0).await?;

            let mut coach_name = "None".to_string();
            if let Some(user) = services.user_service.find(chat_id.0).await? {
                if let Some(coach_id) = user.selected_coach {
                    if let Some(coach) = services.db.coaches.find(coach_id).await? {
                        coach_name = coach.name;
                    }
                }
            }

            let keyboard = InlineKeyboardMarkup::new(vec![
                vec![InlineKeyboardButton::callback("Approve", format!("approve:reg:{}", chat_id.0))],
                vec![InlineKeyboardButton::callback("Pending", format!("pending:reg:{}", chat_id.0))],
            ]);
            bot.send_photo(admin_chat, InputFile::file_id(photo_file))
                .caption(format!(
                    "\u{1F4F8} Registration Payment from @{} (chat_id: {})\nSelected Coach: {}",
                    username, chat_id.0, coach_name
                ))
                .reply_markup(keyboard)
                .await?;

            bot.send_message(chat_id, "\u{2705} Screenshot received! Awaiting admin approval.")
                .await?;

            store.with_session(chat_id.0, |session| {
                session.waiting_approval = Some(PendingApproval::Registration);
                session.clear_expectation();
            });
            scheduler.schedule_registration_reminder(chat_id.0);
        }
        Expectation::CouponScreenshot => {
            let payment_id = store
                .peek(chat_id.0, |session| match session.waiting_approval {
                    Some(PendingApproval::Coupon { payment_id }) => Some(payment_id),
                    _ => None,
                })
                .flatten();
            let Some(payment_id) = payment_id else {
                warn!(chat_id = ?chat_id, "Coupon screenshot without an open payment");
                store.clear_expectation(chat_id.0);
                bot.send_message(chat_id, "Please start the coupon purchase again.").await?;
                return Ok(());
            };

            let keyboard = InlineKeyboardMarkup::new(vec![
                vec![InlineKeyboardButton::callback("Approve", format!("approve:coupon:{}", payment_id))],
                vec![InlineKeyboardButton::callback("Pending", format!("pending:coupon:{}", payment_id))],
            ]);
            bot.send_photo(admin_chat, InputFile::file_id(photo_file))
                .caption(format!(
                    "\u{1F4F8} Coupon Payment from @{} (chat_id: {})",
                    username, chat_id.0
                ))
                .reply_markup(keyboard)
                .await?;

            bot.send_message(chat_id, "\u{2705} Screenshot received! Awaiting admin approval.")
                .await?;

            store.clear_expectation(chat_id.0);
            scheduler.schedule_coupon_reminder(payment_id);
        }
        Expectation::TaskScreenshot { task_id } => {
            let keyboard = InlineKeyboardMarkup::new(vec![
                vec![InlineKeyboardButton::callback(
                    "Approve",
                    format!("approve:task:{}:{}", task_id, chat_id.0),
                )],
                vec![InlineKeyboardButton::callback(
                    "Reject",
                    format!("reject:task:{}:{}", task_id, chat_id.0),
                )],
            ]);
            bot.send_photo(admin_chat, InputFile::file_id(photo_file))
                .caption(format!(
                    "Task #{} verification from @{} (chat_id: {})",
                    task_id, username, chat_id.0
                ))
                .reply_markup(keyboard)
                .await?;

            bot.send_message(chat_id, "Screenshot received. Awaiting admin approval.").await?;
            store.clear_expectation(chat_id.0);
        }
        _ => unreachable!("accepts_photo covers exactly the screenshot expectations"),
    }

    services.db.log_interaction(chat_id.0, "photo_upload").await;
    Ok(())
}

/// Read-only sub-commands on the designated broadcast channel
pub async fn handle_channel_post(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    match text.trim() {
        "/help" => {
            bot.send_message(msg.chat.id, "Help message for channel members.").await?;
        }
        "/stats" => {
            bot.send_message(msg.chat.id, "Channel stats coming soon!").await?;
        }
        "/my_users" => {
            let report = services.reporting_service.my_users_report(msg.chat.id.0).await?;
            match report {
                Some(report) => bot.send_message(msg.chat.id, report).await?,
                None => bot.send_message(msg.chat.id, "You have no registered users.").await?,
            };
        }
        _ => {}
    }
    Ok(())
}
