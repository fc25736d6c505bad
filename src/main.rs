//! EtherealBot Telegram Bot
//!
//! Main application entry point

use std::sync::Arc;
use chrono::{DateTime, Utc};
use teloxide::{prelude::*, types::Update};
use teloxide::dispatching::UpdateHandler;
use teloxide::utils::command::BotCommands as TeloxideBotCommands;
use tracing::{error, info, warn};

use EtherealBot::{
    config::Settings,
    database::{connection::create_pool, DatabaseService},
    handlers::{
        callbacks::handle_callback_query,
        commands::{admin, coach, start},
        messages::{handle_channel_post, handle_message, handle_photo},
    },
    scheduler::ReminderScheduler,
    services::ServiceFactory,
    state::{SessionStore, SessionStoreManager},
    utils::logging,
};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Process start time, used by /botstats
#[derive(Debug, Clone, Copy)]
struct BotStartTime(DateTime<Utc>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging
    logging::init_logging(&settings.logging)?;

    info!("Starting EtherealBot...");

    // Initialize database connection
    info!("Connecting to database...");
    let db_config = EtherealBot::database::connection::DatabaseConfig {
        url: settings.database.url.clone(),
        max_connections: settings.database.max_connections,
        min_connections: settings.database.min_connections,
        acquire_timeout: std::time::Duration::from_secs(30),
        idle_timeout: Some(std::time::Duration::from_secs(600)),
        max_lifetime: Some(std::time::Duration::from_secs(1800)),
    };
    let db_pool = create_pool(&db_config).await?;

    // Run database migrations
    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&db_pool).await?;

    // Initialize database service and seed the default coach
    let database_service = DatabaseService::new(db_pool);
    database_service.seed(settings.bot.admin_id).await?;

    // Initialize bot
    let bot = Bot::new(&settings.bot.token);

    // Initialize services
    info!("Initializing services...");
    let services = ServiceFactory::new(bot.clone(), settings.clone(), database_service.clone());

    // Initialize session store with idle sweeping
    let session_store = SessionStore::new();
    let mut store_manager = SessionStoreManager::new(
        session_store.clone(),
        std::time::Duration::from_secs(3600),
    );
    store_manager.start_sweeper();

    // Initialize the reminder scheduler and the daily clock jobs
    let scheduler = ReminderScheduler::new(bot.clone(), database_service, settings.clone());
    scheduler.spawn_daily_jobs();

    info!("Setting up bot handlers...");

    let services_arc = Arc::new(services);
    let store_arc = Arc::new(session_store);
    let scheduler_arc = Arc::new(scheduler);
    let started_at = BotStartTime(Utc::now());

    let handler = create_handler();

    let mut dispatcher = Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![
            services_arc,
            store_arc,
            scheduler_arc,
            started_at
        ])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd);
        })
        .enable_ctrlc_handler()
        .build();

    info!("EtherealBot is ready!");
    dispatcher.dispatch().await;

    info!("EtherealBot has been shut down.");
    Ok(())
}

/// Create the main update handler
fn create_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use teloxide::dispatching::UpdateFilterExt;

    dptree::entry()
        .branch(
            Update::filter_message()
                .branch(
                    // Handle commands
                    dptree::entry()
                        .filter_command::<BotCommand>()
                        .endpoint(handle_commands),
                )
                .branch(
                    // Handle photo submissions (screenshot expectations)
                    dptree::filter(|msg: Message| msg.photo().is_some()).endpoint(handle_photos),
                )
                .branch(
                    // Handle regular text messages
                    dptree::endpoint(handle_messages),
                ),
        )
        .branch(
            // Handle callback queries
            Update::filter_callback_query().endpoint(handle_callbacks),
        )
        .branch(
            // Handle the designated broadcast channel
            Update::filter_channel_post().endpoint(handle_channel_posts),
        )
}

#[derive(TeloxideBotCommands, Clone)]
#[command(rename_rule = "snake_case", description = "Ethereal Bot Commands")]
enum BotCommand {
    #[command(description = "Start the bot and get your referral link")]
    Start(String),
    #[command(description = "Show the main menu")]
    Menu,
    #[command(description = "Show your platform stats")]
    Stats,
    #[command(description = "Reset your current flow")]
    Reset,
    #[command(description = "Contact support")]
    Support,
    #[command(description = "Apply to be a coach")]
    Coach,
    #[command(description = "Broadcast to registered users (admin only)")]
    Broadcast,
    #[command(description = "Show bot statistics (admin only)")]
    Botstats,
    #[command(description = "List registered users (admin only)")]
    RegisteredUsers,
    #[command(description = "Add a task: /add_task <type> <link> <reward> (admin only)")]
    AddTask(String),
    #[command(description = "Add a coach: /addcoach <chat_id> (admin only)")]
    Addcoach(String),
    #[command(description = "List coaches (admin only)")]
    ListCoaches,
    #[command(description = "Remove a coach: /remove_coach <coach_id> (admin only)")]
    RemoveCoach(String),
    #[command(description = "Registration statistics (admin only)")]
    RegistrationStats,
    #[command(description = "List your registered users (coaches)")]
    MyUsers,
    #[command(description = "Add a payment account: /add_account <country> <flag> <details> (admin only)")]
    AddAccount(String),
    #[command(description = "Delete a payment account: /delete_account <country> (admin only)")]
    DeleteAccount(String),
    #[command(description = "List payment accounts (admin only)")]
    ListAccounts,
}

/// Handle bot commands
async fn handle_commands(
    bot: Bot,
    msg: Message,
    cmd: BotCommand,
    services: Arc<ServiceFactory>,
    store: Arc<SessionStore>,
    started_at: BotStartTime,
) -> HandlerResult {
    let services = (*services).clone();
    let store = (*store).clone();
    let chat_id = msg.chat.id;
    let b = bot.clone();

    let result = match cmd {
        BotCommand::Start(arg) => start::handle_start(b, msg, arg, services, store).await,
        BotCommand::Menu => start::handle_menu(b, msg, services, store).await,
        BotCommand::Stats => start::handle_stats(b, msg, services).await,
        BotCommand::Reset => start::handle_reset(b, msg, services, store).await,
        BotCommand::Support => start::handle_support(b, msg, services, store).await,
        BotCommand::Coach => coach::handle_apply_coach(b, msg, services).await,
        BotCommand::Broadcast => admin::handle_broadcast(b, msg, services, store).await,
        BotCommand::Botstats => admin::handle_botstats(b, msg, services, started_at.0).await,
        BotCommand::RegisteredUsers => admin::handle_registered_users(b, msg, services).await,
        BotCommand::AddTask(args) => admin::handle_add_task(b, msg, args, services).await,
        BotCommand::Addcoach(args) => admin::handle_add_coach(b, msg, args, services).await,
        BotCommand::ListCoaches => admin::handle_list_coaches(b, msg, services).await,
        BotCommand::RemoveCoach(args) => admin::handle_remove_coach(b, msg, args, services).await,
        BotCommand::RegistrationStats => admin::handle_registration_stats(b, msg, services).await,
        BotCommand::MyUsers => coach::handle_my_users(b, msg, services).await,
        BotCommand::AddAccount(args) => admin::handle_add_account(b, msg, args, services).await,
        BotCommand::DeleteAccount(args) => admin::handle_delete_account(b, msg, args, services).await,
        BotCommand::ListAccounts => admin::handle_list_accounts(b, msg, services).await,
    };

    if let Err(e) = result {
        error!(error = %e, "Error handling command");
        let _ = bot
            .send_message(chat_id, "An error occurred. Please try again.")
            .await;
        return Err(e.into());
    }

    Ok(())
}

/// Handle regular text messages
async fn handle_messages(
    bot: Bot,
    msg: Message,
    services: Arc<ServiceFactory>,
    store: Arc<SessionStore>,
) -> HandlerResult {
    let services = (*services).clone();
    let store = (*store).clone();
    let chat_id = msg.chat.id;

    if let Err(e) = handle_message(bot.clone(), msg, services, store).await {
        error!(error = %e, "Error handling message");
        let _ = bot
            .send_message(chat_id, "An error occurred. Please try again or contact @bigscottmedia.")
            .await;
        return Err(e.into());
    }

    Ok(())
}

/// Handle photo submissions
async fn handle_photos(
    bot: Bot,
    msg: Message,
    services: Arc<ServiceFactory>,
    store: Arc<SessionStore>,
    scheduler: Arc<ReminderScheduler>,
) -> HandlerResult {
    let services = (*services).clone();
    let store = (*store).clone();
    let scheduler = (*scheduler).clone();
    let chat_id = msg.chat.id;

    if let Err(e) = handle_photo(bot.clone(), msg, services, store, scheduler).await {
        error!(error = %e, "Error handling photo");
        let _ = bot
            .send_message(chat_id, "An error occurred. Please try again or contact @bigscottmedia.")
            .await;
        return Err(e.into());
    }

    Ok(())
}

/// Handle callback queries
async fn handle_callbacks(
    bot: Bot,
    query: teloxide::types::CallbackQuery,
    services: Arc<ServiceFactory>,
    store: Arc<SessionStore>,
    scheduler: Arc<ReminderScheduler>,
) -> HandlerResult {
    let services = (*services).clone();
    let store = (*store).clone();
    let scheduler = (*scheduler).clone();
    let user_chat = teloxide::types::ChatId(query.from.id.0 as i64);

    if let Err(e) = handle_callback_query(bot.clone(), query, services, store, scheduler).await {
        error!(error = %e, "Error handling callback query");
        let _ = bot
            .send_message(user_chat, "An error occurred. Please try again or contact @bigscottmedia.")
            .await;
        return Err(e.into());
    }

    Ok(())
}

/// Handle posts in the designated broadcast channel
async fn handle_channel_posts(
    bot: Bot,
    msg: Message,
    services: Arc<ServiceFactory>,
) -> HandlerResult {
    let services = (*services).clone();

    // Only the configured channel gets the read-only sub-commands
    if msg.chat.id.0 != services.settings.bot.channel_id {
        return Ok(());
    }

    if let Err(e) = handle_channel_post(bot, msg, services).await {
        error!(error = %e, "Error handling channel post");
        return Err(e.into());
    }

    Ok(())
}
