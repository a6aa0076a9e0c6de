use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;

use shopbot::catalog_client;
use shopbot::cli::{Cli, Commands};
use shopbot::telegram::notifications::order_notifier;
use shopbot::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps, TelegramMedia, TelegramPhotoResolver};
use shopbot::wizard::SessionStore;
use shopcore::api::{run_api_server, ApiState, MediaSource, UnavailableMedia};
use shopcore::core::logging::log_startup_configuration;
use shopcore::core::{config, init_logger};
use shopcore::{create_pool, DbPool};

/// Main entry point for the storefront bot
///
/// Parses CLI arguments and dispatches to the matching subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Log panics from handler tasks instead of losing them on stderr
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            log::error!("Panic message: {}", msg);
        }
    }));

    // .env must be loaded before any config static is touched
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH)?;
    log_startup_configuration();

    match cli.command {
        Some(Commands::Run { port }) => run_bot(port.unwrap_or(*config::api::PORT)).await,
        Some(Commands::Api { port }) => run_api_only(port.unwrap_or(*config::api::PORT)).await,
        Some(Commands::Migrate) => {
            open_database()?;
            log::info!("Database {} is up to date", config::DATABASE_PATH.as_str());
            Ok(())
        }
        None => {
            log::info!("No command specified, running bot and API");
            run_bot(*config::api::PORT).await
        }
    }
}

fn open_database() -> Result<Arc<DbPool>> {
    let pool = create_pool(&config::DATABASE_PATH).map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))?;
    Ok(Arc::new(pool))
}

/// Picture source for `/avatar` and `/images`: the Bot API when a bot is
/// configured, nothing otherwise.
fn media_source(bot: Option<&Bot>) -> Arc<dyn MediaSource> {
    match bot.map(|bot| TelegramMedia::new(bot.clone())) {
        Some(Ok(media)) => Arc::new(media),
        Some(Err(e)) => {
            log::warn!("Failed to set up Telegram media source: {}", e);
            Arc::new(UnavailableMedia)
        }
        None => Arc::new(UnavailableMedia),
    }
}

/// Runs the REST API without the chat side
///
/// A bot token is optional here; without one order notifications and the
/// picture proxies are disabled.
async fn run_api_only(port: u16) -> Result<()> {
    let db_pool = open_database()?;

    let bot = if config::BOT_TOKEN.is_empty() {
        log::warn!("BOT_TOKEN not set - notifications and picture proxies disabled");
        None
    } else {
        Some(create_bot()?)
    };

    let state = ApiState::new(db_pool, order_notifier(bot.clone()), media_source(bot.as_ref()));
    run_api_server(port, state).await
}

/// Runs the bot and the REST API in one process
async fn run_bot(port: u16) -> Result<()> {
    log::info!("Starting storefront bot...");

    let bot = create_bot()?;
    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let db_pool = open_database()?;

    let sessions = Arc::new(SessionStore::new(config::wizard::session_ttl()));
    Arc::clone(&sessions).spawn_cleanup(config::wizard::cleanup_interval());

    let catalog = catalog_client::from_config(Arc::clone(&db_pool))?;
    let deps = HandlerDeps::new(catalog, sessions, Arc::new(TelegramPhotoResolver::new(bot.clone())));

    let state = ApiState::new(
        Arc::clone(&db_pool),
        order_notifier(Some(bot.clone())),
        media_source(Some(&bot)),
    );
    tokio::spawn(async move {
        if let Err(e) = run_api_server(port, state).await {
            log::error!("REST API server error: {}", e);
        }
    });

    log::info!("📡 Ready to receive updates!");

    // The dispatcher runs in its own task so a panic is logged, not fatal
    let handler = schema(deps);
    let handle = tokio::spawn(async move {
        Dispatcher::builder(bot, handler)
            .enable_ctrlc_handler()
            .default_handler(|update| async move {
                log::debug!("Unhandled update: {:?}", update.kind);
            })
            .error_handler(LoggingErrorHandler::with_custom_text("An error in the dispatcher"))
            .build()
            .dispatch()
            .await
    });

    match handle.await {
        Ok(()) => log::info!("Dispatcher shutdown gracefully"),
        Err(join_err) if join_err.is_panic() => log::error!("Dispatcher panicked: {}", join_err),
        Err(join_err) => log::warn!("Dispatcher task was cancelled: {}", join_err),
    }

    Ok(())
}
