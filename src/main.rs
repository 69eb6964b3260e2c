use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;

use imeibot::cli::{Cli, Commands};
use imeibot::core::config::{env_file_name, Config};
use imeibot::core::{init_logger, AppResult, Imei};
use imeibot::flow::FlowController;
use imeibot::lookup::{ImeiCheckClient, LookupClient};
use imeibot::storage::db::count_users;
use imeibot::storage::{create_pool, get_connection};
use imeibot::telegram::{
    create_bot, notify_admins_shutdown, notify_admins_startup, schema, setup_bot_commands, setup_bot_description,
    HandlerDeps, SessionStorage,
};

/// Attempts at reaching the Bot API before giving up at startup
const STARTUP_MAX_RETRIES: u32 = 5;

/// Main entry point for the bot
///
/// Parses CLI arguments and dispatches to the appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (configuration, logging, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
    }));

    // A missing env file is fine, variables may come from the environment itself
    if let Err(e) = dotenvy::from_filename(env_file_name()) {
        eprintln!("Not loading {}: {}", env_file_name(), e);
    }

    let config = Config::from_env()?;
    init_logger(&config.log)?;

    match cli.command {
        None | Some(Commands::Run) => run_bot(config).await?,
        Some(Commands::Services) => run_list_services(&config).await?,
        Some(Commands::Check { imei }) => run_check(&config, &imei).await?,
    }
    Ok(())
}

async fn run_bot(config: Config) -> AppResult<()> {
    log::info!("Starting bot...");

    let bot = create_bot(&config.telegram)?;

    let me = {
        let mut attempt = 0;
        loop {
            match bot.get_me().await {
                Ok(me) => break me,
                Err(e) => {
                    attempt += 1;
                    if attempt >= STARTUP_MAX_RETRIES {
                        log::error!("Failed to connect to Bot API after {} attempts", attempt);
                        return Err(e.into());
                    }
                    log::warn!(
                        "Bot API not ready (attempt {}/{}): {}. Retrying in 5 seconds...",
                        attempt,
                        STARTUP_MAX_RETRIES,
                        e
                    );
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
            }
        }
    };
    let bot_username = me.username().to_string();
    log::info!("Bot username: @{}", bot_username);

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }
    if let Err(e) = setup_bot_description(&bot, &me).await {
        log::warn!("Failed to set bot description: {}", e);
    }

    let pool = Arc::new(create_pool(&config.database_path)?);
    match get_connection(&pool).and_then(|conn| count_users(&conn)) {
        Ok(count) => log::info!("Database ready at {} ({} users)", config.database_path, count),
        Err(e) => log::warn!("Could not count users: {}", e),
    }

    let lookup: Arc<dyn LookupClient> = Arc::new(ImeiCheckClient::new(&config.lookup)?);
    let flow = Arc::new(FlowController::new(pool, lookup, config.telegram.typing_delay));
    let handler = schema(HandlerDeps::new(flow, bot_username));

    notify_admins_startup(&bot, &config.telegram.admin_ids).await;

    let listener = Polling::builder(bot.clone()).drop_pending_updates().build();
    Dispatcher::builder(bot.clone(), handler)
        .dependencies(dptree::deps![SessionStorage::new()])
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    log::info!("Dispatcher shutdown gracefully");
    notify_admins_shutdown(&bot, &config.telegram.admin_ids).await;
    Ok(())
}

async fn run_list_services(config: &Config) -> AppResult<()> {
    let client = ImeiCheckClient::new(&config.lookup)?;
    let services = client.list_services().await?;
    println!("{:#}", services);
    Ok(())
}

async fn run_check(config: &Config, raw: &str) -> AppResult<()> {
    let imei = Imei::parse(raw)?;
    let client = ImeiCheckClient::new(&config.lookup)?;
    println!("{}", client.check(&imei).await?);
    Ok(())
}
