//! Bot initialization and message classification
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation and menu/description setup
//! - Mapping of inbound text to flow triggers

use std::time::Duration;

use reqwest::ClientBuilder;
use secrecy::ExposeSecret;
use teloxide::prelude::*;
use teloxide::types::Me;
use teloxide::utils::command::BotCommands;

use crate::core::config::TelegramConfig;
use crate::core::AppResult;
use crate::flow::{Caller, Trigger};

/// Request timeout for Bot API calls; must exceed the long polling timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "snake_case", description = "Я умею:")]
pub enum Command {
    #[command(description = "Старт")]
    Start(String),
    #[command(description = "Регистрация")]
    Registration,
    #[command(description = "Отправить IMEI")]
    SendImei,
}

/// Creates a Bot instance with custom or default API URL
pub fn create_bot(config: &TelegramConfig) -> AppResult<Bot> {
    let client = ClientBuilder::new().timeout(REQUEST_TIMEOUT).build()?;
    let bot = Bot::with_client(config.bot_token.expose_secret(), client);

    let bot = match &config.api_url {
        Some(url) => {
            log::info!("Using custom Bot API URL: {}", url);
            bot.set_api_url(url.clone())
        }
        None => bot,
    };

    Ok(bot)
}

/// Sets up the command menu shown to every user
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}

/// Sets the description shown before the first message
pub async fn setup_bot_description(bot: &Bot, me: &Me) -> Result<(), teloxide::RequestError> {
    bot.set_my_description()
        .description(format!(
            "{} приветствует тебя!\nЭтот 🤖 БОТ занимается поиском\nинформации об устройстве по его IMEI",
            me.first_name
        ))
        .await?;
    Ok(())
}

/// Maps message text to a flow trigger.
///
/// Known commands (optionally addressed as `/command@bot_username`) become
/// their trigger; everything else, unknown commands included, is plain text.
pub fn trigger_from_text(text: &str, bot_username: &str) -> Trigger {
    match Command::parse(text, bot_username) {
        Ok(Command::Start(argument)) => Trigger::Start { argument },
        Ok(Command::Registration) => Trigger::Register,
        Ok(Command::SendImei) => Trigger::RequestImei,
        Err(_) => Trigger::Text(text.to_string()),
    }
}

/// Extracts the caller of a message; `None` for anonymous senders.
pub fn caller_from_message(msg: &Message) -> Option<Caller> {
    let user = msg.from.as_ref()?;
    Some(Caller {
        id: i64::try_from(user.id.0).ok()?,
        username: user.username.clone(),
        first_name: Some(user.first_name.clone()),
        last_name: user.last_name.clone(),
    })
}
