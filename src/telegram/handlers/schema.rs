//! Dispatcher schema

use std::sync::Arc;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::conversation::handle_text_message;
use super::types::{HandlerDeps, HandlerError, SessionStorage};

/// Creates the dispatcher schema for the bot.
///
/// Every text message from a known sender goes through the conversation
/// flow. Sessions are kept per user in [`SessionStorage`], which must be
/// registered as a dependency of the dispatcher.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some() && msg.from.is_some())
        .endpoint(move |bot: Bot, msg: Message, storage: Arc<SessionStorage>| {
            let deps = deps.clone();
            async move { handle_text_message(&bot, &msg, storage, &deps).await }
        })
}
