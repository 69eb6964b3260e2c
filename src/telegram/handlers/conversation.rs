//! Single-message conversation handling

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::ReplyParameters;

use super::types::{HandlerDeps, HandlerError, SessionDialogue, SessionStorage, TypingIndicator};
use crate::flow::{Caller, Reply, SessionState};
use crate::telegram::bot::{caller_from_message, trigger_from_text};
use crate::telegram::keyboards::menu_keyboard;

/// Session of one user.
///
/// Keyed by the user id rather than the chat, so members of a group chat
/// each have their own conversation.
pub fn session_dialogue(storage: Arc<SessionStorage>, caller: &Caller) -> SessionDialogue {
    SessionDialogue::new(storage, ChatId(caller.id))
}

/// Runs one flow step for a text message and stores the resulting state.
pub async fn handle_text_message(
    bot: &Bot,
    msg: &Message,
    storage: Arc<SessionStorage>,
    deps: &HandlerDeps,
) -> Result<(), HandlerError> {
    let (Some(text), Some(caller)) = (msg.text(), caller_from_message(msg)) else {
        return Ok(());
    };

    let dialogue = session_dialogue(storage, &caller);
    let state = dialogue.get_or_default().await?;
    let trigger = trigger_from_text(text, &deps.bot_username);
    let activity = TypingIndicator::new(bot.clone(), msg.chat.id);

    let outcome = deps.flow.handle(&caller, state, trigger, &activity).await;

    if let Err(e) = send_reply(bot, msg, &outcome.reply).await {
        log::error!("Failed to send reply to user {}: {}", caller.id, e);
    }

    // Unset is never stored, so there is nothing to remove
    match outcome.next {
        SessionState::Unset if state == SessionState::Unset => {}
        SessionState::Unset => dialogue.exit().await?,
        next => dialogue.update(next).await?,
    }
    Ok(())
}

/// Sends a flow reply, quoting the inbound message when asked to.
pub async fn send_reply(bot: &Bot, msg: &Message, reply: &Reply) -> Result<Message, teloxide::RequestError> {
    let mut request = bot.send_message(msg.chat.id, reply.text.clone());
    if reply.quote {
        request = request.reply_parameters(ReplyParameters::new(msg.id));
    }
    if let Some(menu) = reply.menu {
        request = request.reply_markup(menu_keyboard(menu));
    }
    request.await
}
