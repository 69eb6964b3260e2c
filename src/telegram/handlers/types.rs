//! Handler types and dependencies

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};
use teloxide::prelude::*;
use teloxide::types::ChatAction;

use crate::flow::{ChatActivity, FlowController, SessionState};

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Where conversation sessions live between messages
pub type SessionStorage = InMemStorage<SessionState>;

pub type SessionDialogue = Dialogue<SessionState, SessionStorage>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub flow: Arc<FlowController>,
    /// Bot username (without @), used to accept `/command@bot_username`
    pub bot_username: String,
}

impl HandlerDeps {
    pub fn new(flow: Arc<FlowController>, bot_username: impl Into<String>) -> Self {
        Self {
            flow,
            bot_username: bot_username.into(),
        }
    }
}

/// Shows "typing…" in the chat while a lookup runs
pub struct TypingIndicator {
    bot: Bot,
    chat_id: ChatId,
}

impl TypingIndicator {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl ChatActivity for TypingIndicator {
    async fn typing(&self) {
        if let Err(e) = self.bot.send_chat_action(self.chat_id, ChatAction::Typing).await {
            log::warn!("Failed to send typing action to {}: {}", self.chat_id, e);
        }
    }
}
