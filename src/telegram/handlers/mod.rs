//! Telegram bot handler tree configuration
//!
//! The same schema is used in production and can be driven by integration
//! tests with an in-memory session storage.

mod conversation;
mod schema;
mod types;

pub use conversation::{handle_text_message, send_reply, session_dialogue};
pub use schema::schema;
pub use types::{HandlerDeps, HandlerError, SessionDialogue, SessionStorage, TypingIndicator};
