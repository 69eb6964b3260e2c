//! Telegram bot integration and handlers

pub mod bot;
pub mod handlers;
pub mod keyboards;
pub mod notifications;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, setup_bot_description, Command};
pub use handlers::{schema, HandlerDeps, HandlerError, SessionStorage};
pub use notifications::{notify_admins_shutdown, notify_admins_startup};
