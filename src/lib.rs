//! imeibot - Telegram bot for user registration and IMEI lookups
//!
//! Users register through a short conversation, receive an access token and
//! can then look up device information by IMEI through imeicheck.net.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, tokens and input validation
//! - `storage`: SQLite user store with embedded migrations
//! - `lookup`: imeicheck.net HTTP client
//! - `flow`: the registration and lookup conversation, independent of Telegram
//! - `telegram`: teloxide dispatcher tree, commands and keyboards

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod cli;
pub mod core;
pub mod flow;
pub mod lookup;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::{config, AppError, AppResult, Config};
pub use flow::{FlowController, Outcome, SessionState, Trigger};
pub use lookup::{ImeiCheckClient, LookupClient};
pub use storage::{create_pool, get_connection, DbConnection, DbPool};
pub use telegram::{schema, HandlerDeps, SessionStorage};
