use thiserror::Error;

use crate::core::validation::ImeiError;
use crate::lookup::LookupError;
use crate::storage::StoreError;

/// Centralized error type for the process edge
///
/// Flow steps use their own narrow errors (see [`crate::flow::FlowError`]);
/// everything that can stop a subcommand converts into this enum.
#[derive(Error, Debug)]
pub enum AppError {
    /// User store errors
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// imeicheck.net errors
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// IMEI given on the command line
    #[error("Invalid IMEI: {0}")]
    Imei(#[from] ImeiError),

    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
