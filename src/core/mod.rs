//! Core utilities: configuration, errors, logging, tokens, validation

pub mod config;
pub mod error;
pub mod logging;
pub mod token;
pub mod validation;

// Re-exports for convenience
pub use config::{Config, ConfigError};
pub use error::{AppError, AppResult};
pub use logging::init_logger;
pub use token::generate_token;
pub use validation::{Imei, ImeiError};
