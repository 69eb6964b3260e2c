//! Process configuration
//!
//! Everything is read once at startup into a [`Config`] and handed to the
//! components that need it. Nothing here is a global.

use std::env;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default imeicheck.net API root
pub const DEFAULT_IMEICHECK_BASE_URL: &str = "https://api.imeicheck.net";

/// imeicheck.net service used for every check ("Apple Basic Info")
pub const DEFAULT_IMEICHECK_SERVICE_ID: u32 = 12;

/// Timeout for imeicheck.net requests (in seconds)
pub const DEFAULT_IMEICHECK_TIMEOUT_SECS: u64 = 30;

/// Delay shown as "typing…" before the lookup result is sent (in milliseconds)
pub const DEFAULT_TYPING_DELAY_MS: u64 = 2000;

/// Configuration errors, each naming the offending variable
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),

    #[error("environment variable {var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Telegram side of the configuration
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: SecretString,
    /// Custom Bot API server, if any
    pub api_url: Option<Url>,
    /// Operators notified on startup and shutdown
    pub admin_ids: Vec<i64>,
    pub typing_delay: Duration,
}

/// imeicheck.net client configuration
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub api_token: SecretString,
    pub base_url: Url,
    pub service_id: u32,
    pub timeout: Duration,
}

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub file_path: String,
    pub level: log::LevelFilter,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub lookup: LookupConfig,
    pub database_path: String,
    pub log: LogConfig,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|name| env::var(name).ok())
    }

    /// Reads the configuration from an arbitrary variable source.
    ///
    /// Empty values are treated as unset.
    pub fn from_source<F>(source: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| source(name).filter(|value| !value.trim().is_empty());

        let bot_token = get("BOT_TOKEN")
            .or_else(|| get("TELOXIDE_TOKEN"))
            .ok_or(ConfigError::Missing("BOT_TOKEN"))?;

        let api_url = get("BOT_API_URL")
            .map(|raw| parse_url("BOT_API_URL", &raw))
            .transpose()?;

        let admin_ids = get("ADMIN_IDS")
            .map(|raw| parse_admin_ids(&raw))
            .transpose()?
            .unwrap_or_default();

        let typing_delay = Duration::from_millis(parse_or(
            "TYPING_DELAY_MS",
            get("TYPING_DELAY_MS"),
            DEFAULT_TYPING_DELAY_MS,
        )?);

        let api_token = get("IMEICHECK_TOKEN").ok_or(ConfigError::Missing("IMEICHECK_TOKEN"))?;
        let base_url = parse_url(
            "IMEICHECK_BASE_URL",
            &get("IMEICHECK_BASE_URL").unwrap_or_else(|| DEFAULT_IMEICHECK_BASE_URL.to_string()),
        )?;
        let service_id = parse_or("IMEICHECK_SERVICE_ID", get("IMEICHECK_SERVICE_ID"), DEFAULT_IMEICHECK_SERVICE_ID)?;
        let timeout = Duration::from_secs(parse_or(
            "IMEICHECK_TIMEOUT_SECS",
            get("IMEICHECK_TIMEOUT_SECS"),
            DEFAULT_IMEICHECK_TIMEOUT_SECS,
        )?);

        let level = match get("LOG_LEVEL") {
            Some(raw) => raw.parse::<log::LevelFilter>().map_err(|e| ConfigError::Invalid {
                var: "LOG_LEVEL",
                reason: e.to_string(),
            })?,
            None => log::LevelFilter::Info,
        };

        Ok(Self {
            telegram: TelegramConfig {
                bot_token: SecretString::from(bot_token),
                api_url,
                admin_ids,
                typing_delay,
            },
            lookup: LookupConfig {
                api_token: SecretString::from(api_token),
                base_url,
                service_id,
                timeout,
            },
            database_path: get("DATABASE_PATH").unwrap_or_else(|| "database.sqlite".to_string()),
            log: LogConfig {
                file_path: get("LOG_FILE_PATH").unwrap_or_else(|| "file.log".to_string()),
                level,
            },
        })
    }
}

/// Env file to load before reading the configuration.
///
/// `.env.docker` inside containers (`ENV=docker`), `.env` otherwise.
pub fn env_file_name() -> &'static str {
    match env::var("ENV") {
        Ok(value) if value == "docker" => ".env.docker",
        _ => ".env",
    }
}

fn parse_admin_ids(raw: &str) -> Result<Vec<i64>, ConfigError> {
    raw.split([',', ' ', '\n', '\t'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>().map_err(|e| ConfigError::Invalid {
                var: "ADMIN_IDS",
                reason: format!("'{}': {}", part, e),
            })
        })
        .collect()
}

fn parse_url(var: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}

fn parse_or<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
