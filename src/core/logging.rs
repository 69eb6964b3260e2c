//! Logging initialization
//!
//! Console output at the configured level, plus an append-only file that only
//! receives errors.

use anyhow::Result;
use simplelog::*;
use std::fs::OpenOptions;

use crate::core::config::LogConfig;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `config` - Log level and path to the error log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to open the file or a logger was already set
pub fn init_logger(config: &LogConfig) -> Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.file_path)
        .map_err(|e| anyhow::anyhow!("Failed to open log file {}: {}", config.file_path, e))?;

    let log_config = ConfigBuilder::new()
        .add_filter_ignore_str("hyper")
        .add_filter_ignore_str("reqwest")
        .build();

    CombinedLogger::init(vec![
        TermLogger::new(
            config.level,
            log_config.clone(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Error, log_config, log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}
