//! Logging initialization
//!
//! Console + file output through `simplelog`, driven by the `log` facade.

use anyhow::Result;
use simplelog::*;
use std::fs::File;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to create the file or a logger was already set
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the effective configuration at startup (never the bot token itself).
pub fn log_startup_configuration() {
    use crate::core::config;

    log::info!("Database: {}", config::DATABASE_PATH.as_str());
    log::info!("API port: {}", *config::api::PORT);
    match config::api::BASE_URL.as_deref() {
        Some(url) => log::info!("Wizard catalog backend: HTTP ({})", url),
        None => log::info!("Wizard catalog backend: local store"),
    }
    if config::admin::ADMIN_IDS.is_empty() {
        log::warn!("ADMIN_IDS is empty - nobody can edit the catalog from the chat");
    } else {
        log::info!("Operators: {}", config::admin::ADMIN_IDS.len());
    }
    if *config::admin::ADMIN_CHAT_ID == 0 {
        log::warn!("ADMIN_CHAT_ID not set - order notifications disabled");
    }
}
