use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuration for the storefront, read once from the environment.
///
/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Database file path
/// Read from DATABASE_PATH environment variable
/// Default: store.sqlite
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "store.sqlite".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: app.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "app.log".to_string()));

/// Storefront Web App opened from the main menu
/// Read from WEB_APP_URL environment variable
pub static WEB_APP_URL: Lazy<String> =
    Lazy::new(|| env::var("WEB_APP_URL").unwrap_or_else(|_| "https://k40n45h1q.github.io/ReactApplication".to_string()));

/// Picture attached to the welcome message and restored after the wizard
/// Read from LOGO_PATH environment variable
/// Default: logo.jpg
pub static LOGO_PATH: Lazy<String> = Lazy::new(|| env::var("LOGO_PATH").unwrap_or_else(|_| "logo.jpg".to_string()));

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.trim_end_matches('/').to_string())
        }
    })
}

/// REST API configuration
pub mod api {
    use super::{non_empty_var, Lazy};
    use std::env;

    /// Port the REST API listens on
    /// Read from API_PORT environment variable
    /// Default: 8000
    pub static PORT: Lazy<u16> = Lazy::new(|| {
        env::var("API_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8000)
    });

    /// Base URL of a remote catalog API.
    /// Read from API_BASE_URL environment variable.
    /// When unset the wizard talks to the local store directly.
    pub static BASE_URL: Lazy<Option<String>> = Lazy::new(|| non_empty_var("API_BASE_URL"));

    /// Public prefix under which `/images/{file_id}` is reachable.
    /// Read from PUBLIC_API_URL environment variable.
    /// When unset, products store the bare Telegram file id.
    pub static PUBLIC_URL: Lazy<Option<String>> = Lazy::new(|| non_empty_var("PUBLIC_API_URL"));
}

/// Admin configuration
pub mod admin {
    use once_cell::sync::Lazy;
    use std::env;

    pub fn parse_admin_ids(raw: &str) -> Vec<i64> {
        raw.split([',', ' ', '\n', '\t'])
            .filter_map(|part| part.trim().parse::<i64>().ok())
            .collect()
    }

    /// Operator user IDs (comma-separated)
    /// Read from ADMIN_IDS environment variable
    pub static ADMIN_IDS: Lazy<Vec<i64>> = Lazy::new(|| {
        env::var("ADMIN_IDS")
            .ok()
            .map(|raw| parse_admin_ids(&raw))
            .unwrap_or_default()
    });

    /// Chat that receives new order summaries
    /// Read from ADMIN_CHAT_ID environment variable
    /// Defaults to 0 if not set (order notifications disabled)
    pub static ADMIN_CHAT_ID: Lazy<i64> = Lazy::new(|| {
        env::var("ADMIN_CHAT_ID")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0)
    });
}

/// Conversation wizard configuration
pub mod wizard {
    use super::{Duration, Lazy};
    use std::env;

    /// Idle wizard sessions older than this are dropped
    /// Read from WIZARD_SESSION_TTL_SECS environment variable
    /// Default: 1800 seconds (30 minutes)
    pub static SESSION_TTL_SECS: Lazy<u64> = Lazy::new(|| {
        env::var("WIZARD_SESSION_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1800)
    });

    /// Interval between sweeps of expired sessions (in seconds)
    pub const CLEANUP_INTERVAL_SECS: u64 = 300;

    pub fn session_ttl() -> Duration {
        Duration::from_secs(*SESSION_TTL_SECS)
    }

    pub fn cleanup_interval() -> Duration {
        Duration::from_secs(CLEANUP_INTERVAL_SECS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for outbound HTTP requests (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Bot API server configuration utilities
pub mod bot_api {
    /// Default public Bot API endpoint
    pub const DEFAULT_URL: &str = "https://api.telegram.org";

    /// Returns the BOT_API_URL environment variable if set.
    pub fn get_url() -> Option<String> {
        std::env::var("BOT_API_URL").ok()
    }

    /// Bot API base URL without a trailing slash.
    pub fn base_url() -> String {
        get_url()
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_URL.to_string())
    }
}
