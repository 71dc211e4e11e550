//! Widget configuration.
//!
//! Every setting has a default, so `WidgetConfig::default()` is a complete
//! configuration. [`WidgetConfig::from_env`] lets a deployment override them.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `PARFUM_WHATSAPP_NUMBER` - Destination number, digits only (default: 524941125352)
//! - `PARFUM_CHAT_BASE_URL` - Chat link base (default: <https://wa.me/>)
//! - `PARFUM_CART_KEY` - Storage key of the cart record (default: `perfumesZacatecas_cart`)
//! - `PARFUM_HISTORY_KEY` - Storage key of the order history (default: `perfumesZacatecas_orders`)
//! - `PARFUM_NOTICE_MS` - Lifetime of add-to-cart notices in milliseconds (default: 2000)
//! - `PARFUM_ORDER_GREETING` - First line of the order message

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::storage::validate_key;

const DEFAULT_WHATSAPP_NUMBER: &str = "524941125352";
const DEFAULT_CHAT_BASE_URL: &str = "https://wa.me/";
const DEFAULT_CART_KEY: &str = "perfumesZacatecas_cart";
const DEFAULT_HISTORY_KEY: &str = "perfumesZacatecas_orders";
const DEFAULT_NOTICE_MS: u64 = 2000;
const DEFAULT_GREETING: &str = "Hello, I would like to place the following order:";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart widget configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    /// Phone number orders are sent to, international format without `+`
    pub whatsapp_number: String,
    /// Base of the chat link; the number is appended as the path
    pub chat_base_url: String,
    /// Storage key of the cart record
    pub cart_key: String,
    /// Storage key of the order-history record
    pub history_key: String,
    /// How long an add-to-cart notice stays on screen
    pub notice_lifetime: Duration,
    /// Opening line of the order message
    pub greeting: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            whatsapp_number: DEFAULT_WHATSAPP_NUMBER.to_string(),
            chat_base_url: DEFAULT_CHAT_BASE_URL.to_string(),
            cart_key: DEFAULT_CART_KEY.to_string(),
            history_key: DEFAULT_HISTORY_KEY.to_string(),
            notice_lifetime: Duration::from_millis(DEFAULT_NOTICE_MS),
            greeting: DEFAULT_GREETING.to_string(),
        }
    }
}

impl WidgetConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from a variable lookup, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let get = |key: &str, default: String| lookup(key).unwrap_or(default);

        let whatsapp_number = get("PARFUM_WHATSAPP_NUMBER", defaults.whatsapp_number);
        validate_phone_number(&whatsapp_number, "PARFUM_WHATSAPP_NUMBER")?;

        let chat_base_url = get("PARFUM_CHAT_BASE_URL", defaults.chat_base_url);
        Url::parse(&chat_base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("PARFUM_CHAT_BASE_URL".to_string(), e.to_string())
        })?;

        let cart_key = get("PARFUM_CART_KEY", defaults.cart_key);
        validate_storage_key(&cart_key, "PARFUM_CART_KEY")?;
        let history_key = get("PARFUM_HISTORY_KEY", defaults.history_key);
        validate_storage_key(&history_key, "PARFUM_HISTORY_KEY")?;
        if cart_key == history_key {
            return Err(ConfigError::InvalidEnvVar(
                "PARFUM_HISTORY_KEY".to_string(),
                "must differ from the cart key".to_string(),
            ));
        }

        let notice_lifetime = match lookup("PARFUM_NOTICE_MS") {
            Some(raw) => raw.parse::<u64>().map(Duration::from_millis).map_err(|e| {
                ConfigError::InvalidEnvVar("PARFUM_NOTICE_MS".to_string(), e.to_string())
            })?,
            None => defaults.notice_lifetime,
        };

        let greeting = get("PARFUM_ORDER_GREETING", defaults.greeting);

        Ok(Self {
            whatsapp_number,
            chat_base_url,
            cart_key,
            history_key,
            notice_lifetime,
            greeting,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Validate that a phone number is digits only.
fn validate_phone_number(number: &str, var_name: &str) -> Result<(), ConfigError> {
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must contain only digits (international format without '+')".to_string(),
        ));
    }
    Ok(())
}

/// Validate that a storage key is usable as a record name.
fn validate_storage_key(key: &str, var_name: &str) -> Result<(), ConfigError> {
    validate_key(key).map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))
}
