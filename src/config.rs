//! # Configuration Module
//!
//! Runtime settings of the bot, read once at startup from the environment
//! (after loading an optional `.env` file) and shared with the handlers.

use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Default location of the calculation history log
pub const DEFAULT_HISTORY_PATH: &str = "history.json";

/// Default currency of invoices
pub const DEFAULT_CURRENCY: &str = "RUB";

/// Errors raised while loading the configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Bot configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Telegram bot token
    pub bot_token: String,
    /// Token of the payment provider used for invoices
    pub payment_provider_token: String,
    /// Telegram user allowed to read the calculation history
    pub operator_id: Option<u64>,
    /// Path of the JSON history log
    pub history_path: PathBuf,
    /// ISO 4217 currency code for invoices
    pub currency: String,
}

impl Config {
    /// Load the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load the configuration through an arbitrary key lookup
    ///
    /// Empty values are treated as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bot_token = get("TELEGRAM_BOT_TOKEN")
            .or_else(|| get("BOT_TOKEN"))
            .ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;

        let payment_provider_token =
            get("PAYMENT_PROVIDER_TOKEN").ok_or(ConfigError::Missing("PAYMENT_PROVIDER_TOKEN"))?;

        let operator_id = match get("OPERATOR_ID") {
            Some(raw) => Some(raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                name: "OPERATOR_ID",
                reason: e.to_string(),
            })?),
            None => None,
        };

        let history_path = get("HISTORY_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_PATH));

        let currency = match get("PAYMENT_CURRENCY") {
            Some(code) if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) => {
                code.to_ascii_uppercase()
            }
            Some(code) => {
                return Err(ConfigError::Invalid {
                    name: "PAYMENT_CURRENCY",
                    reason: format!("'{code}' is not a three-letter currency code"),
                })
            }
            None => DEFAULT_CURRENCY.to_string(),
        };

        Ok(Self {
            bot_token,
            payment_provider_token,
            operator_id,
            history_path,
            currency,
        })
    }

    /// Whether `user_id` is the configured history operator
    pub fn is_operator(&self, user_id: u64) -> bool {
        self.operator_id == Some(user_id)
    }
}
