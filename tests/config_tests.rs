use std::collections::HashMap;
use std::path::PathBuf;

use calc_bot::config::{Config, ConfigError, DEFAULT_CURRENCY, DEFAULT_HISTORY_PATH};

fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn test_minimal_configuration() {
    let config = load(&[
        ("TELEGRAM_BOT_TOKEN", "123:abc"),
        ("PAYMENT_PROVIDER_TOKEN", "provider"),
    ])
    .unwrap();

    assert_eq!(config.bot_token, "123:abc");
    assert_eq!(config.payment_provider_token, "provider");
    assert_eq!(config.operator_id, None);
    assert_eq!(config.history_path, PathBuf::from(DEFAULT_HISTORY_PATH));
    assert_eq!(config.currency, DEFAULT_CURRENCY);
}

#[test]
fn test_legacy_token_name() {
    let config = load(&[("BOT_TOKEN", "legacy"), ("PAYMENT_PROVIDER_TOKEN", "p")]).unwrap();
    assert_eq!(config.bot_token, "legacy");
}

#[test]
fn test_missing_secrets() {
    assert_eq!(
        load(&[("PAYMENT_PROVIDER_TOKEN", "p")]),
        Err(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))
    );
    assert_eq!(
        load(&[("TELEGRAM_BOT_TOKEN", "t"), ("PAYMENT_PROVIDER_TOKEN", "  ")]),
        Err(ConfigError::Missing("PAYMENT_PROVIDER_TOKEN"))
    );
}

#[test]
fn test_optional_settings() {
    let config = load(&[
        ("TELEGRAM_BOT_TOKEN", "t"),
        ("PAYMENT_PROVIDER_TOKEN", "p"),
        ("OPERATOR_ID", "777"),
        ("HISTORY_PATH", "/var/lib/bot/history.json"),
        ("PAYMENT_CURRENCY", "usd"),
    ])
    .unwrap();

    assert_eq!(config.operator_id, Some(777));
    assert!(config.is_operator(777));
    assert!(!config.is_operator(778));
    assert_eq!(config.history_path, PathBuf::from("/var/lib/bot/history.json"));
    assert_eq!(config.currency, "USD");
}

#[test]
fn test_invalid_settings() {
    let result = load(&[
        ("TELEGRAM_BOT_TOKEN", "t"),
        ("PAYMENT_PROVIDER_TOKEN", "p"),
        ("OPERATOR_ID", "admin"),
    ]);
    assert!(matches!(
        result,
        Err(ConfigError::Invalid {
            name: "OPERATOR_ID",
            ..
        })
    ));

    let result = load(&[
        ("TELEGRAM_BOT_TOKEN", "t"),
        ("PAYMENT_PROVIDER_TOKEN", "p"),
        ("PAYMENT_CURRENCY", "rubles"),
    ]);
    assert!(matches!(
        result,
        Err(ConfigError::Invalid {
            name: "PAYMENT_CURRENCY",
            ..
        })
    ));
}
