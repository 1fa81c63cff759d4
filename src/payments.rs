//! # Payments Module
//!
//! Mock payment flow: a fixed tariff catalog, invoice construction and the
//! validation applied to pre-checkout queries before Telegram charges the
//! user.

use thiserror::Error;

/// Prefix of invoice payloads, followed by the tariff id
pub const PAYLOAD_PREFIX: &str = "tariff:";

/// Tariff billed by `/pay`
pub const DEFAULT_TARIFF: &str = "basic";

/// A purchasable tariff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tariff {
    pub id: &'static str,
    /// Price in minor units of the invoice currency
    pub amount: u32,
}

impl Tariff {
    /// Localization key of the tariff title
    pub fn title_key(&self) -> String {
        format!("tariff-{}-title", self.id)
    }

    /// Localization key of the tariff description
    pub fn description_key(&self) -> String {
        format!("tariff-{}-description", self.id)
    }

    pub fn payload(&self) -> String {
        format!("{PAYLOAD_PREFIX}{}", self.id)
    }
}

pub const TARIFFS: &[Tariff] = &[
    Tariff {
        id: "basic",
        amount: 10_000,
    },
    Tariff {
        id: "standard",
        amount: 25_000,
    },
    Tariff {
        id: "premium",
        amount: 50_000,
    },
];

pub fn find_tariff(id: &str) -> Option<&'static Tariff> {
    TARIFFS.iter().find(|tariff| tariff.id == id)
}

/// Resolve the tariff named by an invoice payload or callback data
pub fn tariff_from_payload(payload: &str) -> Option<&'static Tariff> {
    payload.strip_prefix(PAYLOAD_PREFIX).and_then(find_tariff)
}

/// Format an amount given in minor units, e.g. `10000` → `100.00 RUB`
pub fn format_amount(amount: u64, currency: &str) -> String {
    format!("{}.{:02} {}", amount / 100, amount % 100, currency)
}

/// Invoice ready to be sent to a chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub title: String,
    pub description: String,
    pub payload: String,
    pub currency: String,
    /// Label of the single price line
    pub label: String,
    pub amount: u32,
}

/// The parts of a pre-checkout query that need checking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreCheckout {
    pub payload: String,
    pub currency: String,
    pub total_amount: u64,
}

/// Reasons to decline a pre-checkout query
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentRejection {
    #[error("unknown invoice payload '{0}'")]
    UnknownTariff(String),
    #[error("currency {actual} does not match {expected}")]
    CurrencyMismatch { expected: String, actual: String },
    #[error("amount {actual} does not match {expected}")]
    AmountMismatch { expected: u64, actual: u64 },
}

/// Approve a pre-checkout query only if it matches one of our invoices
pub fn check_pre_checkout(
    query: &PreCheckout,
    currency: &str,
) -> Result<&'static Tariff, PaymentRejection> {
    let tariff = tariff_from_payload(&query.payload)
        .ok_or_else(|| PaymentRejection::UnknownTariff(query.payload.clone()))?;

    if !query.currency.eq_ignore_ascii_case(currency) {
        return Err(PaymentRejection::CurrencyMismatch {
            expected: currency.to_string(),
            actual: query.currency.clone(),
        });
    }

    if query.total_amount != u64::from(tariff.amount) {
        return Err(PaymentRejection::AmountMismatch {
            expected: u64::from(tariff.amount),
            actual: query.total_amount,
        });
    }

    Ok(tariff)
}
