//! # Calculator Telegram Bot
//!
//! A Telegram bot that echoes messages, evaluates arithmetic expressions in a
//! short conversation, keeps a JSON history of calculations and runs a mock
//! payment flow.

pub mod bot;
pub mod config;
pub mod dialogue;
pub mod expression;
pub mod history;
pub mod localization;
pub mod payments;
