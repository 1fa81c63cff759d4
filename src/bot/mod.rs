//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `router`: transport-free decisions for messages, button presses and payments
//! - `commands`: slash command parsing
//! - `message_handler`: Handles incoming text messages and payment notifications
//! - `callback_handler`: Handles inline keyboard callback queries
//! - `payment_handler`: Answers pre-checkout queries
//! - `ui_builder`: Creates keyboards and formats messages
//! - `transport`: Sends router replies through the Bot API

pub mod callback_handler;
pub mod commands;
pub mod context;
pub mod message_handler;
pub mod payment_handler;
pub mod router;
pub mod transport;
pub mod ui_builder;

// Re-export main handler functions for use in main.rs
pub use callback_handler::callback_handler;
pub use message_handler::message_handler;
pub use payment_handler::pre_checkout_handler;

pub use context::AppContext;
pub use transport::register_commands;
