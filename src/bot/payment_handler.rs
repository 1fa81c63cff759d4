//! Payment Handler module for answering pre-checkout queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::PreCheckoutQuery;
use tracing::debug;

use crate::payments::PreCheckout;

use super::context::AppContext;
use super::router::{self, PreCheckoutAnswer, Sender};

/// Approve or reject a pre-checkout query before the user is charged
pub async fn pre_checkout_handler(
    bot: Bot,
    q: PreCheckoutQuery,
    ctx: Arc<AppContext>,
) -> Result<()> {
    debug!(user_id = %q.from.id, payload = %q.invoice_payload, "Received pre-checkout query");

    let sender = Sender::from(&q.from);
    let query = PreCheckout {
        payload: q.invoice_payload.clone(),
        currency: q.currency.to_string(),
        total_amount: q.total_amount as u64,
    };

    match router::on_pre_checkout(&ctx, &sender, &query) {
        PreCheckoutAnswer::Approve => {
            bot.answer_pre_checkout_query(q.id, true).await?;
        }
        PreCheckoutAnswer::Reject(message) => {
            bot.answer_pre_checkout_query(q.id, false)
                .error_message(message)
                .await?;
        }
    }

    Ok(())
}
