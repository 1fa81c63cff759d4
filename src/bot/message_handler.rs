//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::debug;

use crate::dialogue::CalcDialogue;

use super::context::AppContext;
use super::router::{self, Inbound, Sender};
use super::transport::apply_outcome;

/// Extract the event the router cares about from a message
fn inbound_of(msg: &Message) -> Option<Inbound> {
    if let Some(payment) = msg.successful_payment() {
        return Some(Inbound::PaymentReceived {
            payload: payment.invoice_payload.clone(),
            currency: payment.currency.to_string(),
            total_amount: payment.total_amount as u64,
        });
    }

    msg.text().map(|text| Inbound::Text(text.to_string()))
}

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    dialogue: CalcDialogue,
    ctx: Arc<AppContext>,
) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        debug!(user_id = %msg.chat.id, "Ignoring message without sender");
        return Ok(());
    };
    let sender = Sender::from(user);

    let Some(inbound) = inbound_of(&msg) else {
        debug!(user_id = %msg.chat.id, "Ignoring unsupported message type");
        return Ok(());
    };

    let state = dialogue.get().await?.unwrap_or_default();
    debug!(user_id = %msg.chat.id, state = ?state, "Received message from user");

    let outcome = router::on_message(&ctx, state, &sender, inbound);
    apply_outcome(&bot, msg.chat.id, &dialogue, &ctx, outcome).await
}
