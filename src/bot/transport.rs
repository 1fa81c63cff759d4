//! Glue between router decisions and the Telegram Bot API

use anyhow::{Context, Result};
use teloxide::prelude::*;
use teloxide::types::{BotCommand, LabeledPrice, User};
use tracing::{debug, warn};

use crate::dialogue::{CalcDialogue, ConversationState};
use crate::localization::t_lang;

use super::context::AppContext;
use super::router::{Outcome, Reply, Sender};
use super::ui_builder::to_reply_markup;

impl From<&User> for Sender {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.0,
            language_code: user.language_code.clone(),
        }
    }
}

/// Store the new conversation state and send every reply to `chat_id`
pub async fn apply_outcome(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: &CalcDialogue,
    ctx: &AppContext,
    outcome: Outcome,
) -> Result<()> {
    // Idle chats are dropped from storage, a missing entry reads as Idle
    match outcome.state {
        ConversationState::Idle => dialogue.exit().await?,
        state => dialogue.update(state).await?,
    }
    debug!(user_id = %chat_id, state = ?outcome.state, replies = outcome.replies.len(), "Dialogue updated");

    for reply in outcome.replies {
        send_reply(bot, chat_id, ctx, reply).await?;
    }

    Ok(())
}

async fn send_reply(bot: &Bot, chat_id: ChatId, ctx: &AppContext, reply: Reply) -> Result<()> {
    match reply {
        Reply::Text(text) => {
            bot.send_message(chat_id, text)
                .await
                .context("Failed to send message")?;
        }
        Reply::WithKeyboard { text, keyboard } => {
            bot.send_message(chat_id, text)
                .reply_markup(to_reply_markup(&keyboard))
                .await
                .context("Failed to send message with keyboard")?;
        }
        Reply::Invoice(invoice) => {
            let prices = vec![LabeledPrice {
                label: invoice.label,
                amount: invoice.amount,
            }];

            let mut req = bot.send_invoice(
                chat_id,
                invoice.title,
                invoice.description,
                invoice.payload,
                invoice.currency,
                prices,
            );
            req.provider_token = Some(ctx.config.payment_provider_token.clone());

            req.await.context("Failed to send invoice")?;
        }
    }

    Ok(())
}

/// Advertise the public commands in the Telegram command menu
pub async fn register_commands(bot: &Bot) {
    let commands = ["start", "help", "calc", "tariffs", "pay"]
        .iter()
        .map(|name| BotCommand::new(*name, t_lang(&format!("command-{name}"), None)))
        .collect::<Vec<_>>();

    if let Err(e) = bot.set_my_commands(commands).await {
        warn!(error = %e, "Failed to register bot commands");
    }
}
