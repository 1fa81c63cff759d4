//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::debug;

use crate::dialogue::CalcDialogue;

use super::context::AppContext;
use super::router::{self, Sender};
use super::transport::apply_outcome;

/// Handle callback queries from inline keyboards
pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    dialogue: CalcDialogue,
    ctx: Arc<AppContext>,
) -> Result<()> {
    debug!(user_id = %q.from.id, data = ?q.data, "Received callback query from user");

    // Answer the callback query to remove the loading state
    bot.answer_callback_query(q.id.clone()).await?;

    let sender = Sender::from(&q.from);
    let state = dialogue.get().await?.unwrap_or_default();
    let data = q.data.as_deref().unwrap_or("");

    let outcome = router::on_callback(&ctx, state, &sender, data);
    apply_outcome(&bot, dialogue.chat_id(), &dialogue, &ctx, outcome).await
}
