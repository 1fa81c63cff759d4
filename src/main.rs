use anyhow::{Context, Result};
use std::sync::Arc;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use calc_bot::bot::{
    callback_handler, message_handler, pre_checkout_handler, register_commands, AppContext,
};
use calc_bot::config::Config;
use calc_bot::dialogue::ConversationState;
use calc_bot::localization::init_localization;

/// Initialize tracing, `LOG_FORMAT=json` switches to JSON lines
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_tracing();

    if let Err(e) = run().await {
        error!("Bot failed to start: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    info!("Starting calculator Telegram bot");

    let config = Config::from_env().context("Invalid configuration")?;
    init_localization().context("Failed to load translations")?;

    info!(
        history_path = %config.history_path.display(),
        operator_configured = config.operator_id.is_some(),
        currency = %config.currency,
        "Configuration loaded"
    );

    let bot = Bot::new(config.bot_token.clone());
    let ctx = Arc::new(AppContext::new(config));

    register_commands(&bot).await;

    info!("Bot initialized, starting dispatcher");

    let handler = dptree::entry()
        .branch(Update::filter_pre_checkout_query().endpoint(pre_checkout_handler))
        .branch(
            Update::filter_message()
                .enter_dialogue::<Message, InMemStorage<ConversationState>, ConversationState>()
                .endpoint(message_handler),
        )
        .branch(
            Update::filter_callback_query()
                .enter_dialogue::<CallbackQuery, InMemStorage<ConversationState>, ConversationState>()
                .endpoint(callback_handler),
        );

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![InMemStorage::<ConversationState>::new(), ctx])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
