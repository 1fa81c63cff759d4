//! Router module: decides how the bot answers each inbound event
//!
//! Everything here is transport free. The teloxide handlers turn updates
//! into [`Inbound`] events, call the router with the chat's current
//! [`ConversationState`], then store the returned state and send the
//! returned [`Reply`] list.
//!
//! A command received while an expression is awaited cancels the pending
//! calculation and is handled as in the idle state.

use tracing::{debug, error, info, warn};

use crate::dialogue::{calculate, ConversationState};
use crate::expression::format_number;
use crate::history::HistoryEntry;
use crate::localization::{get_localization_manager, t_args_lang, t_lang};
use crate::payments::{
    check_pre_checkout, find_tariff, format_amount, tariff_from_payload, Invoice, PreCheckout,
    Tariff, DEFAULT_TARIFF, PAYLOAD_PREFIX,
};

use super::commands::Command;
use super::context::AppContext;
use super::ui_builder::{
    calculator_inline_keyboard, CALC_CALLBACK, format_history_list, main_keyboard, tariffs_keyboard,
};

/// Who sent an inbound event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub user_id: u64,
    pub language_code: Option<String>,
}

impl Sender {
    fn lang(&self) -> Option<&str> {
        self.language_code.as_deref()
    }
}

/// An inbound message event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Text(String),
    PaymentReceived {
        payload: String,
        currency: String,
        total_amount: u64,
    },
}

/// Keyboard attached to an outbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    /// Reply keyboard, rows of button labels
    Reply(Vec<Vec<String>>),
    /// Inline keyboard, rows of `(label, callback data)`
    Inline(Vec<Vec<(String, String)>>),
}

/// An outbound action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    WithKeyboard { text: String, keyboard: Keyboard },
    Invoice(Invoice),
}

/// The conversation state to store and the replies to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub state: ConversationState,
    pub replies: Vec<Reply>,
}

impl Outcome {
    fn new(state: ConversationState, replies: Vec<Reply>) -> Self {
        Self { state, replies }
    }

    fn idle(reply: Reply) -> Self {
        Self::new(ConversationState::Idle, vec![reply])
    }
}

/// Answer to a pre-checkout query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreCheckoutAnswer {
    Approve,
    Reject(String),
}

/// Handle a message sent to the bot
pub fn on_message(
    ctx: &AppContext,
    state: ConversationState,
    sender: &Sender,
    inbound: Inbound,
) -> Outcome {
    match inbound {
        Inbound::Text(text) => on_text(ctx, state, sender, &text),
        Inbound::PaymentReceived {
            payload,
            currency,
            total_amount,
        } => {
            info!(user_id = sender.user_id, payload = %payload, total_amount, "Payment received");
            let tariff = tariff_from_payload(&payload)
                .map(|tariff| t_lang(&tariff.title_key(), sender.lang()))
                .unwrap_or(payload);
            let amount = format_amount(total_amount, &currency);
            let text = t_args_lang(
                "payment-success",
                &[("tariff", &tariff), ("amount", &amount)],
                sender.lang(),
            );
            Outcome::new(state, vec![Reply::Text(text)])
        }
    }
}

/// Handle an inline keyboard button press
pub fn on_callback(
    ctx: &AppContext,
    state: ConversationState,
    sender: &Sender,
    data: &str,
) -> Outcome {
    if data == CALC_CALLBACK {
        return prompt_expression(sender.lang());
    }

    if data.starts_with(PAYLOAD_PREFIX) {
        return match tariff_from_payload(data) {
            Some(tariff) => Outcome::idle(Reply::Invoice(build_invoice(ctx, tariff, sender))),
            None => {
                warn!(user_id = sender.user_id, data, "Callback for unknown tariff");
                Outcome::idle(Reply::Text(t_lang("tariff-unknown", sender.lang())))
            }
        };
    }

    debug!(user_id = sender.user_id, data, "Ignoring unknown callback data");
    Outcome::new(state, Vec::new())
}

/// Decide whether a pre-checkout query can proceed
pub fn on_pre_checkout(ctx: &AppContext, sender: &Sender, query: &PreCheckout) -> PreCheckoutAnswer {
    match check_pre_checkout(query, &ctx.config.currency) {
        Ok(tariff) => {
            info!(user_id = sender.user_id, tariff = tariff.id, "Pre-checkout approved");
            PreCheckoutAnswer::Approve
        }
        Err(e) => {
            warn!(user_id = sender.user_id, error = %e, "Pre-checkout rejected");
            PreCheckoutAnswer::Reject(t_lang("payment-rejected", sender.lang()))
        }
    }
}

fn on_text(ctx: &AppContext, state: ConversationState, sender: &Sender, text: &str) -> Outcome {
    match command_for(text) {
        Some(command) => {
            if state == ConversationState::AwaitingExpression {
                debug!(user_id = sender.user_id, command = ?command, "Command cancels pending calculation");
            }
            on_command(ctx, sender, command)
        }
        None => match state {
            ConversationState::AwaitingExpression => run_calculation(ctx, sender, text),
            ConversationState::Idle => Outcome::idle(Reply::Text(text.to_string())),
        },
    }
}

/// Slash commands and reply keyboard buttons
fn command_for(text: &str) -> Option<Command> {
    if let Some(command) = Command::parse(text) {
        return Some(command);
    }

    let manager = get_localization_manager();
    let text = text.trim();
    if manager.matches_any_language("button-calculator", text) {
        Some(Command::Calc(None))
    } else if manager.matches_any_language("button-tariffs", text) {
        Some(Command::Tariffs)
    } else {
        None
    }
}

fn on_command(ctx: &AppContext, sender: &Sender, command: Command) -> Outcome {
    let lang = sender.lang();

    match command {
        Command::Start => {
            let text = [
                t_lang("welcome-title", lang),
                t_lang("welcome-description", lang),
                t_lang("welcome-hint", lang),
            ]
            .join("\n\n");
            Outcome::idle(Reply::WithKeyboard {
                text,
                keyboard: main_keyboard(lang),
            })
        }
        Command::Help => {
            let text = [
                "help-title",
                "help-start",
                "help-help",
                "help-calc",
                "help-tariffs",
                "help-pay",
                "help-echo",
            ]
            .iter()
            .map(|key| t_lang(key, lang))
            .collect::<Vec<_>>()
            .join("\n");
            Outcome::idle(Reply::WithKeyboard {
                text,
                keyboard: calculator_inline_keyboard(lang),
            })
        }
        Command::Calc(None) => prompt_expression(lang),
        Command::Calc(Some(expression)) => run_calculation(ctx, sender, &expression),
        Command::History => {
            let text = match ctx.history.list_for(sender.user_id) {
                Ok(entries) => format_history_list(&entries, lang),
                Err(_) => t_lang("history-access-denied", lang),
            };
            Outcome::idle(Reply::Text(text))
        }
        Command::Pay => match find_tariff(DEFAULT_TARIFF) {
            Some(tariff) => Outcome::idle(Reply::Invoice(build_invoice(ctx, tariff, sender))),
            None => Outcome::idle(Reply::Text(t_lang("tariff-unknown", lang))),
        },
        Command::Tariffs => Outcome::idle(Reply::WithKeyboard {
            text: t_lang("tariffs-title", lang),
            keyboard: tariffs_keyboard(&ctx.config.currency, lang),
        }),
        Command::Unknown(name) => Outcome::idle(Reply::Text(t_args_lang(
            "unknown-command",
            &[("command", &name)],
            lang,
        ))),
    }
}

fn prompt_expression(lang: Option<&str>) -> Outcome {
    Outcome::new(
        ConversationState::AwaitingExpression,
        vec![Reply::Text(t_lang("calc-prompt", lang))],
    )
}

/// Evaluate an expression, record it and go back to idle whatever happens
fn run_calculation(ctx: &AppContext, sender: &Sender, expression: &str) -> Outcome {
    match calculate(expression) {
        Ok(calculation) => {
            debug!(user_id = sender.user_id, result = calculation.result, "Expression evaluated");

            let entry = HistoryEntry {
                user: sender.user_id,
                numbers: calculation.numbers,
                result: calculation.result,
            };
            if let Err(e) = ctx.history.append(entry) {
                error!(user_id = sender.user_id, error = %e, "Failed to record calculation history");
            }

            Outcome::idle(Reply::Text(format_number(calculation.result)))
        }
        Err(e) => {
            debug!(user_id = sender.user_id, error = %e, "Expression rejected");
            Outcome::idle(Reply::Text(t_lang("calc-error", sender.lang())))
        }
    }
}

fn build_invoice(ctx: &AppContext, tariff: &Tariff, sender: &Sender) -> Invoice {
    let title = t_lang(&tariff.title_key(), sender.lang());
    Invoice {
        description: t_lang(&tariff.description_key(), sender.lang()),
        payload: tariff.payload(),
        currency: ctx.config.currency.clone(),
        label: title.clone(),
        amount: tariff.amount,
        title,
    }
}
