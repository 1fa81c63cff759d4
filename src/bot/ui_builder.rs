//! UI Builder module for creating keyboards and formatting messages

use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, ReplyMarkup,
};

// Import localization
use crate::localization::{t_args_lang, t_lang};

use crate::history::HistoryEntry;
use crate::payments::{format_amount, TARIFFS};

use super::router::Keyboard;

/// Number of most recent entries shown by `/history`
pub const HISTORY_PAGE_SIZE: usize = 20;

/// Callback data of the inline calculator button
pub const CALC_CALLBACK: &str = "calc";

/// Reply keyboard shown after `/start`
pub fn main_keyboard(language_code: Option<&str>) -> Keyboard {
    Keyboard::Reply(vec![vec![
        t_lang("button-calculator", language_code),
        t_lang("button-tariffs", language_code),
    ]])
}

/// Inline keyboard with a single calculator button
pub fn calculator_inline_keyboard(language_code: Option<&str>) -> Keyboard {
    Keyboard::Inline(vec![vec![(
        t_lang("button-calculator", language_code),
        CALC_CALLBACK.to_string(),
    )]])
}

/// Inline keyboard with one button per tariff
pub fn tariffs_keyboard(currency: &str, language_code: Option<&str>) -> Keyboard {
    let rows = TARIFFS
        .iter()
        .map(|tariff| {
            let title = t_lang(&tariff.title_key(), language_code);
            let price = format_amount(u64::from(tariff.amount), currency);
            let label = t_args_lang(
                "tariff-button",
                &[("title", &title), ("price", &price)],
                language_code,
            );
            vec![(label, tariff.payload())]
        })
        .collect();

    Keyboard::Inline(rows)
}

/// Format the most recent history entries as a list
pub fn format_history_list(entries: &[HistoryEntry], language_code: Option<&str>) -> String {
    if entries.is_empty() {
        return t_lang("history-empty", language_code);
    }

    let skip = entries.len().saturating_sub(HISTORY_PAGE_SIZE);
    let mut result = t_lang("history-title", language_code);
    for entry in &entries[skip..] {
        result.push('\n');
        result.push_str(&entry.to_string());
    }

    result
}

/// Convert a keyboard into Telegram reply markup
pub fn to_reply_markup(keyboard: &Keyboard) -> ReplyMarkup {
    match keyboard {
        Keyboard::Reply(rows) => {
            let buttons = rows
                .iter()
                .map(|row| row.iter().map(KeyboardButton::new).collect::<Vec<_>>())
                .collect::<Vec<_>>();
            ReplyMarkup::Keyboard(KeyboardMarkup::new(buttons).resize_keyboard())
        }
        Keyboard::Inline(rows) => {
            let buttons = rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|(label, data)| InlineKeyboardButton::callback(label, data))
                        .collect::<Vec<_>>()
                })
                .collect::<Vec<_>>();
            ReplyMarkup::InlineKeyboard(InlineKeyboardMarkup::new(buttons))
        }
    }
}
