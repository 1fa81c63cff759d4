//! Shared state handed to every handler

use crate::config::Config;
use crate::history::HistoryStore;

/// Application context shared by all handlers through the dispatcher
#[derive(Debug)]
pub struct AppContext {
    pub config: Config,
    pub history: HistoryStore,
}

impl AppContext {
    pub fn new(config: Config) -> Self {
        let history = HistoryStore::new(config.history_path.clone(), config.operator_id);
        Self { config, history }
    }
}
