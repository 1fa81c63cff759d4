//! # History Module
//!
//! Append-only log of calculator results, stored as a single pretty-printed
//! JSON array:
//!
//! ```json
//! [
//!   { "user": 42, "numbers": [2.0, 2.0], "result": 4.0 }
//! ]
//! ```
//!
//! Every append reads the whole log, pushes the new entry and rewrites the
//! file. The rewrite goes through a temporary file renamed over the log, and
//! appends from this process are serialized by a mutex. Separate processes
//! sharing one log can still lose each other's updates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::expression::format_number;

/// One recorded calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Telegram id of the user who asked
    pub user: u64,
    /// Numbers the user typed, in order
    pub numbers: Vec<f64>,
    pub result: f64,
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let numbers = self
            .numbers
            .iter()
            .map(|n| format_number(*n))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}: {} = {}", self.user, numbers, format_number(self.result))
    }
}

/// Errors raised while writing the history log
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to write history log {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Returned when someone other than the operator asks for the history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("access to the history is restricted to the operator")]
pub struct AccessDenied;

/// JSON file backed history log
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    operator_id: Option<u64>,
    write_lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>, operator_id: Option<u64>) -> Self {
        Self {
            path: path.into(),
            operator_id,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every entry of the log
    ///
    /// A missing, unreadable or corrupt log reads as empty.
    pub fn load(&self) -> Vec<HistoryEntry> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "History log does not exist yet");
                return Vec::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read history log, treating it as empty");
                return Vec::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "History log is corrupt, treating it as empty");
                Vec::new()
            }
        }
    }

    /// Append an entry and rewrite the log
    pub fn append(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut entries = self.load();
        entries.push(entry);
        self.write_all(&entries)?;

        info!(path = %self.path.display(), entries = entries.len(), "History entry appended");
        Ok(())
    }

    /// Entries visible to `requester`
    ///
    /// Only the configured operator may read the log. Without an operator
    /// nobody can.
    pub fn list_for(&self, requester: u64) -> Result<Vec<HistoryEntry>, AccessDenied> {
        if self.operator_id != Some(requester) {
            warn!(user_id = requester, "History access denied");
            return Err(AccessDenied);
        }
        Ok(self.load())
    }

    fn write_all(&self, entries: &[HistoryEntry]) -> Result<(), HistoryError> {
        let io_error = |source: io::Error| HistoryError::Io {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp_file = NamedTempFile::new_in(dir).map_err(io_error)?;
        serde_json::to_writer_pretty(&mut temp_file, entries)?;
        temp_file.write_all(b"\n").map_err(io_error)?;
        temp_file.flush().map_err(io_error)?;
        temp_file
            .persist(&self.path)
            .map_err(|e| io_error(e.error))?;

        Ok(())
    }
}
