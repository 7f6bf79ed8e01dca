//! Search history kept as a JSON list, oldest first

use super::error::MediaError;
use super::MEDIA_LOG_TARGET;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const HISTORY_LIMIT: usize = 150;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub query: String,
    /// Last item played for this query
    pub id: String,
}

pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    /// Loads the history; a missing or unreadable file starts empty.
    pub fn load(path: &Path) -> Self {
        let entries = match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(target: MEDIA_LOG_TARGET, "Ignoring corrupt history file {}: {}", path.display(), e);
                Vec::new()
            }),
            Err(_) => Vec::new(),
        };
        HistoryStore { path: path.to_path_buf(), entries }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Queries newest first, for the search prompt.
    pub fn recent_queries(&self) -> Vec<String> {
        self.entries.iter().rev().map(|e| e.query.clone()).collect()
    }

    /// Moves `query` to the newest position with the item that was played.
    pub fn record(&mut self, query: &str, played_id: &str) {
        let lowered = query.to_lowercase();
        self.entries.retain(|e| e.query.to_lowercase() != lowered);
        self.entries.push(HistoryEntry {
            query: query.to_string(),
            id: played_id.to_string(),
        });
        if self.entries.len() > HISTORY_LIMIT {
            let excess = self.entries.len() - HISTORY_LIMIT;
            self.entries.drain(..excess);
        }
    }

    pub fn save(&self) -> Result<(), MediaError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.entries)?)?;
        Ok(())
    }
}
