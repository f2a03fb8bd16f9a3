//! Knowledge Base
//!
//! Small persisted store of learned snippets keyed by source. Load and save
//! failures are logged and otherwise ignored.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::conductor::memory::write_json_atomic;

/// Stored content is cut to this many characters
pub const MAX_CONTENT_CHARS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub content: String,
    pub learned_at: String,
}

/// A search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeMatch {
    pub source: String,
    pub content: String,
}

#[derive(Debug, Default)]
pub struct KnowledgeBase {
    entries: BTreeMap<String, KnowledgeEntry>,
    path: Option<PathBuf>,
}

impl KnowledgeBase {
    /// Knowledge base that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the knowledge base stored at `path`, starting empty when the file
    /// is missing or unreadable
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load(&path).unwrap_or_default();
        Self {
            entries,
            path: Some(path),
        }
    }

    /// Record `content` under `source`, replacing any earlier entry
    pub fn learn(&mut self, source: &str, content: &str) {
        let content = if content.chars().count() > MAX_CONTENT_CHARS {
            let cut: String = content.chars().take(MAX_CONTENT_CHARS).collect();
            format!("{}...", cut)
        } else {
            content.to_string()
        };

        self.entries.insert(
            source.to_string(),
            KnowledgeEntry {
                content,
                learned_at: Local::now().to_rfc3339(),
            },
        );
        self.save();
    }

    /// Case-insensitive match over source and content
    pub fn search(&self, query: &str) -> Vec<KnowledgeMatch> {
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .filter(|(source, entry)| {
                source.to_lowercase().contains(&needle)
                    || entry.content.to_lowercase().contains(&needle)
            })
            .map(|(source, entry)| KnowledgeMatch {
                source: source.clone(),
                content: entry.content.clone(),
            })
            .collect()
    }

    pub fn all(&self) -> &BTreeMap<String, KnowledgeEntry> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn save(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = write_json_atomic(path, &self.entries) {
            warn!(error = %e, "Failed to save knowledge base");
        }
    }
}

fn load(path: &Path) -> Option<BTreeMap<String, KnowledgeEntry>> {
    if !path.exists() {
        return None;
    }

    let parsed = fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()));

    match parsed {
        Ok(entries) => {
            debug!(path = %path.display(), "Loaded knowledge base");
            Some(entries)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring unreadable knowledge base");
            None
        }
    }
}
