//! Conversation Memory
//!
//! Bounded, durably persisted record of user and assistant interactions.
//!
//! The whole store is rewritten to disk after every mutation. Persistence
//! faults are logged and swallowed so they never interrupt a request; a
//! missing or malformed file on load leaves memory empty.

use chrono::Local;
use sdk::EngineError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Who produced an interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub role: Role,
    pub content: String,
    /// RFC 3339 generation time
    pub timestamp: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Interaction {
    pub fn new(role: Role, content: impl Into<String>, metadata: Map<String, Value>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Local::now().to_rfc3339(),
            metadata,
        }
    }
}

/// Persisted layout: `{ "history": [...], "context": {...} }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    pub history: Vec<Interaction>,
    #[serde(default)]
    pub context: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total_interactions: usize,
    pub first_interaction: Option<String>,
    pub last_interaction: Option<String>,
    pub role_distribution: BTreeMap<String, usize>,
    pub context_keys: Vec<String>,
}

#[derive(Serialize)]
struct ExportDocument<'a> {
    history: &'a [Interaction],
    context: &'a Map<String, Value>,
    stats: MemoryStats,
    exported_at: String,
}

#[derive(Debug)]
pub struct ConversationMemory {
    store: MemoryStore,
    max_history: usize,
    path: Option<PathBuf>,
}

impl ConversationMemory {
    /// Create an empty memory. Nothing is read from `path` until
    /// [`load_from_disk`](Self::load_from_disk) is called.
    pub fn new(path: Option<PathBuf>, max_history: usize) -> Self {
        Self {
            store: MemoryStore::default(),
            max_history: max_history.max(1),
            path,
        }
    }

    /// Memory that is never written to disk
    pub fn in_memory(max_history: usize) -> Self {
        Self::new(None, max_history)
    }

    /// Create a memory backed by `path` and load whatever it holds
    pub fn open(path: impl Into<PathBuf>, max_history: usize) -> Self {
        let mut memory = Self::new(Some(path.into()), max_history);
        memory.load_from_disk();
        memory
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.store.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.history.is_empty()
    }

    /// Record an interaction, evict the oldest beyond the bound, then persist
    pub fn append(&mut self, role: Role, content: impl Into<String>, metadata: Map<String, Value>) {
        self.store
            .history
            .push(Interaction::new(role, content, metadata));
        self.trim();
        self.persist_logged();
    }

    /// The most recent `limit` interactions in original order; all of them
    /// when `limit` is `None` or zero
    pub fn history(&self, limit: Option<usize>) -> &[Interaction] {
        let history = &self.store.history;
        match limit {
            Some(n) if n > 0 && n < history.len() => &history[history.len() - n..],
            _ => history,
        }
    }

    pub fn recent(&self, n: usize) -> &[Interaction] {
        let history = &self.store.history;
        &history[history.len().saturating_sub(n)..]
    }

    /// Reset history and context, persisting the empty state
    pub fn clear(&mut self) {
        self.store = MemoryStore::default();
        self.persist_logged();
    }

    pub fn context(&self) -> &Map<String, Value> {
        &self.store.context
    }

    pub fn set_context(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.store.context.insert(key.into(), value.into());
        self.persist_logged();
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Replace the in-memory state with the contents of durable storage.
    ///
    /// A missing or malformed file leaves memory empty.
    pub fn load_from_disk(&mut self) {
        let Some(path) = self.path.clone() else {
            return;
        };

        if !path.exists() {
            debug!(path = %path.display(), "No stored memory found");
            self.store = MemoryStore::default();
            return;
        }

        match read_store(&path) {
            Ok(store) => {
                self.store = store;
                self.trim();
                debug!(
                    path = %path.display(),
                    interactions = self.store.history.len(),
                    "Loaded conversation memory"
                );
            }
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable conversation memory");
                self.store = MemoryStore::default();
            }
        }
    }

    /// Write the full store to durable storage.
    ///
    /// The file is written next to its destination and renamed into place.
    pub fn persist(&self) -> Result<(), EngineError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        write_json_atomic(path, &self.store)
    }

    pub fn stats(&self) -> MemoryStats {
        let history = &self.store.history;
        let mut role_distribution = BTreeMap::new();
        for interaction in history {
            *role_distribution
                .entry(interaction.role.as_str().to_string())
                .or_insert(0) += 1;
        }

        MemoryStats {
            total_interactions: history.len(),
            first_interaction: history.first().map(|i| i.timestamp.clone()),
            last_interaction: history.last().map(|i| i.timestamp.clone()),
            role_distribution,
            context_keys: self.store.context.keys().cloned().collect(),
        }
    }

    /// Case-insensitive content search, newest first
    pub fn search(&self, query: &str, limit: usize) -> Vec<&Interaction> {
        let needle = query.to_lowercase();
        self.store
            .history
            .iter()
            .rev()
            .filter(|i| i.content.to_lowercase().contains(&needle))
            .take(limit)
            .collect()
    }

    /// Write history, context and stats to `path`
    pub fn export(&self, path: &Path) -> Result<(), EngineError> {
        let document = ExportDocument {
            history: &self.store.history,
            context: &self.store.context,
            stats: self.stats(),
            exported_at: Local::now().to_rfc3339(),
        };
        write_json_atomic(path, &document)
    }

    /// Replace history and context with the contents of an export.
    ///
    /// A missing file is a no-op; a malformed file is an error and leaves
    /// memory untouched.
    pub fn import(&mut self, path: &Path) -> Result<(), EngineError> {
        if !path.exists() {
            debug!(path = %path.display(), "Nothing to import");
            return Ok(());
        }

        self.store = read_store(path)?;
        self.trim();
        self.persist_logged();
        Ok(())
    }

    fn trim(&mut self) {
        let history = &mut self.store.history;
        if history.len() > self.max_history {
            let excess = history.len() - self.max_history;
            history.drain(..excess);
        }
    }

    fn persist_logged(&self) {
        if let Err(e) = self.persist() {
            warn!(error = %e, "Failed to persist conversation memory");
        }
    }
}

fn read_store(path: &Path) -> Result<MemoryStore, EngineError> {
    let content = fs::read_to_string(path).map_err(|e| EngineError::Persistence {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| EngineError::Persistence {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Serialize `value` as pretty JSON and atomically replace `path`
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), EngineError> {
    let persistence = |e: &dyn std::fmt::Display| EngineError::Persistence {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| persistence(&e))?;
    }

    let json = serde_json::to_string_pretty(value).map_err(|e| persistence(&e))?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json).map_err(|e| persistence(&e))?;
    fs::rename(&tmp, path).map_err(|e| persistence(&e))
}
