//! Session
//!
//! The request boundary. A [`Session`] owns everything one query needs (the
//! planner and its log, the shared tool registry, conversation memory and the
//! knowledge base) and is passed to each front end instead of living in a
//! global. Locks are only held for synchronous sections, never across an
//! await, so a session can be shared between concurrent API requests.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::conductor::executor::Executor;
use crate::conductor::memory::{ConversationMemory, Role};
use crate::conductor::planner::Planner;
use crate::conductor::synthesizer;
use crate::conductor::types::{ExecutionRecord, Mode, PlanRecord, PlanStep};
use crate::knowledge::KnowledgeBase;
use crate::tools::ToolRegistry;
use sdk::EngineError;

/// Characters of attached file content folded into the planning text
const FILE_CONTEXT_PREVIEW_CHARS: usize = 2000;

/// Optional request context supplied alongside a query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestContext {
    #[serde(default)]
    pub mode: Option<String>,

    /// Content of a file the user attached
    #[serde(default, alias = "fileContext")]
    pub file_context: Option<String>,
}

impl RequestContext {
    pub fn with_mode(mode: impl Into<String>) -> Self {
        Self {
            mode: Some(mode.into()),
            file_context: None,
        }
    }
}

/// Everything produced while answering one query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub query: String,
    pub response: String,
    pub plan: Vec<PlanStep>,
    #[serde(rename = "executionResults", alias = "execution_results")]
    pub execution_results: Vec<ExecutionRecord>,
    pub mode: Mode,
}

pub struct Session {
    /// Planner and its append-only log
    planner: Mutex<Planner>,

    /// Read-only tool registry shared with the executor
    registry: Arc<ToolRegistry>,

    executor: Executor,

    /// Conversation memory, the only state shared across requests
    memory: Arc<Mutex<ConversationMemory>>,

    knowledge: Mutex<KnowledgeBase>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Session {
    pub fn new(
        registry: Arc<ToolRegistry>,
        memory: ConversationMemory,
        knowledge: KnowledgeBase,
    ) -> Self {
        Self {
            planner: Mutex::new(Planner::new()),
            executor: Executor::new(Arc::clone(&registry)),
            registry,
            memory: Arc::new(Mutex::new(memory)),
            knowledge: Mutex::new(knowledge),
        }
    }

    /// Build a session from configuration, loading memory and knowledge
    /// from the data directory
    pub fn from_config(config: &Config) -> Result<Self, EngineError> {
        let registry = Arc::new(ToolRegistry::from_config(config)?);
        let memory = ConversationMemory::open(config.memory_path(), config.memory.max_history);
        let knowledge = KnowledgeBase::open(config.knowledge_path());

        info!(
            tools = registry.len(),
            interactions = memory.len(),
            "Session ready"
        );

        Ok(Self::new(registry, memory, knowledge))
    }

    /// Plan, execute and answer one query.
    ///
    /// Never fails: tool faults end up in the execution log and persistence
    /// faults are logged.
    pub async fn process_query(&self, query: &str, context: RequestContext) -> QueryResponse {
        let mode = context
            .mode
            .as_deref()
            .map(Mode::from_name)
            .unwrap_or_default();
        debug!(mode = %mode, persona = mode.persona(), "Processing query");

        let file_context = context
            .file_context
            .as_deref()
            .filter(|content| !content.trim().is_empty());

        let planning_text = match file_context {
            Some(content) => {
                let preview: String = content.chars().take(FILE_CONTEXT_PREVIEW_CHARS).collect();
                format!(
                    "[File Context Attached]\n{}\n\nRelevant Data:\n{}",
                    query, preview
                )
            }
            None => query.to_string(),
        };

        let mut user_meta = Map::new();
        user_meta.insert("mode".to_string(), Value::from(mode.as_str()));
        user_meta.insert("has_file".to_string(), Value::from(file_context.is_some()));
        self.record(Role::User, query.to_string(), user_meta).await;

        let plan = lock(&self.planner).create_plan(&planning_text, &self.registry.names(), mode);

        let records = self
            .executor
            .run_with_file_context(&plan, file_context)
            .await;
        let response = synthesizer::synthesize(&plan, &records);

        let mut assistant_meta = Map::new();
        assistant_meta.insert("mode".to_string(), Value::from(mode.as_str()));
        assistant_meta.insert("steps".to_string(), Value::from(plan.len()));
        assistant_meta.insert(
            "successful_steps".to_string(),
            Value::from(records.iter().filter(|r| r.success).count()),
        );
        self.record(Role::Assistant, response.clone(), assistant_meta).await;

        QueryResponse {
            query: query.to_string(),
            response,
            plan,
            execution_results: records,
            mode,
        }
    }

    /// Append an interaction on the blocking pool.
    ///
    /// The append and its disk write happen under one lock, so writes land
    /// in the same order as the appends.
    async fn record(&self, role: Role, content: String, metadata: Map<String, Value>) {
        let memory = Arc::clone(&self.memory);
        let appended = tokio::task::spawn_blocking(move || {
            lock(memory.as_ref()).append(role, content, metadata);
        })
        .await;

        if let Err(e) = appended {
            warn!(error = %e, "Failed to record interaction");
        }
    }

    /// Clear conversation memory on the blocking pool
    pub async fn clear_memory(&self) {
        let memory = Arc::clone(&self.memory);
        let cleared = tokio::task::spawn_blocking(move || {
            lock(memory.as_ref()).clear();
        })
        .await;

        if let Err(e) = cleared {
            warn!(error = %e, "Failed to clear memory");
        }
    }

    pub fn memory(&self) -> MutexGuard<'_, ConversationMemory> {
        lock(self.memory.as_ref())
    }

    pub fn knowledge(&self) -> MutexGuard<'_, KnowledgeBase> {
        lock(&self.knowledge)
    }

    /// Snapshot of every plan created in this session
    pub fn plan_history(&self) -> Vec<PlanRecord> {
        lock(&self.planner).history().to_vec()
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }
}
