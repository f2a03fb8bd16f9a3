//! Conductor System
//!
//! Turns a natural-language request into a plan, runs it against the tool
//! registry and reduces the outcome to one response.
//!
//! splitter → rules/planner → resolver → executor → synthesizer, with
//! conversation memory recorded around each request by the session.

pub mod executor;
pub mod memory;
pub mod planner;
pub mod resolver;
pub mod rules;
pub mod session;
pub mod splitter;
pub mod synthesizer;
pub mod types;

pub use executor::Executor;
pub use memory::{ConversationMemory, Interaction, MemoryStats, MemoryStore, Role};
pub use planner::Planner;
pub use rules::{Rule, RuleEngine, RuleKind, StepTemplate};
pub use session::{QueryResponse, RequestContext, Session};
pub use types::{ExecutionRecord, Mode, PlanRecord, PlanStep, ResultMap, StepStatus};
