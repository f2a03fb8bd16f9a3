//! Conductor data model shared by the planner, executor and synthesizer.

use sdk::types::value_to_text;
use sdk::Parameters;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Action id for steps answered directly from their `response` parameter
pub const GENERAL_ACTION: &str = "general";

/// Operating persona that can short-circuit normal rule evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Standard,
    Analyst,
    Researcher,
    Creative,
}

impl Mode {
    /// Parse a mode name. Unknown names fall back to `Standard`.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "Analyst" => Mode::Analyst,
            "Researcher" => Mode::Researcher,
            "Creative" => Mode::Creative,
            _ => Mode::Standard,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Standard => "Standard",
            Mode::Analyst => "Analyst",
            Mode::Researcher => "Researcher",
            Mode::Creative => "Creative",
        }
    }

    /// Persona text applied for this mode
    pub fn persona(&self) -> &'static str {
        match self {
            Mode::Standard => "You are a helpful and efficient agentic assistant.",
            Mode::Analyst => {
                "You are a data-driven Analyst. Focus on statistics, trends, and detailed data summaries."
            }
            Mode::Researcher => {
                "You are a thorough Researcher. Focus on exhaustive web searches, citing sources, and providing deep context."
            }
            Mode::Creative => {
                "You are a Creative assistant. Focus on brainstorming, innovative solutions, and engaging, descriptive responses."
            }
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single typed action in a plan.
///
/// `index` is 1-based and contiguous across the whole plan, including steps
/// contributed by every quoted sub-task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    pub index: usize,
    pub action: String,
    pub description: String,
    pub parameters: Parameters,
    pub confidence: f64,
    pub reasoning: String,
    #[serde(default)]
    pub critical: bool,
}

/// Entry in the planner's append-only log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRecord {
    pub task: String,
    pub mode: Mode,
    pub steps: Vec<PlanStep>,
}

/// Outcome of one executed step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Success,
    Error,
    Skipped,
}

/// Immutable record of one executed step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub index: usize,
    pub action: String,
    pub description: String,
    pub parameters: Parameters,
    pub status: StepStatus,
    pub success: bool,
    pub result: Option<Value>,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

impl ExecutionRecord {
    pub(crate) fn new(step: &PlanStep, parameters: Parameters, outcome: StepOutcome) -> Self {
        let (status, result, error, trace) = match outcome {
            StepOutcome::Success(value) => (StepStatus::Success, Some(value), None, None),
            StepOutcome::Error { message, trace } => (StepStatus::Error, None, Some(message), trace),
            StepOutcome::Skipped(reason) => {
                (StepStatus::Skipped, Some(Value::String(reason)), None, None)
            }
        };

        Self {
            index: step.index,
            action: step.action.clone(),
            description: step.description.clone(),
            parameters,
            status,
            success: status == StepStatus::Success,
            result,
            error,
            trace,
        }
    }

    /// String form stored in the result map and used by the synthesizer.
    ///
    /// Failed steps contribute their error message.
    pub fn result_text(&self) -> String {
        match (&self.result, &self.error) {
            (Some(value), _) => value_to_text(value),
            (None, Some(error)) => error.clone(),
            (None, None) => String::new(),
        }
    }
}

/// What happened when a step ran
#[derive(Debug, Clone)]
pub(crate) enum StepOutcome {
    Success(Value),
    Error {
        message: String,
        trace: Option<String>,
    },
    Skipped(String),
}

/// Results of already-executed steps in the current request, keyed by step index
pub type ResultMap = BTreeMap<usize, String>;
