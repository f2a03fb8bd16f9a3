//! Planning Rules
//!
//! Deterministic intent detection. Each [`Rule`] pairs a predicate over the
//! lower-cased task text with a function that emits step templates. The
//! [`RuleEngine`] walks the table in priority order:
//!
//! - a matching `Terminal` rule emits its steps and ends evaluation
//! - every matching `Independent` rule emits its steps
//! - only the first matching `Exclusive` rule emits its steps
//!
//! When nothing matched, a single low-confidence `general` step is emitted so
//! every task contributes at least one step.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use sdk::Parameters;
use tracing::debug;

use crate::conductor::types::{Mode, PlanStep, GENERAL_ACTION};

const GREETINGS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "greetings",
    "who are you?",
    "who are you",
    "what are you?",
];
const ANALYST_KEYWORDS: &[&str] = &["data", "summary", "csv", "analyze"];
const RESEARCHER_KEYWORDS: &[&str] = &["find", "search", "who", "what", "news"];
const LIST_KEYWORDS: &[&str] = &["list file", "show file", "files in"];
const READ_KEYWORDS: &[&str] = &["read", "content of", "show content", "cat "];
const SEARCH_KEYWORDS: &[&str] = &[
    "search", "find", "look up", "google", "who is", "what is", "news", "how to",
];
const ARITHMETIC_OPERATORS: &[char] = &['+', '-', '*', '/'];
const MATH_FUNCTIONS: &[&str] = &["sqrt", "pow"];
const CALCULATOR_BLOCKERS: &[&str] = &["search", "time", "date"];

/// Words that follow "files in" without naming a directory
const NON_PATH_WORDS: &[&str] = &["the", "this", "my", "current", "here", "a"];

const DEFAULT_CSV: &str = "data.csv";
const DEFAULT_ANALYSIS_FILE: &str = "requirements.txt";

const FALLBACK_CONFIDENCE: f64 = 0.1;

static LIST_TARGET: OnceLock<Regex> = OnceLock::new();
static SEARCH_PREFIX: OnceLock<Regex> = OnceLock::new();
static CALCULATE_PREFIX: OnceLock<Regex> = OnceLock::new();

fn list_target_pattern() -> &'static Regex {
    LIST_TARGET.get_or_init(|| {
        Regex::new(r"(?i)(?:\bfiles\s+in|\bls)\s+(\S+)").expect("Invalid list target pattern")
    })
}

fn search_prefix_pattern() -> &'static Regex {
    SEARCH_PREFIX
        .get_or_init(|| Regex::new(r"(?i)^\s*search\s+for\b").expect("Invalid search pattern"))
}

fn calculate_prefix_pattern() -> &'static Regex {
    CALCULATE_PREFIX
        .get_or_init(|| Regex::new(r"(?i)^\s*calculate\b").expect("Invalid calculate pattern"))
}

/// A task string prepared for rule evaluation
#[derive(Debug, Clone)]
pub struct TaskText<'a> {
    raw: &'a str,
    lower: String,
    mode: Mode,
}

impl<'a> TaskText<'a> {
    pub fn new(raw: &'a str, mode: Mode) -> Self {
        Self {
            raw,
            lower: raw.to_lowercase().trim().to_string(),
            mode,
        }
    }

    pub fn raw(&self) -> &'a str {
        self.raw
    }

    pub fn lower(&self) -> &str {
        &self.lower
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lower.contains(needle)
    }

    pub fn contains_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.lower.contains(n))
    }

    /// True when `word` appears as a standalone word
    pub fn has_word(&self, word: &str) -> bool {
        self.lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|w| w == word)
    }
}

/// How a matching rule interacts with the rest of the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Emits and stops evaluation for this task
    Terminal,
    /// Emits alongside anything else that matches
    Independent,
    /// Emits only if no earlier exclusive rule has
    Exclusive,
}

/// A plan step before it has been numbered
#[derive(Debug, Clone, PartialEq)]
pub struct StepTemplate {
    pub action: String,
    pub description: String,
    pub parameters: Parameters,
    pub confidence: f64,
    pub reasoning: String,
}

impl StepTemplate {
    pub fn new(
        action: &str,
        description: impl Into<String>,
        parameters: Parameters,
        confidence: f64,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            action: action.to_string(),
            description: description.into(),
            parameters,
            confidence,
            reasoning: reasoning.into(),
        }
    }

    fn general(
        description: &str,
        response: impl Into<String>,
        confidence: f64,
        reasoning: &str,
    ) -> Self {
        Self::new(
            GENERAL_ACTION,
            description,
            Parameters::new().with("response", response.into()),
            confidence,
            reasoning,
        )
    }

    pub fn into_step(self, index: usize) -> PlanStep {
        PlanStep {
            index,
            action: self.action,
            description: self.description,
            parameters: self.parameters,
            confidence: self.confidence,
            reasoning: self.reasoning,
            critical: false,
        }
    }
}

/// One entry of the planning table
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub priority: u16,
    pub kind: RuleKind,
    pub matches: fn(&TaskText<'_>) -> bool,
    pub emit: fn(&TaskText<'_>) -> Vec<StepTemplate>,
}

impl Rule {
    pub fn applies(&self, task: &TaskText<'_>) -> bool {
        (self.matches)(task)
    }

    pub fn steps(&self, task: &TaskText<'_>) -> Vec<StepTemplate> {
        (self.emit)(task)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("kind", &self.kind)
            .finish()
    }
}

/// The built-in planning table, highest priority first
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule {
            name: "analyst_mode",
            priority: 10,
            kind: RuleKind::Terminal,
            matches: |t| t.mode() == Mode::Analyst && t.contains_any(ANALYST_KEYWORDS),
            emit: |t| {
                let path = filename_token(t.raw()).unwrap_or_else(|| DEFAULT_CSV.to_string());
                vec![StepTemplate::new(
                    "data",
                    "Perform statistical analysis in Analyst mode",
                    Parameters::new()
                        .with("operation", "summarize_csv")
                        .with("path", path),
                    0.95,
                    "Analyst mode prioritizes data tools",
                )]
            },
        },
        Rule {
            name: "researcher_mode",
            priority: 20,
            kind: RuleKind::Terminal,
            matches: |t| t.mode() == Mode::Researcher && t.contains_any(RESEARCHER_KEYWORDS),
            emit: |t| {
                vec![
                    StepTemplate::new(
                        "web_search",
                        "Deep research via Web Search",
                        Parameters::new().with("query", t.raw()),
                        0.99,
                        "Researcher mode maximizes search depth",
                    ),
                    StepTemplate::general(
                        "Synthesize research findings",
                        "I've completed the research. Based on the search results, here is a detailed synthesis...",
                        0.8,
                        "Researchers always synthesize information",
                    ),
                ]
            },
        },
        Rule {
            name: "greeting",
            priority: 30,
            kind: RuleKind::Terminal,
            matches: |t| GREETINGS.contains(&t.lower()),
            emit: |t| {
                vec![StepTemplate::general(
                    "Reply to greeting/persona",
                    format!(
                        "I am Nexus AI, currently operating in {} mode. How can I help?",
                        t.mode()
                    ),
                    1.0,
                    "Detected greeting/persona content",
                )]
            },
        },
        Rule {
            name: "analyze_files",
            priority: 40,
            kind: RuleKind::Terminal,
            matches: |t| t.contains("analyze") && (t.contains("file") || t.contains("data")),
            emit: |t| {
                let mut steps = Vec::new();
                if t.contains("list") {
                    steps.push(StepTemplate::new(
                        "file",
                        "List files for inventory",
                        Parameters::new().with("operation", "list").with("path", "."),
                        0.9,
                        "User asked to list and analyze",
                    ));
                }

                let path =
                    filename_token(t.raw()).unwrap_or_else(|| DEFAULT_ANALYSIS_FILE.to_string());
                steps.push(StepTemplate::new(
                    "file",
                    "Read file for analysis",
                    Parameters::new()
                        .with("operation", "read")
                        .with("path", path.clone()),
                    0.8,
                    "Analysis requires reading file content",
                ));
                steps.push(StepTemplate::general(
                    "Summarize analysis",
                    format!(
                        "I've analyzed the files. The contents of {} are shown above. Let me know if you need specific details from them.",
                        path
                    ),
                    0.7,
                    "Providing summary of read operation",
                ));
                steps
            },
        },
        Rule {
            name: "time",
            priority: 50,
            kind: RuleKind::Independent,
            matches: |t| t.contains("time"),
            emit: |_| {
                vec![StepTemplate::new(
                    "system",
                    "Get current time",
                    Parameters::new().with("action", "time"),
                    0.95,
                    "Keyword 'time' found",
                )]
            },
        },
        Rule {
            name: "date",
            priority: 60,
            kind: RuleKind::Independent,
            matches: |t| t.contains("date"),
            emit: |_| {
                vec![StepTemplate::new(
                    "system",
                    "Get current date",
                    Parameters::new().with("action", "date"),
                    0.95,
                    "Keyword 'date' found",
                )]
            },
        },
        Rule {
            name: "list_files",
            priority: 70,
            kind: RuleKind::Exclusive,
            matches: |t| t.contains_any(LIST_KEYWORDS) || t.has_word("ls"),
            emit: |t| {
                let path = list_target(t.raw()).unwrap_or_else(|| ".".to_string());
                vec![StepTemplate::new(
                    "file",
                    format!("List files in {}", path),
                    Parameters::new().with("operation", "list").with("path", path),
                    0.9,
                    "Detected file listing intent",
                )]
            },
        },
        Rule {
            name: "read_file",
            priority: 80,
            kind: RuleKind::Exclusive,
            matches: |t| t.contains_any(READ_KEYWORDS),
            emit: |t| {
                let path = filename_token(t.raw())
                    .or_else(|| last_token(t.raw()))
                    .unwrap_or_else(|| ".".to_string());
                vec![StepTemplate::new(
                    "file",
                    format!("Read file: {}", path),
                    Parameters::new()
                        .with("operation", "read")
                        .with("path", path.clone()),
                    0.85,
                    format!("Detected read intent for {}", path),
                )]
            },
        },
        Rule {
            name: "web_search",
            priority: 90,
            kind: RuleKind::Exclusive,
            matches: |t| {
                t.contains_any(SEARCH_KEYWORDS) && !(t.contains("time") || t.contains("date"))
            },
            emit: |t| {
                let query = clean_search_query(t.raw());
                vec![StepTemplate::new(
                    "web_search",
                    format!("Search the web for: {}", query),
                    Parameters::new().with("query", query),
                    0.8,
                    "Detected informational query",
                )]
            },
        },
        Rule {
            name: "calculator",
            priority: 100,
            kind: RuleKind::Exclusive,
            matches: |t| {
                (t.raw().contains(ARITHMETIC_OPERATORS) || t.contains_any(MATH_FUNCTIONS))
                    && !t.contains_any(CALCULATOR_BLOCKERS)
            },
            emit: |t| {
                let expression = clean_expression(t.raw());
                vec![StepTemplate::new(
                    "calculator",
                    format!("Calculate: {}", expression),
                    Parameters::new().with("expression", expression),
                    0.9,
                    "Detected mathematical expression",
                )]
            },
        },
    ]
}

/// Evaluates the planning table for one task string
#[derive(Debug)]
pub struct RuleEngine {
    rules: Vec<Rule>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    /// Build an engine over a custom table; rules are ordered by priority
    pub fn with_rules(mut rules: Vec<Rule>) -> Self {
        rules.sort_by_key(|r| r.priority);
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Plan one task string.
    ///
    /// Steps are numbered from `offset + 1`, so callers planning several
    /// sub-tasks pass the number of steps already in the plan.
    pub fn plan(
        &self,
        task: &str,
        available_actions: &[String],
        mode: Mode,
        offset: usize,
    ) -> Vec<PlanStep> {
        let text = TaskText::new(task, mode);
        let mut templates = Vec::new();
        let mut exclusive_taken = false;

        for rule in &self.rules {
            if rule.kind == RuleKind::Exclusive && exclusive_taken {
                continue;
            }
            if !rule.applies(&text) {
                continue;
            }

            debug!(rule = rule.name, "Planning rule matched");
            templates.extend(rule.steps(&text));

            match rule.kind {
                RuleKind::Terminal => break,
                RuleKind::Exclusive => exclusive_taken = true,
                RuleKind::Independent => {}
            }
        }

        if templates.is_empty() {
            templates.push(fallback(&text));
        }

        for template in &templates {
            if template.action != GENERAL_ACTION
                && !available_actions.iter().any(|a| a == &template.action)
            {
                debug!(
                    action = %template.action,
                    "Planned action has no registered tool"
                );
            }
        }

        templates
            .into_iter()
            .enumerate()
            .map(|(i, template)| template.into_step(offset + i + 1))
            .collect()
    }
}

fn fallback(task: &TaskText<'_>) -> StepTemplate {
    StepTemplate::general(
        "General response",
        format!(
            "Nexus AI ({}): I couldn't map '{}' to a tool. I can deep research, analyze data, and manage your files.",
            task.mode(),
            task.raw()
        ),
        FALLBACK_CONFIDENCE,
        "No specific intent matched",
    )
}

fn clean_token(word: &str) -> &str {
    word.trim_matches(|c| c == '"' || c == '\'')
        .trim_end_matches(['?', '!', ',', ';', ':', '.'])
}

/// First token that looks like a file name: contains a dot and is longer than
/// two characters.
fn filename_token(raw: &str) -> Option<String> {
    raw.split_whitespace()
        .filter(|word| word.contains('.') && word.chars().count() > 2)
        .map(clean_token)
        .find(|cleaned| cleaned.contains('.'))
        .map(String::from)
}

fn last_token(raw: &str) -> Option<String> {
    raw.split_whitespace()
        .last()
        .map(clean_token)
        .filter(|t| !t.is_empty())
        .map(String::from)
}

/// Directory named after "files in" or "ls"
fn list_target(raw: &str) -> Option<String> {
    let caps = list_target_pattern().captures(raw)?;
    let target = clean_token(caps.get(1)?.as_str());
    if target.is_empty() || NON_PATH_WORDS.contains(&target.to_lowercase().as_str()) {
        return None;
    }
    Some(target.to_string())
}

fn clean_search_query(raw: &str) -> String {
    let unquoted = raw.replace('"', "");
    search_prefix_pattern()
        .replace(&unquoted, "")
        .trim()
        .to_string()
}

fn clean_expression(raw: &str) -> String {
    let unquoted = raw.replace('"', "");
    calculate_prefix_pattern()
        .replace(&unquoted, "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}
