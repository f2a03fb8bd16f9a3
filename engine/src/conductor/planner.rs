//! Conductor Planner
//!
//! Turns a request into a numbered plan: the splitter yields independent
//! tasks, the rule engine plans each one, and step numbering continues across
//! tasks. Every plan is kept in an append-only log.

use crate::conductor::rules::RuleEngine;
use crate::conductor::splitter;
use crate::conductor::types::{Mode, PlanRecord, PlanStep};
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct Planner {
    engine: RuleEngine,
    log: Vec<PlanRecord>,
}

impl Planner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(engine: RuleEngine) -> Self {
        Self {
            engine,
            log: Vec::new(),
        }
    }

    /// Plan a full request, recording it in the planning log
    pub fn create_plan(
        &mut self,
        query: &str,
        available_actions: &[String],
        mode: Mode,
    ) -> Vec<PlanStep> {
        let tasks = splitter::split(query);
        if tasks.len() > 1 {
            debug!(count = tasks.len(), "Split request into independent tasks");
        }

        let mut steps: Vec<PlanStep> = Vec::new();
        for task in &tasks {
            let planned = self
                .engine
                .plan(task, available_actions, mode, steps.len());
            steps.extend(planned);
        }

        info!(steps = steps.len(), mode = %mode, "Created plan");

        self.log.push(PlanRecord {
            task: query.to_string(),
            mode,
            steps: steps.clone(),
        });

        steps
    }

    /// Hook for revising a plan from feedback. Plans are returned unchanged.
    pub fn refine(&self, plan: Vec<PlanStep>, feedback: &str) -> Vec<PlanStep> {
        debug!(feedback, "Plan refinement requested");
        plan
    }

    pub fn history(&self) -> &[PlanRecord] {
        &self.log
    }
}
