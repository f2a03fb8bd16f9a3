//! Conductor Executor
//!
//! Runs a plan step by step against the tool registry. Each step's parameters
//! are resolved against the results of the steps before it, and every outcome
//! is captured in an [`ExecutionRecord`]. Tool faults never escape; only an
//! error on a step marked `critical` ends the run early.

use crate::conductor::resolver;
use crate::conductor::types::{
    ExecutionRecord, PlanStep, ResultMap, StepOutcome, StepStatus, GENERAL_ACTION,
};
use crate::tools::ToolRegistry;
use sdk::Parameters;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Action that receives attached file content as `temp_data`
const DATA_ACTION: &str = "data";

pub struct Executor {
    registry: Arc<ToolRegistry>,
}

impl Executor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// Execute every step of `plan` in order
    pub async fn run(&self, plan: &[PlanStep]) -> Vec<ExecutionRecord> {
        self.run_with_file_context(plan, None).await
    }

    /// Execute `plan`, handing `file_context` to data steps as inline content
    pub async fn run_with_file_context(
        &self,
        plan: &[PlanStep],
        file_context: Option<&str>,
    ) -> Vec<ExecutionRecord> {
        let start = Instant::now();
        let mut results = ResultMap::new();
        let mut records = Vec::with_capacity(plan.len());

        for step in plan {
            let resolved = resolver::resolve(&step.parameters, &results);
            let outcome = self.execute_step(step, &resolved, file_context).await;
            let record = ExecutionRecord::new(step, resolved, outcome);

            results.insert(record.index, record.result_text());
            let halt = record.status == StepStatus::Error && step.critical;
            records.push(record);

            if halt {
                warn!(step = step.index, "Critical step failed, halting plan");
                break;
            }
        }

        info!(
            executed = records.len(),
            planned = plan.len(),
            "Plan finished in {:.2}s",
            start.elapsed().as_secs_f64()
        );

        records
    }

    async fn execute_step(
        &self,
        step: &PlanStep,
        params: &Parameters,
        file_context: Option<&str>,
    ) -> StepOutcome {
        if step.action == GENERAL_ACTION {
            let response = params.get("response").cloned().unwrap_or(Value::Null);
            return StepOutcome::Success(response);
        }

        let Some(tool) = self.registry.get(&step.action) else {
            debug!(action = %step.action, "No tool registered for action");
            return StepOutcome::Skipped(format!("Action '{}' not supported", step.action));
        };

        debug!(step = step.index, action = %step.action, "Executing step");

        let outcome = match file_context.filter(|_| step.action == DATA_ACTION) {
            Some(content) => {
                let mut with_data = params.clone();
                with_data.insert("temp_data", content);
                tool.execute(&with_data).await
            }
            None => tool.execute(params).await,
        };

        match outcome {
            Ok(value) => StepOutcome::Success(value),
            Err(e) => {
                warn!(step = step.index, action = %step.action, error = %e, "Step failed");
                StepOutcome::Error {
                    message: e.to_string(),
                    trace: e.trace(),
                }
            }
        }
    }
}
