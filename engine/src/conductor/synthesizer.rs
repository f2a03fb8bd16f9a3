//! Response Synthesizer
//!
//! Reduces an execution log to the single string shown to the user.

use crate::conductor::types::{ExecutionRecord, PlanStep};

pub const NO_PLAN_MESSAGE: &str =
    "I couldn't identify any specific steps to execute for this query.";
pub const NOTHING_EXECUTED_MESSAGE: &str =
    "I planned some steps but couldn't execute them successfully.";
pub const NO_SUCCESS_MESSAGE: &str = "No successful results were generated.";

/// Join the text of every successful record, in step order, with a blank line
pub fn synthesize(plan: &[PlanStep], records: &[ExecutionRecord]) -> String {
    if records.is_empty() {
        return if plan.is_empty() {
            NO_PLAN_MESSAGE.to_string()
        } else {
            NOTHING_EXECUTED_MESSAGE.to_string()
        };
    }

    let parts: Vec<String> = records
        .iter()
        .filter(|r| r.success)
        .map(ExecutionRecord::result_text)
        .collect();

    if parts.is_empty() {
        NO_SUCCESS_MESSAGE.to_string()
    } else {
        parts.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conductor::types::StepOutcome;
    use sdk::Parameters;
    use serde_json::json;

    fn step(index: usize) -> PlanStep {
        PlanStep {
            index,
            action: "general".to_string(),
            description: String::new(),
            parameters: Parameters::new(),
            confidence: 1.0,
            reasoning: String::new(),
            critical: false,
        }
    }

    fn ok(index: usize, text: &str) -> ExecutionRecord {
        ExecutionRecord::new(&step(index), Parameters::new(), StepOutcome::Success(json!(text)))
    }

    fn failed(index: usize) -> ExecutionRecord {
        ExecutionRecord::new(
            &step(index),
            Parameters::new(),
            StepOutcome::Error {
                message: "nope".to_string(),
                trace: None,
            },
        )
    }

    #[test]
    fn test_empty_messages() {
        assert_eq!(synthesize(&[], &[]), NO_PLAN_MESSAGE);
        assert_eq!(synthesize(&[step(1)], &[]), NOTHING_EXECUTED_MESSAGE);
        assert_eq!(synthesize(&[step(1)], &[failed(1)]), NO_SUCCESS_MESSAGE);
    }

    #[test]
    fn test_joins_successes_in_order() {
        let records = vec![ok(1, "12:00:00"), failed(2), ok(3, "a.txt\nb.txt")];
        let plan = vec![step(1), step(2), step(3)];
        assert_eq!(synthesize(&plan, &records), "12:00:00\n\na.txt\nb.txt");
    }

    #[test]
    fn test_numeric_results_render_plainly() {
        let record = ExecutionRecord::new(
            &step(1),
            Parameters::new(),
            StepOutcome::Success(json!(460)),
        );
        assert_eq!(synthesize(&[step(1)], &[record]), "460");
    }
}
