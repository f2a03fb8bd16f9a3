//! Example implementing a tool outside the engine

use async_trait::async_trait;
use sdk::{EngineError, NexusErrorExt, Parameters, Tool};
use serde_json::{json, Value};

/// Counts the words in its `text` parameter
struct WordCount;

#[async_trait]
impl Tool for WordCount {
    fn name(&self) -> &str {
        "word_count"
    }

    fn description(&self) -> &str {
        "Count the words in a piece of text"
    }

    async fn execute(&self, params: &Parameters) -> Result<Value, EngineError> {
        let text = params.str("text")?;
        Ok(json!(text.split_whitespace().count()))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let tool = WordCount;
    println!("{}: {}", tool.name(), tool.description());

    let params = Parameters::new().with("text", "the quick brown fox");
    match tool.execute(&params).await {
        Ok(count) => println!("Word count: {}", count),
        Err(e) => println!("Error: {}", e),
    }

    // Missing parameters surface as errors with a user-facing hint
    if let Err(e) = tool.execute(&Parameters::new()).await {
        println!("Error: {} ({})", e, e.user_hint());
        println!("Recoverable: {}", e.is_recoverable());
    }
}
