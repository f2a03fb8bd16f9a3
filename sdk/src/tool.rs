//! Tool trait
//!
//! Every capability the engine can dispatch a plan step to implements
//! [`Tool`]. The executor depends only on this interface and treats every
//! tool the same way regardless of what it does.

use crate::errors::EngineError;
use crate::types::Parameters;
use async_trait::async_trait;
use serde_json::Value;

/// Trait that all tools must implement
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the action id the planner uses for this tool
    fn name(&self) -> &str;

    /// Returns a one-line description of the tool
    fn description(&self) -> &str;

    /// Handle a tool invocation with named arguments
    async fn execute(&self, params: &Parameters) -> Result<Value, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Returns its text parameter"
        }

        async fn execute(&self, params: &Parameters) -> Result<Value, EngineError> {
            Ok(json!(params.str("text")?))
        }
    }

    #[tokio::test]
    async fn test_tool_object_dispatch() {
        let tool: Box<dyn Tool> = Box::new(Echo);
        let out = tool
            .execute(&Parameters::new().with("text", "hi"))
            .await
            .unwrap();
        assert_eq!(out, json!("hi"));
        assert!(tool.execute(&Parameters::new()).await.is_err());
    }
}
