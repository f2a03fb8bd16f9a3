//! Tool parameter types

use crate::errors::EngineError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Named arguments passed to a tool.
///
/// An insertion-ordered mapping of parameter name to JSON value. Plan steps
/// carry one of these and the executor hands it to the tool unchanged after
/// placeholder resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(Map<String, Value>);

impl Parameters {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Add a parameter
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert or replace a parameter
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Get a raw parameter value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a required string parameter
    pub fn str(&self, key: &str) -> Result<&str, EngineError> {
        self.0
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| EngineError::MissingParameter(key.to_string()))
    }

    /// Get an optional string parameter
    pub fn str_opt(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }

    /// Get an optional unsigned integer parameter
    pub fn u64_opt(&self, key: &str) -> Option<u64> {
        self.0.get(key).and_then(|v| v.as_u64())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Parameters {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Render a tool result the way it is shown to users and fed to later steps.
///
/// Strings are returned without surrounding quotes; `null` becomes empty;
/// every other value is rendered as compact JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parameters_preserve_insertion_order() {
        let params = Parameters::new()
            .with("operation", "read")
            .with("path", "notes.txt")
            .with("alpha", 1);

        let keys: Vec<&str> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["operation", "path", "alpha"]);
    }

    #[test]
    fn test_missing_parameter() {
        let params = Parameters::new();
        let err = params.str("query").unwrap_err();
        assert!(matches!(err, EngineError::MissingParameter(k) if k == "query"));
    }

    #[test]
    fn test_typed_accessors() {
        let params = Parameters::new()
            .with("query", "rust")
            .with("max_results", 3);

        assert_eq!(params.str("query").unwrap(), "rust");
        assert_eq!(params.u64_opt("max_results"), Some(3));
        assert_eq!(params.str_opt("missing"), None);
        assert!(params.contains("query"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let params = Parameters::new().with("expression", "1+1");
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json, json!({"expression": "1+1"}));
    }

    #[test]
    fn test_value_to_text() {
        assert_eq!(value_to_text(&json!("460")), "460");
        assert_eq!(value_to_text(&json!(460)), "460");
        assert_eq!(value_to_text(&Value::Null), "");
        assert_eq!(value_to_text(&json!({"a": 1})), r#"{"a":1}"#);
    }
}
