//! Web Search Tool
//!
//! Looks queries up against the DuckDuckGo instant answer API. A `simulated`
//! engine answers without touching the network.

use async_trait::async_trait;
use sdk::{EngineError, Parameters, Tool};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::SearchConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEngine {
    DuckDuckGo,
    Simulated,
}

impl SearchEngine {
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name {
            "duckduckgo" => Ok(Self::DuckDuckGo),
            "simulated" => Ok(Self::Simulated),
            other => Err(EngineError::Config(format!(
                "Unknown search engine '{}'. Must be one of: duckduckgo, simulated",
                other
            ))),
        }
    }
}

/// Subset of the instant answer payload that is rendered
#[derive(Debug, Default, Deserialize)]
struct InstantAnswer {
    #[serde(rename = "AbstractText", default)]
    abstract_text: String,
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<Value>,
}

pub struct WebSearchTool {
    client: reqwest::Client,
    engine: SearchEngine,
    base_url: String,
    max_results: usize,
}

impl WebSearchTool {
    pub fn new(config: &SearchConfig) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EngineError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            engine: SearchEngine::from_name(&config.engine)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_results: config.max_results,
        })
    }

    pub async fn search(&self, query: &str, max_results: usize) -> Result<String, EngineError> {
        match self.engine {
            SearchEngine::DuckDuckGo => self.search_duckduckgo(query, max_results).await,
            SearchEngine::Simulated => Ok(format!(
                "Search query: '{}'\nNote: This is a simulated search. Configure the duckduckgo engine for live results.",
                query
            )),
        }
    }

    async fn search_duckduckgo(&self, query: &str, max_results: usize) -> Result<String, EngineError> {
        info!("Searching DuckDuckGo for: {}", query);

        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| EngineError::Network(format!("Search request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Network(format!(
                "Search returned HTTP {}",
                status
            )));
        }

        // the API labels its JSON as javascript, so decode the body by hand
        let body = response
            .text()
            .await
            .map_err(|e| EngineError::Network(format!("Failed to read search response: {}", e)))?;
        let answer: InstantAnswer = serde_json::from_str(&body)?;

        Ok(format_answer(query, &answer, max_results))
    }
}

fn format_answer(query: &str, answer: &InstantAnswer, max_results: usize) -> String {
    let mut lines = Vec::new();

    if !answer.abstract_text.is_empty() {
        lines.push(format!("Answer: {}", answer.abstract_text));
    }

    lines.extend(
        answer
            .related_topics
            .iter()
            .take(max_results)
            .filter_map(|topic| topic.get("Text").and_then(Value::as_str))
            .map(|text| format!("- {}", text)),
    );

    if lines.is_empty() {
        debug!("No instant answers for {}", query);
        format!(
            "Search completed for '{}'. No instant answers found.",
            query
        )
    } else {
        lines.join("\n")
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Look up instant answers on the web"
    }

    async fn execute(&self, params: &Parameters) -> Result<Value, EngineError> {
        let query = params.str("query")?;
        let max_results = params
            .u64_opt("max_results")
            .map(|n| n as usize)
            .unwrap_or(self.max_results);
        Ok(json!(self.search(query, max_results).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulated() -> WebSearchTool {
        let config = SearchConfig {
            engine: "simulated".to_string(),
            ..SearchConfig::default()
        };
        WebSearchTool::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_simulated_engine() {
        let result = simulated()
            .execute(&Parameters::new().with("query", "rust"))
            .await
            .unwrap();
        assert!(result.as_str().unwrap().starts_with("Search query: 'rust'"));
    }

    #[test]
    fn test_unknown_engine_rejected() {
        let config = SearchConfig {
            engine: "altavista".to_string(),
            ..SearchConfig::default()
        };
        assert!(matches!(
            WebSearchTool::new(&config),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn test_format_answer() {
        let answer: InstantAnswer = serde_json::from_value(json!({
            "AbstractText": "Rust is a language.",
            "RelatedTopics": [
                {"Text": "Cargo"},
                {"Name": "group", "Topics": []},
                {"Text": "rustc"},
                {"Text": "clippy"}
            ]
        }))
        .unwrap();

        assert_eq!(
            format_answer("rust", &answer, 3),
            "Answer: Rust is a language.\n- Cargo\n- rustc"
        );
        assert!(format_answer("x", &InstantAnswer::default(), 5).contains("No instant answers"));
    }
}
