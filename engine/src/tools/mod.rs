pub mod calculator;
pub mod data;
pub mod filesystem;
pub mod system;
pub mod web_search;

pub use calculator::CalculatorTool;
pub use data::DataTool;
pub use filesystem::FileTool;
pub use system::SystemTool;
pub use web_search::WebSearchTool;

use sdk::{EngineError, Tool};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::Config;

/// Registry of tools the executor can dispatch to, keyed by action id.
///
/// Read-only once built, so one registry can be shared across requests.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry with no tools enabled.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the built-in tools enabled in `config`.
    pub fn from_config(config: &Config) -> Result<Self, EngineError> {
        let mut registry = Self::empty();
        let flags = &config.tools;

        if flags.calculator {
            registry.register(Arc::new(CalculatorTool::new()));
        }
        if flags.system {
            registry.register(Arc::new(SystemTool::new()));
        }
        if flags.file {
            registry.register(Arc::new(FileTool::new(config.core.workspace.clone())?));
        }
        if flags.web_search {
            registry.register(Arc::new(WebSearchTool::new(&config.search)?));
        }
        if flags.data {
            registry.register(Arc::new(DataTool::new(config.core.workspace.clone())?));
        }

        debug!(tools = ?registry.names(), "Tool registry ready");
        Ok(registry)
    }

    /// Add a tool under its own name, replacing any tool already there.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            warn!("Replaced existing tool '{}'", name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Action ids of every registered tool, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// `(name, description)` pairs, sorted by name
    pub fn describe(&self) -> Vec<(String, String)> {
        let mut tools: Vec<(String, String)> = self
            .tools
            .values()
            .map(|t| (t.name().to_string(), t.description().to_string()))
            .collect();
        tools.sort();
        tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(workspace: &TempDir) -> Config {
        let mut config = Config::default();
        config.core.workspace = workspace.path().to_path_buf();
        config.search.engine = "simulated".to_string();
        config
    }

    #[test]
    fn test_from_config_registers_builtins() {
        let temp = TempDir::new().unwrap();
        let registry = ToolRegistry::from_config(&config(&temp)).unwrap();
        assert_eq!(
            registry.names(),
            vec!["calculator", "data", "file", "system", "web_search"]
        );
        assert!(registry.get("file").is_some());
        assert!(registry.get("vision").is_none());
    }

    #[test]
    fn test_disabled_tools_are_absent() {
        let temp = TempDir::new().unwrap();
        let mut config = config(&temp);
        config.tools.web_search = false;
        config.tools.data = false;

        let registry = ToolRegistry::from_config(&config).unwrap();
        assert_eq!(registry.len(), 3);
        assert!(registry.get("web_search").is_none());
    }

    #[test]
    fn test_describe_sorted() {
        let mut registry = ToolRegistry::empty();
        registry.register(Arc::new(SystemTool::new()));
        registry.register(Arc::new(CalculatorTool::new()));
        let described = registry.describe();
        assert_eq!(described[0].0, "calculator");
        assert_eq!(described[1].0, "system");
    }
}
