//! Configuration management
//!
//! This module handles loading, validation, and management of the Nexus configuration.
//! Configuration is stored in TOML format at ~/.nexus/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Workspace path, log level, data directory
//! - **memory**: Conversation history bound and storage file
//! - **tools**: Built-in tool enablement flags
//! - **search**: Web search engine settings
//! - **knowledge**: Knowledge base storage file
//! - **api**: HTTP API bind address
//!
//! # Path Expansion
//!
//! The configuration system automatically:
//! - Expands ~ to the user's home directory
//! - Canonicalizes the workspace path, creating it if it doesn't exist
//! - Creates the data directory if it doesn't exist
//!
//! # Examples
//!
//! ```no_run
//! use nexus_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//!
//! println!("Workspace: {:?}", config.core.workspace);
//! println!("History bound: {}", config.memory.max_history);
//! # Ok(())
//! # }
//! ```

use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Core engine settings
    pub core: CoreConfig,

    /// Conversation memory settings
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Built-in tool enablement
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Web search settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Knowledge base settings
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// HTTP API settings
    #[serde(default)]
    pub api: ApiConfig,
}

/// Core engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Root directory the file tool is confined to (supports ~ expansion)
    #[serde(default = "default_workspace")]
    pub workspace: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Data directory path (supports ~ expansion)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

/// Conversation memory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Maximum number of interactions kept in history
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// Storage file, relative to `data_dir` unless absolute
    #[serde(default = "default_memory_file")]
    pub path: PathBuf,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
            path: default_memory_file(),
        }
    }
}

/// Built-in tool enablement configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_true")]
    pub web_search: bool,

    #[serde(default = "default_true")]
    pub calculator: bool,

    #[serde(default = "default_true")]
    pub system: bool,

    #[serde(default = "default_true")]
    pub file: bool,

    #[serde(default = "default_true")]
    pub data: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            web_search: true,
            calculator: true,
            system: true,
            file: true,
            data: true,
        }
    }
}

/// Web search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search engine (duckduckgo, simulated)
    #[serde(default = "default_search_engine")]
    pub engine: String,

    /// Base URL of the instant answer API
    #[serde(default = "default_search_base_url")]
    pub base_url: String,

    /// Maximum number of related topics to include
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Request timeout in seconds
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            engine: default_search_engine(),
            base_url: default_search_base_url(),
            max_results: default_max_results(),
            timeout_secs: default_search_timeout(),
        }
    }
}

/// Knowledge base configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Storage file, relative to `data_dir` unless absolute
    #[serde(default = "default_knowledge_file")]
    pub path: PathBuf,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            path: default_knowledge_file(),
        }
    }
}

/// HTTP API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_host")]
    pub host: String,

    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
        }
    }
}

// Default value functions
fn default_workspace() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("~/.nexus")
}

fn default_max_history() -> usize {
    100
}

fn default_memory_file() -> PathBuf {
    PathBuf::from("memory.json")
}

fn default_knowledge_file() -> PathBuf {
    PathBuf::from("knowledge_base.json")
}

fn default_search_engine() -> String {
    "duckduckgo".to_string()
}

fn default_search_base_url() -> String {
    "https://api.duckduckgo.com".to_string()
}

fn default_max_results() -> usize {
    5
}

fn default_search_timeout() -> u64 {
    5
}

fn default_api_host() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    8001
}

impl Default for Config {
    fn default() -> Self {
        Self {
            core: CoreConfig {
                workspace: default_workspace(),
                log_level: default_log_level(),
                data_dir: default_data_dir(),
            },
            memory: MemoryConfig::default(),
            tools: ToolsConfig::default(),
            search: SearchConfig::default(),
            knowledge: KnowledgeConfig::default(),
            api: ApiConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location (~/.nexus/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read
    /// - TOML parsing fails
    /// - Validation fails (invalid log level, zero history bound, unknown search engine)
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, EngineError> {
        let mut config: Config = toml::from_str(contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let defaults = Self::default();

        // Written before processing so the file keeps the portable `~` paths
        let toml_string = toml::to_string_pretty(&defaults)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        let mut config = defaults;
        config.validate_and_process()?;
        Ok(config)
    }

    /// Get the default configuration file path (~/.nexus/config.toml)
    fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".nexus").join("config.toml"))
    }

    /// Location of the conversation memory file
    pub fn memory_path(&self) -> PathBuf {
        self.core.data_dir.join(&self.memory.path)
    }

    /// Location of the knowledge base file
    pub fn knowledge_path(&self) -> PathBuf {
        self.core.data_dir.join(&self.knowledge.path)
    }

    /// Validate and process configuration
    ///
    /// This method:
    /// - Validates enumerated and bounded fields
    /// - Expands ~ in paths
    /// - Canonicalizes the workspace, creating it if needed
    /// - Creates the data directory if needed
    pub fn validate_and_process(&mut self) -> Result<(), EngineError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        if self.memory.max_history == 0 {
            return Err(EngineError::Config(
                "memory.max_history must be at least 1".to_string(),
            ));
        }

        let valid_engines = ["duckduckgo", "simulated"];
        if !valid_engines.contains(&self.search.engine.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid search engine '{}'. Must be one of: {}",
                self.search.engine,
                valid_engines.join(", ")
            )));
        }

        if self.search.timeout_secs == 0 {
            return Err(EngineError::Config(
                "search.timeout_secs must be greater than 0".to_string(),
            ));
        }

        self.core.workspace = expand_path(&self.core.workspace)?;
        self.core.workspace = canonicalize_or_create(&self.core.workspace)?;

        if !self.core.workspace.is_dir() {
            return Err(EngineError::Config(format!(
                "Workspace path is not a directory: {:?}",
                self.core.workspace
            )));
        }

        self.core.data_dir = expand_path(&self.core.data_dir)?;

        if !self.core.data_dir.exists() {
            fs::create_dir_all(&self.core.data_dir).map_err(|e| {
                EngineError::Config(format!("Failed to create data directory: {}", e))
            })?;
        }

        Ok(())
    }
}

/// Expand ~ in path to user's home directory
fn expand_path(path: &Path) -> Result<PathBuf, EngineError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| EngineError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}

/// Canonicalize path, creating it if it doesn't exist
fn canonicalize_or_create(path: &Path) -> Result<PathBuf, EngineError> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| {
            EngineError::Config(format!("Failed to create directory {:?}: {}", path, e))
        })?;
    }

    path.canonicalize()
        .map_err(|e| EngineError::PathCanonicalization(path.to_path_buf(), e.to_string()))
}
