//! CLI interface for Nexus
//!
//! This module provides the command-line interface using clap's derive API.
//! It defines all commands and global flags.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Nexus task assistant
///
/// Plans natural-language requests into tool steps, runs them and answers
/// with the combined result.
#[derive(Parser, Debug)]
#[command(name = "nexus")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Answer a query
    Ask {
        /// The query; quote sub-tasks to run several at once
        query: String,

        /// Operating mode (Standard, Analyst, Researcher, Creative)
        #[arg(short, long)]
        mode: Option<String>,

        /// Attach a file's content as context
        #[arg(short, long, value_name = "PATH")]
        file: Option<PathBuf>,
    },

    /// Show conversation history
    History {
        /// Number of interactions to show (0 for all)
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Clear conversation memory
    Clear,

    /// Show memory statistics
    Stats,

    /// Search conversation history
    Search {
        /// Text to look for (case-insensitive)
        text: String,

        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Export memory to a file
    Export { path: PathBuf },

    /// Replace memory with an exported file
    Import { path: PathBuf },

    /// Teach the knowledge base
    Learn {
        /// Name the knowledge is filed under
        source: String,
        content: String,
    },

    /// Show or search the knowledge base
    Kb {
        /// Optional search text
        query: Option<String>,
    },

    /// Start the HTTP API
    Serve {
        /// Override the configured host
        #[arg(long)]
        host: Option<String>,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["nexus", "stats"]);
        assert!(matches!(cli.command, Command::Stats));
        assert!(!cli.json);
        assert!(cli.log.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["nexus", "--json", "--log", "debug", "clear"]);
        assert!(cli.json);
        assert_eq!(cli.log, Some("debug".to_string()));
    }

    #[test]
    fn test_ask_command() {
        let cli = Cli::parse_from([
            "nexus",
            "ask",
            "summarize sales.csv",
            "--mode",
            "Analyst",
            "--file",
            "sales.csv",
        ]);
        if let Command::Ask { query, mode, file } = cli.command {
            assert_eq!(query, "summarize sales.csv");
            assert_eq!(mode.as_deref(), Some("Analyst"));
            assert_eq!(file, Some(PathBuf::from("sales.csv")));
        } else {
            panic!("Expected Ask command");
        }
    }

    #[test]
    fn test_history_default_limit() {
        let cli = Cli::parse_from(["nexus", "history"]);
        if let Command::History { limit } = cli.command {
            assert_eq!(limit, 10);
        } else {
            panic!("Expected History command");
        }
    }

    #[test]
    fn test_kb_optional_query() {
        let cli = Cli::parse_from(["nexus", "kb"]);
        assert!(matches!(cli.command, Command::Kb { query: None }));

        let cli = Cli::parse_from(["nexus", "learn", "rust.md", "ownership rules"]);
        if let Command::Learn { source, content } = cli.command {
            assert_eq!(source, "rust.md");
            assert_eq!(content, "ownership rules");
        } else {
            panic!("Expected Learn command");
        }
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::parse_from(["nexus", "serve", "--port", "9000"]);
        if let Command::Serve { host, port } = cli.command {
            assert!(host.is_none());
            assert_eq!(port, Some(9000));
        } else {
            panic!("Expected Serve command");
        }
    }
}
