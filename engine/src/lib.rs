//! Nexus Engine Library
//!
//! This library provides the core functionality of the Nexus task assistant.
//! It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// File system security module
pub mod fs_guard;

/// Planning, execution and conversation memory
pub mod conductor;

/// Built-in tools
pub mod tools;

/// Persisted knowledge snippets
pub mod knowledge;

/// HTTP API adapter
pub mod api;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
