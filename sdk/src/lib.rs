//! Nexus SDK
//!
//! Shared library providing the capability contract used by the engine and by
//! any tool implemented outside of it.

/// Tool trait
pub mod tool;

/// Error types and handling
pub mod errors;

/// Tool parameter types
pub mod types;

// Re-export commonly used types
pub use errors::{EngineError, NexusErrorExt};
pub use tool::Tool;
pub use types::Parameters;
