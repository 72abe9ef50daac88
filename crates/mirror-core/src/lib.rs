//! mirror-core: request orchestration for the Soul Mirror backend.
//!
//! Free text goes in; the selection service picks tools (model-driven when a credential is
//! configured, deterministic fallback otherwise), the orchestrator runs them with per-tool
//! failure isolation, aggregates their output, and appends the input to the shared profile.

mod config;
mod error;
mod orchestrator;
mod profile;
mod types;
pub mod llm;
pub mod selection;
pub mod tools;

// Configuration
pub use self::config::MirrorConfig;

// Errors
pub use error::{
    ConfigError, ExecutionError, LlmError, OrchestratorError, SelectionError, StoreError,
};

// Pipeline
pub use orchestrator::{aggregate, Orchestrator, TOOL_NOT_FOUND};
pub use types::{
    ExecutionStatus, ProcessMetadata, ProcessResponse, ProcessResult, ProcessingDetails,
    ProfileUpdate, SelectionSummary, ToolExecutionRecord,
};

// Components
pub use llm::{AnthropicClient, LlmClient};
pub use profile::{format_entry, InMemoryProfile, ProfileStore, ProfileWrite, PROFILE_HEADER};
pub use selection::{
    fallback_selection, SelectionOutcome, SelectionService, ToolSelection, FALLBACK_REASON,
};
pub use tools::{EchoTool, TimeTool, Tool, ToolDescriptor, ToolRegistry};
