//! # Pagewright Core
//!
//! Domain types, traits, and error definitions for the Pagewright
//! page-editing agent. This crate has **zero framework dependencies**: it
//! defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The completion service and the document handlers are traits here.
//! Implementations live in their respective crates. This enables:
//! - Swapping the completion backend via configuration
//! - Deterministic testing with scripted fakes
//! - Clean dependency graph (all crates depend inward on core)

pub mod decision;
pub mod error;
pub mod message;
pub mod provider;
pub mod request;
pub mod response;
pub mod tool;
pub mod validation;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export key types at crate root for ergonomics
pub use decision::{
    ColorProperty, InstructionPayload, Instructions, Preposition, ToolDecision, ToolInstructions,
    tool_names,
};
pub use error::{AgentError, Attachment, ProviderError};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use request::{EditRequest, Intent, RequestKind, RequestType};
pub use response::{
    AgentResponse, OperationFailure, OperationResult, SequentialResult, SequentialSummary,
};
pub use tool::{ExecutionContext, ToolHandler, ToolOutcome, ToolRegistry};
pub use validation::{FailMode, ValidationReport, ValidationStatus};
