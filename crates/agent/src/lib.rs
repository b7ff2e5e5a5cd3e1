//! The edit pipeline for Pagewright.
//!
//! An instruction flows through four stages:
//!
//! 1. **Classify** the intent, the request type and the target component
//! 2. **Select** a tool decision (heuristics first, the completion service
//!    for whatever they cannot settle)
//! 3. **Execute** the decision against the registered handlers, one
//!    operation at a time for multi-operation requests
//! 4. **Validate** what was written, repairing it through the self-healing
//!    loop
//!
//! `PageAgent` ties the stages together and is what the gateway and the CLI
//! talk to.

pub mod agent;
pub mod classify;
pub mod executor;
pub mod selector;
pub mod sequential;

pub use agent::{ClassificationReport, PageAgent};
pub use classify::{ComponentResolver, IntentClassifier, RequestClassifier};
pub use executor::{ExecutionReport, ToolExecutor};
pub use selector::{Selection, ToolSelector};
pub use sequential::execute_sequential;
