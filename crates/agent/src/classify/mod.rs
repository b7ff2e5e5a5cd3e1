//! Deterministic classification of a raw instruction.
//!
//! - `intent`: create / edit / delete, or nothing (chat)
//! - `request`: standard vs visual, and which attachments it mentions
//! - `component`: which known component the prompt names

pub mod component;
pub mod intent;
pub mod request;

pub use component::ComponentResolver;
pub use intent::IntentClassifier;
pub use request::RequestClassifier;
