//! Intent classification: what kind of change the instruction asks for.
//!
//! Pure pattern matching over the trimmed prompt with a fixed precedence:
//! deletion, then targeted edits, then creation. Anything else is `None`,
//! which callers treat as conversational.

use pagewright_core::Intent;
use regex_lite::Regex;
use std::sync::LazyLock;

static DELETE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^(?:delete|remove)\b.*\b(?:section|component)s?\b")
        .expect("delete pattern compiles")
});

static EDIT_TARGETED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^[a-z0-9][a-z0-9 _.-]*:\s*(?:update|change|set|modify|edit|replace)\b")
        .expect("targeted edit pattern compiles")
});

static EDIT_LEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^(?:update|change|set|modify|edit|replace)\s+\S+")
        .expect("leading edit pattern compiles")
});

static CREATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^(?:create|add|build|generate)\b.*\b(?:section|component|page)s?\b")
        .expect("create pattern compiles")
});

#[derive(Debug, Clone, Copy, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// First matching intent, or `None` when nothing matches.
    pub fn classify(&self, prompt: &str) -> Option<Intent> {
        let prompt = prompt.trim();
        if DELETE.is_match(prompt) {
            Some(Intent::Delete)
        } else if EDIT_TARGETED.is_match(prompt) || EDIT_LEADING.is_match(prompt) {
            Some(Intent::Edit)
        } else if CREATE.is_match(prompt) {
            Some(Intent::Create)
        } else {
            None
        }
    }

    pub fn classify_or_chat(&self, prompt: &str) -> Intent {
        self.classify(prompt).unwrap_or(Intent::Chat)
    }
}
