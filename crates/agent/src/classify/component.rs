//! Resolve which known component an instruction refers to.
//!
//! Three passes, first hit wins: an explicit file name (`Hero.tsx`), a
//! contextual phrase (`section Pricing`), then a word-boundary scan of every
//! known name. The scan never guesses: two or more surviving matches resolve
//! to `None` and the caller asks the user.

use regex_lite::Regex;
use std::sync::LazyLock;

static FILE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([a-z0-9][a-z0-9_-]*)\.(?:tsx|jsx|ts|js|astro|vue|svelte|html)\b")
        .expect("file name pattern compiles")
});

static CONTEXT_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:component|section)\s+([a-z0-9][a-z0-9_-]*)")
        .expect("context phrase pattern compiles")
});

/// Lowercase alphanumerics only: `pricing-table` and `PricingTable` compare
/// equal.
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// The known identifier equal to `name` after normalization.
pub fn canonicalize(name: &str, known: &[String]) -> Option<String> {
    let wanted = normalize(name);
    if wanted.is_empty() {
        return None;
    }
    known.iter().find(|k| normalize(k) == wanted).cloned()
}

/// Split an identifier into lowercase words: `FeatureGrid` → `feature`,
/// `grid`; `pricing-table` → `pricing`, `table`.
pub fn words(name: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in name.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Matches the name written joined (`featuregrid`), spaced (`feature grid`)
/// or hyphenated, on word boundaries.
fn name_pattern(name: &str) -> Option<Regex> {
    let parts = words(name);
    if parts.is_empty() {
        return None;
    }
    let body = parts
        .iter()
        .map(|w| regex_lite::escape(w))
        .collect::<Vec<_>>()
        .join(r"[\s_-]*");
    Regex::new(&format!(r"(?i)\b{body}\b")).ok()
}

struct Hit<'a> {
    name: &'a String,
    spans: Vec<(usize, usize)>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentResolver;

impl ComponentResolver {
    pub fn new() -> Self {
        Self
    }

    /// The single known component the prompt refers to, if unambiguous.
    pub fn resolve(&self, prompt: &str, known: &[String]) -> Option<String> {
        if known.is_empty() {
            return None;
        }

        for caps in FILE_NAME.captures_iter(prompt) {
            if let Some(found) = canonicalize(&caps[1], known) {
                return Some(found);
            }
        }

        for caps in CONTEXT_PHRASE.captures_iter(prompt) {
            if let Some(found) = canonicalize(&caps[1], known) {
                return Some(found);
            }
        }

        let mut candidates = self.candidates(prompt, known);
        if candidates.len() == 1 {
            candidates.pop()
        } else {
            None
        }
    }

    /// Every known name mentioned in the prompt, in `known` order. A name
    /// whose every mention sits inside a longer match (`Feature` within
    /// `feature grid`) is dropped.
    pub fn candidates(&self, prompt: &str, known: &[String]) -> Vec<String> {
        let hits: Vec<Hit<'_>> = known
            .iter()
            .filter_map(|name| {
                let pattern = name_pattern(name)?;
                let spans: Vec<(usize, usize)> = pattern
                    .find_iter(prompt)
                    .map(|m| (m.start(), m.end()))
                    .collect();
                (!spans.is_empty()).then_some(Hit { name, spans })
            })
            .collect();

        hits.iter()
            .enumerate()
            .filter(|(i, hit)| {
                !hit.spans.iter().all(|&(start, end)| {
                    hits.iter().enumerate().any(|(j, other)| {
                        j != *i
                            && other.spans.iter().any(|&(s, e)| {
                                s <= start && end <= e && (e - s) > (end - start)
                            })
                    })
                })
            })
            .map(|(_, hit)| hit.name.clone())
            .collect()
    }
}
