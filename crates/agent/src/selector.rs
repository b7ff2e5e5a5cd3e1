//! Tool selection: turn an instruction into one or more `ToolDecision`s.
//!
//! Cheap paths first. A creation request with an explicit name and anchor is
//! decided without any service call, and instructions whose target resolves
//! unambiguously go through a small set of deterministic heuristics. Only
//! what remains is escalated to the completion service, whose answer is
//! vetted before it is returned: every decision is parsed into typed
//! instructions, non-creating decisions must name a known component, and a
//! deletion is accepted only when the instruction itself asks for one.

use crate::classify::component::{canonicalize, words};
use crate::classify::{ComponentResolver, IntentClassifier, RequestClassifier};
use pagewright_config::ClassifierConfig;
use pagewright_core::message::Message;
use pagewright_core::provider::{Provider, ProviderRequest, complete_text, strip_code_fences};
use pagewright_core::{
    AgentError, EditRequest, InstructionPayload, Intent, Preposition, RequestType,
    ToolDecision, tool_names,
};
use regex_lite::Regex;
use serde::Deserialize;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};

/// Confidence assigned to deterministic heuristic decisions.
const HEURISTIC_CONFIDENCE: f32 = 0.9;

static CREATE_NAMED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)\b(?:create|add|build|generate)\b.*?\b(?:called|named)\s+["“']?([a-z0-9][a-z0-9 _-]*?)["”']?\s+(underneath|under|below|beneath|after|above|before)\s+(?:the\s+)?["“']?([a-z0-9][a-z0-9 _-]*?)["”']?\s*[.!]?\s*$"#,
    )
    .expect("create pattern compiles")
});

static VIDEO_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:video|youtube|vimeo)\b").expect("video pattern compiles")
});

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s"'<>]+"#).expect("url pattern compiles"));

static REPLACE_QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\breplace\s+["“]([^"”]+)["”]\s+with\s+["“]([^"”]*)["”]"#)
        .expect("replace pattern compiles")
});

static CHANGE_TO_QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\b(?:change|set|update|make)\s+(?:the\s+)?([a-z][a-z0-9 _-]*?)\s+to\s+(?:say\s+)?["“]([^"”]*)["”]"#,
    )
    .expect("change pattern compiles")
});

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["“][^"”]*["”]"#).expect("quoted span pattern compiles"));

static TO_QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bto\s+["“]([^"”]+)["”]"#).expect("quoted value pattern compiles")
});

static COLOR_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:colou?rs?|background|bg|border|tint)\b").expect("color keyword pattern compiles")
});

const COLOR_VALUE: &str = r"((?:(?:light|dark|deep|pale)\s+)?(?:red|orange|amber|yellow|lime|green|emerald|teal|cyan|sky|blue|indigo|violet|purple|fuchsia|pink|rose|slate|gray|grey|zinc|neutral|stone|black|white)|#[0-9a-f]{3,8})\b";

static TO_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\bto\s+(?:an?\s+)?{COLOR_VALUE}")).expect("target color pattern compiles")
});

static FROM_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\bfrom\s+(?:an?\s+)?{COLOR_VALUE}")).expect("old color pattern compiles")
});

static ANY_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)(?:^|[^a-z0-9#-]){COLOR_VALUE}")).expect("color pattern compiles")
});

const SELECT_SYSTEM_PROMPT: &str = "You route website edit instructions to tools. You receive a JSON \
context describing the instruction. Choose the tool(s) that carry it out.\n\n\
Available tools:\n{catalog}\n\n\
Reply with JSON only. Either one decision:\n\
{\"tool\": \"<name>\", \"confidence\": 0.0-1.0, \"reasoning\": \"...\", \"instructions\": {...}}\n\
or several, executed in order:\n\
{\"decisions\": [<decision>, ...]}\n\
or, when you cannot tell which component is meant:\n\
{\"clarification\": \"<question for the user>\", \"candidates\": [\"...\"]}\n\n\
Instruction fields: component, selector, property, oldValue, newValue, color, videoUrl, imageUrl, \
componentName, position, preposition, prompt. The component must be one of knownTargets unless \
the tool is visual-edit creating a new component. Never choose delete unless the user asked to \
delete or remove a whole component.";

/// What the selector decided.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Single(ToolDecision),
    Multiple(Vec<ToolDecision>),
}

impl Selection {
    pub fn decisions(&self) -> Vec<&ToolDecision> {
        match self {
            Selection::Single(d) => vec![d],
            Selection::Multiple(ds) => ds.iter().collect(),
        }
    }

    pub fn into_decisions(self) -> Vec<ToolDecision> {
        match self {
            Selection::Single(d) => vec![d],
            Selection::Multiple(ds) => ds,
        }
    }
}

/// Shapes the completion service may answer with.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SelectionReply {
    Clarification {
        clarification: String,
        #[serde(default)]
        candidates: Vec<String>,
    },
    Many {
        decisions: Vec<ToolDecision>,
    },
    One(ToolDecision),
}

pub struct ToolSelector {
    intents: IntentClassifier,
    requests: RequestClassifier,
    resolver: ComponentResolver,
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    catalog: String,
}

fn pascal_case(text: &str) -> Option<String> {
    let mut parts = words(text);
    while parts
        .last()
        .is_some_and(|w| matches!(w.as_str(), "section" | "component" | "block"))
    {
        parts.pop();
    }
    let name: String = parts
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect();
    (!name.is_empty()).then_some(name)
}

/// Element selector implied by the wording, if any.
fn element_selector(text: &str) -> Option<&'static str> {
    let text = text.to_lowercase();
    let has = |w: &str| text.split(|c: char| !c.is_alphanumeric()).any(|t| t == w);
    if has("button") || has("cta") {
        Some("button")
    } else if has("subheadline") || has("subtitle") || has("tagline") {
        Some("subtitle")
    } else if has("headline") || has("heading") || has("title") {
        Some("headline")
    } else if has("link") {
        Some("link")
    } else if has("paragraph") || has("description") {
        Some("paragraph")
    } else {
        None
    }
}

fn color_property(text: &str) -> &'static str {
    let text = text.to_lowercase();
    let has = |w: &str| text.split(|c: char| !c.is_alphanumeric()).any(|t| t == w);
    if has("border") || has("outline") {
        "border"
    } else if has("background") || has("bg") {
        "background"
    } else if has("text") || has("font") || has("headline") || has("heading") || has("title") || has("link") {
        "text"
    } else {
        "background"
    }
}

fn trim_url(url: &str) -> &str {
    url.trim_end_matches(['.', ',', ';', ')', '!', '?'])
}

/// Pull the JSON object out of a reply that may carry prose or fences.
fn json_body(reply: &str) -> &str {
    match (reply.find('{'), reply.rfind('}')) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => reply,
    }
}

impl ToolSelector {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        classifier: &ClassifierConfig,
        catalog: impl Into<String>,
    ) -> Self {
        Self {
            intents: IntentClassifier::new(),
            requests: RequestClassifier::new(classifier),
            resolver: ComponentResolver::new(),
            provider,
            model: model.into(),
            temperature: 0.2,
            max_tokens: None,
            catalog: catalog.into(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Decide which tool(s) carry out the request.
    pub async fn select(&self, request: &EditRequest) -> Result<Selection, AgentError> {
        let prompt = request.prompt.trim();
        let known = &request.targets;
        let intent = self.intents.classify(prompt);

        if intent == Some(Intent::Create) {
            if let Some(decision) = self.create_fast_path(request, known) {
                info!(tool = %decision.tool, confidence = decision.confidence, path = "create", "Tool selected");
                return Ok(Selection::Single(decision));
            }
        }

        let request_type =
            self.requests
                .classify(prompt, request.image.is_some(), request.layout.is_some());
        let target = request
            .disambiguation
            .as_deref()
            .and_then(|answer| {
                canonicalize(answer.trim(), known).or_else(|| self.resolver.resolve(answer, known))
            })
            .or_else(|| self.resolver.resolve(prompt, known));
        let candidates = self.resolver.candidates(prompt, known);

        if let Some(target) = target.as_deref() {
            if let Some(decision) = self.heuristic(request, intent, request_type, target)? {
                info!(tool = %decision.tool, confidence = decision.confidence, path = "heuristic", "Tool selected");
                return Ok(Selection::Single(decision));
            }
        }

        debug!(
            resolved = target.as_deref().unwrap_or(""),
            candidates = candidates.len(),
            "Escalating selection to the completion service"
        );
        let selection = self
            .escalate(request, intent, request_type, target.as_deref(), &candidates)
            .await?;
        for decision in selection.decisions() {
            info!(tool = %decision.tool, confidence = decision.confidence, path = "service", "Tool selected");
        }
        Ok(selection)
    }

    /// `create … called X below Y`: decided locally with full confidence.
    fn create_fast_path(&self, request: &EditRequest, known: &[String]) -> Option<ToolDecision> {
        let caps = CREATE_NAMED.captures(request.prompt.trim())?;
        let name = pascal_case(&caps[1])?;
        let preposition = match Preposition::parse(&caps[2])? {
            Preposition::Below => "below",
            Preposition::Above => "above",
        };
        let anchor_text = caps[3].trim();
        let anchor = canonicalize(anchor_text, known)
            .or_else(|| self.resolver.resolve(anchor_text, known))
            .or_else(|| pascal_case(anchor_text))?;

        let payload = InstructionPayload {
            component_name: Some(name.clone()),
            position: Some(anchor.clone()),
            preposition: Some(preposition.into()),
            prompt: Some(request.prompt.trim().to_string()),
            image_url: request.image.clone(),
            ..InstructionPayload::default()
        };
        Some(ToolDecision::single(
            tool_names::VISUAL_EDIT,
            1.0,
            format!("Create component {name} {preposition} {anchor}"),
            payload,
        ))
    }

    fn heuristic(
        &self,
        request: &EditRequest,
        intent: Option<Intent>,
        request_type: RequestType,
        target: &str,
    ) -> Result<Option<ToolDecision>, AgentError> {
        let prompt = request.prompt.trim();
        let component = Some(target.to_string());
        // Keywords inside quoted copy never pick a tool.
        let unquoted = QUOTED.replace_all(prompt, " ");
        let dequoted = prompt.replace(['"', '“', '”'], "");

        if intent == Some(Intent::Delete) {
            let payload = InstructionPayload {
                component,
                ..InstructionPayload::default()
            };
            return Ok(Some(ToolDecision::single(
                tool_names::DELETE,
                HEURISTIC_CONFIDENCE,
                format!("Delete component {target}"),
                payload,
            )));
        }

        if VIDEO_WORDS.is_match(&unquoted) {
            let url = URL
                .find(prompt)
                .map(|m| trim_url(m.as_str()).to_string())
                .ok_or_else(|| AgentError::missing_field(tool_names::VIDEO_EMBED, "videoUrl"))?;
            let payload = InstructionPayload {
                component,
                selector: Some("video".into()),
                video_url: Some(url),
                ..InstructionPayload::default()
            };
            return Ok(Some(ToolDecision::single(
                tool_names::VIDEO_EMBED,
                HEURISTIC_CONFIDENCE,
                format!("Embed a video in {target}"),
                payload,
            )));
        }

        if let Some(caps) = REPLACE_QUOTED.captures(prompt) {
            let payload = InstructionPayload {
                component,
                old_value: Some(caps[1].to_string()),
                new_value: Some(caps[2].to_string()),
                ..InstructionPayload::default()
            };
            return Ok(Some(ToolDecision::single(
                tool_names::CONTENT_EDIT,
                HEURISTIC_CONFIDENCE,
                format!("Replace quoted text in {target}"),
                payload,
            )));
        }

        if let Some(caps) = CHANGE_TO_QUOTED
            .captures(prompt)
            .filter(|caps| !COLOR_WORDS.is_match(&caps[1]))
        {
            let element = &caps[1];
            let selector = element_selector(element)
                .map(String::from)
                .or_else(|| element.split_whitespace().last().map(String::from));
            let payload = InstructionPayload {
                component,
                selector,
                new_value: Some(caps[2].to_string()),
                ..InstructionPayload::default()
            };
            return Ok(Some(ToolDecision::single(
                tool_names::CONTENT_EDIT,
                HEURISTIC_CONFIDENCE,
                format!("Change the {} text in {target}", element.trim()),
                payload,
            )));
        }

        if COLOR_WORDS.is_match(&unquoted) || TO_COLOR.is_match(&unquoted) {
            let old_color = FROM_COLOR.captures(&dequoted).map(|c| c[1].to_lowercase());
            let color = TO_QUOTED
                .captures(prompt)
                .map(|c| c[1].trim().to_lowercase())
                .or_else(|| TO_COLOR.captures(&dequoted).map(|c| c[1].to_lowercase()))
                .or_else(|| {
                    ANY_COLOR
                        .captures_iter(&unquoted)
                        .map(|c| c[1].to_lowercase())
                        .filter(|c| Some(c) != old_color.as_ref())
                        .last()
                })
                .ok_or_else(|| AgentError::missing_field(tool_names::COLOR_UPDATE, "color"))?;
            let property = color_property(&unquoted);
            let selector = element_selector(&unquoted)
                .or((property == "background").then_some("background"))
                .map(String::from);
            let payload = InstructionPayload {
                component,
                selector,
                property: Some(property.into()),
                old_value: old_color,
                color: Some(color.clone()),
                ..InstructionPayload::default()
            };
            return Ok(Some(ToolDecision::single(
                tool_names::COLOR_UPDATE,
                HEURISTIC_CONFIDENCE,
                format!("Set the {property} color of {target} to {color}"),
                payload,
            )));
        }

        if request_type.is_visual() {
            if let Some(image) = request.image.as_deref() {
                let payload = InstructionPayload {
                    component_name: component,
                    prompt: Some(prompt.to_string()),
                    image_url: Some(image.to_string()),
                    ..InstructionPayload::default()
                };
                return Ok(Some(ToolDecision::single(
                    tool_names::VISUAL_EDIT,
                    HEURISTIC_CONFIDENCE,
                    format!("Regenerate {target} from the attached image"),
                    payload,
                )));
            }
        }

        Ok(None)
    }

    async fn escalate(
        &self,
        request: &EditRequest,
        intent: Option<Intent>,
        request_type: RequestType,
        target: Option<&str>,
        candidates: &[String],
    ) -> Result<Selection, AgentError> {
        let context = serde_json::json!({
            "prompt": request.prompt.trim(),
            "intent": intent,
            "requestType": request_type,
            "resolvedTarget": target,
            "candidates": candidates,
            "knownTargets": request.targets,
            "disambiguation": request.disambiguation,
            "image": request.image,
            "layout": request.layout,
        });

        let system = SELECT_SYSTEM_PROMPT.replace("{catalog}", &self.catalog);
        let mut provider_request = ProviderRequest::new(
            &self.model,
            vec![Message::system(system), Message::user(context.to_string())],
        )
        .with_temperature(self.temperature);
        if let Some(max_tokens) = self.max_tokens {
            provider_request = provider_request.with_max_tokens(max_tokens);
        }

        let reply = complete_text(self.provider.as_ref(), provider_request).await?;
        let cleaned = strip_code_fences(&reply);
        let parsed: SelectionReply = serde_json::from_str(json_body(&cleaned)).map_err(|e| {
            AgentError::ExternalServiceUnavailable(format!("unreadable selection reply: {e}"))
        })?;

        let decisions = match parsed {
            SelectionReply::Clarification {
                clarification,
                candidates: suggested,
            } => {
                let suggested = if suggested.is_empty() {
                    request.targets.clone()
                } else {
                    suggested
                };
                return Err(AgentError::ambiguous(clarification, suggested));
            }
            SelectionReply::Many { decisions } => decisions,
            SelectionReply::One(decision) => vec![decision],
        };
        if decisions.is_empty() {
            return Err(AgentError::ExternalServiceUnavailable(
                "selection reply contained no decisions".into(),
            ));
        }

        let mut vetted = decisions
            .into_iter()
            .map(|d| self.vet(d, intent, target, &request.targets))
            .collect::<Result<Vec<_>, _>>()?;

        if vetted.len() == 1 {
            Ok(Selection::Single(vetted.remove(0)))
        } else {
            Ok(Selection::Multiple(vetted))
        }
    }

    /// Check a service-proposed decision against what the instruction and
    /// the project actually allow, canonicalizing its targets.
    fn vet(
        &self,
        decision: ToolDecision,
        intent: Option<Intent>,
        target: Option<&str>,
        known: &[String],
    ) -> Result<ToolDecision, AgentError> {
        let ToolDecision {
            tool,
            confidence,
            reasoning,
            mut instructions,
        } = decision;

        if !tool_names::ALL.contains(&tool.as_str()) {
            return Err(AgentError::UnknownTool(tool));
        }
        if tool == tool_names::DELETE && intent != Some(Intent::Delete) {
            return Err(AgentError::ambiguous(
                "the instruction does not ask to delete a component",
                known.to_vec(),
            ));
        }

        for payload in instructions.payloads_mut() {
            if tool == tool_names::VISUAL_EDIT {
                if let Some(anchor) = payload.position.as_deref() {
                    if let Some(found) = canonicalize(anchor, known) {
                        payload.position = Some(found);
                    }
                }
                let name = payload.component_name.as_deref().or(payload.component.as_deref());
                if let Some(found) = name.and_then(|n| canonicalize(n, known)) {
                    payload.component_name = Some(found);
                }
                continue;
            }

            let named = payload
                .component
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty());
            let resolved = match named {
                Some(name) => canonicalize(name, known),
                None => target.map(String::from),
            };
            match resolved {
                Some(found) => payload.component = Some(found),
                None => {
                    let reason = match named {
                        Some(name) => format!("no known component matches '{name}'"),
                        None => "the instruction does not name a known component".to_string(),
                    };
                    return Err(AgentError::ambiguous(reason, known.to_vec()));
                }
            }
        }

        let decision = ToolDecision::new(tool, confidence, reasoning, instructions);
        decision.parse_instructions()?;
        Ok(decision)
    }
}
