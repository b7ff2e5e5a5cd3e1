//! Request-type classification: textual edit or visual request.

use super::intent::IntentClassifier;
use pagewright_config::ClassifierConfig;
use pagewright_core::{AgentError, Attachment, Intent, RequestType};

/// Keyword tables deciding whether an instruction refers to imagery or a
/// layout. Single words match whole tokens; multi-word entries match as
/// phrases.
#[derive(Debug, Clone)]
pub struct RequestClassifier {
    image_keywords: Vec<String>,
    layout_keywords: Vec<String>,
    intents: IntentClassifier,
}

/// Lowercased words, punctuation dropped. Hyphens stay inside words.
fn tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .map(|w| w.trim_matches('-'))
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect()
}

fn mentions(tokens: &[String], keyword: &str) -> bool {
    let wanted = self::tokens(keyword);
    match wanted.len() {
        0 => false,
        1 => tokens.iter().any(|t| *t == wanted[0]),
        n => tokens.windows(n).any(|w| w == wanted.as_slice()),
    }
}

impl RequestClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            image_keywords: config.image_keywords.clone(),
            layout_keywords: config.layout_keywords.clone(),
            intents: IntentClassifier::new(),
        }
    }

    pub fn classify(&self, prompt: &str, has_image: bool, has_layout: bool) -> RequestType {
        if has_image || has_layout {
            return RequestType::visual(has_image, has_layout);
        }

        let words = tokens(prompt);
        let image_hit = self.image_keywords.iter().any(|k| mentions(&words, k));
        let layout_hit = self.layout_keywords.iter().any(|k| mentions(&words, k));
        if image_hit || layout_hit {
            return RequestType::visual(image_hit, layout_hit);
        }

        if words.iter().any(|w| w == "create") {
            return RequestType::visual(false, false);
        }
        RequestType::standard()
    }

    /// Classify, then fail when the prompt refers to an image or layout that
    /// was not attached. Creation requests are exempt.
    pub fn assert_satisfiable(
        &self,
        prompt: &str,
        image: Option<&str>,
        layout: Option<&str>,
    ) -> Result<RequestType, AgentError> {
        let request_type = self.classify(prompt, image.is_some(), layout.is_some());

        let creating = self.intents.classify(prompt) == Some(Intent::Create)
            || tokens(prompt).iter().any(|w| w == "create");
        if creating {
            return Ok(request_type);
        }

        if request_type.has_image && image.is_none() {
            return Err(AgentError::MissingAttachment {
                attachment: Attachment::Image,
            });
        }
        if request_type.has_layout && layout.is_none() {
            return Err(AgentError::MissingAttachment {
                attachment: Attachment::Layout,
            });
        }
        Ok(request_type)
    }
}

impl Default for RequestClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}
