//! Recipe generation: the request sent to the language model and the handling
//! of whatever comes back.
//!
//! The network client lives in the binary and plugs in through
//! [`CompletionProvider`]; everything here is synchronous and side-effect free
//! apart from the single provider call made by [`generate`].

use serde::Serialize;
use tracing::{info, warn};

use crate::error::GenerateError;
use crate::format::format_recipe;
use crate::models::GeneratedRecipe;

pub const SYSTEM_INSTRUCTION: &str = "You are a recipe generating assistant. When given a prompt, \
generate a recipe as a JSON object with the following keys: 'name' (string), \
'ingredients' (a comma-separated string), 'calories' (an integer), \
and 'recipe_text' (string with full instructions). Ensure the JSON is valid.";

pub const DEFAULT_MODEL: &str = "gpt-4";
pub const TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS: u32 = 500;

/// Prefix of the text shown when the service call itself fails.
pub const ERROR_PREFIX: &str = "Error generating recipe";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Body of a chat-completions request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// The fixed two-message exchange used for every recipe request.
    #[must_use]
    pub fn recipe(model: &str, prompt: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: Role::System,
                    content: SYSTEM_INSTRUCTION.to_string(),
                },
                ChatMessage {
                    role: Role::User,
                    content: prompt.to_string(),
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }
}

/// Text-generation backend.
///
/// Implementations block until the service answers; callers run them off the
/// UI thread.
pub trait CompletionProvider: Send + Sync {
    /// Return the assistant message content for `request`.
    fn complete(&self, request: &CompletionRequest) -> Result<String, GenerateError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// The response was a well-formed recipe object.
    Parsed,
    /// The response arrived but was not a recipe object; shown verbatim.
    Raw,
    /// The service call failed.
    Failed,
}

/// Result of one generation request, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub kind: OutcomeKind,
    pub display_text: String,
    pub recipe: Option<GeneratedRecipe>,
}

impl GenerationOutcome {
    #[must_use]
    pub fn failed(err: &GenerateError) -> Self {
        Self {
            kind: OutcomeKind::Failed,
            display_text: format!("{ERROR_PREFIX}: {err}"),
            recipe: None,
        }
    }
}

/// Trimmed prompt, or `None` if there is nothing to send.
#[must_use]
pub fn validate_prompt(input: &str) -> Option<&str> {
    let prompt = input.trim();
    (!prompt.is_empty()).then_some(prompt)
}

/// Ask `provider` for a recipe. Makes exactly one provider call.
pub fn generate(provider: &dyn CompletionProvider, model: &str, prompt: &str) -> GenerationOutcome {
    let request = CompletionRequest::recipe(model, prompt);
    info!(model, prompt_len = prompt.len(), "requesting recipe");
    match provider.complete(&request) {
        Ok(content) => {
            let outcome = interpret_response(&content);
            info!(kind = ?outcome.kind, "recipe response received");
            outcome
        }
        Err(err) => {
            warn!(error = %err, "recipe generation failed");
            GenerationOutcome::failed(&err)
        }
    }
}

/// Turn the assistant's message into display text plus an optional recipe.
#[must_use]
pub fn interpret_response(content: &str) -> GenerationOutcome {
    let raw = content.trim();
    match parse_recipe(raw) {
        Some(recipe) => GenerationOutcome {
            kind: OutcomeKind::Parsed,
            display_text: format_recipe(&recipe),
            recipe: Some(recipe),
        },
        None => GenerationOutcome {
            kind: OutcomeKind::Raw,
            display_text: raw.to_string(),
            recipe: None,
        },
    }
}

/// Strictly parse a recipe object: all four keys present with the right types.
#[must_use]
pub fn parse_recipe(raw: &str) -> Option<GeneratedRecipe> {
    serde_json::from_str(strip_code_fence(raw)).ok()
}

// Models sometimes wrap the object in a ```json fence despite the instruction.
fn strip_code_fence(raw: &str) -> &str {
    let Some(rest) = raw.strip_prefix("```") else {
        return raw;
    };
    let Some((_lang, body)) = rest.split_once('\n') else {
        return raw;
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
