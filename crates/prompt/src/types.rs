//! Prompt types.

use serde::{Deserialize, Serialize};

/// A prompt definition loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Behavioral settings
    #[serde(default)]
    pub behavior: PromptBehavior,

    /// Handlebars template for the system directive
    pub system: String,

    /// Handlebars template for the user message
    pub template: String,
}

/// Behavioral settings for prompt execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptBehavior {
    /// Tone (e.g., "friendly", "formal")
    pub tone: String,

    /// Style (e.g., "concise", "detailed")
    pub style: String,

    /// Sampling temperature passed to the generation call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Completion token limit passed to the generation call
    #[serde(rename = "maxTokens", skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for PromptBehavior {
    fn default() -> Self {
        Self {
            tone: "friendly".to_string(),
            style: "concise".to_string(),
            temperature: Some(0.2),
            max_tokens: Some(800),
        }
    }
}

/// Values substituted into a prompt definition.
#[derive(Debug, Clone, Serialize)]
pub struct PromptInput<'a> {
    /// Persona the assistant speaks as
    pub persona: &'a str,

    /// Canonical tenant key
    pub city: &'a str,

    /// Assembled context block
    pub context: &'a str,

    /// Raw user question
    pub query: &'a str,
}

/// A fully built prompt ready for the generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// System directive
    pub system: Option<String>,

    /// User message
    pub user: String,

    pub metadata: BuiltPromptMetadata,
}

/// Metadata about a built prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPromptMetadata {
    #[serde(rename = "sourcePromptId")]
    pub source_prompt_id: String,

    pub persona: String,

    #[serde(rename = "contextChars")]
    pub context_chars: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(rename = "maxTokens", skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}
