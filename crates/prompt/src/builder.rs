//! Prompt builder: renders the system directive and user message.

use crate::types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition, PromptInput};
use civic_core::{AppError, AppResult};
use handlebars::Handlebars;
use serde_json::json;

/// Build a prompt from a definition and the request's values.
///
/// Both templates see `persona`, `city`, `context`, `query`, `tone` and
/// `style`. Output is plain text, so HTML escaping is disabled.
pub fn build_prompt(definition: &PromptDefinition, input: &PromptInput<'_>) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("system", &definition.system)
        .map_err(|e| AppError::Prompt(format!("Failed to register system template: {}", e)))?;
    handlebars
        .register_template_string("user", &definition.template)
        .map_err(|e| AppError::Prompt(format!("Failed to register user template: {}", e)))?;

    let data = json!({
        "persona": input.persona,
        "city": input.city,
        "context": input.context,
        "query": input.query,
        "tone": definition.behavior.tone,
        "style": definition.behavior.style,
    });

    let system = handlebars
        .render("system", &data)
        .map_err(|e| AppError::Prompt(format!("Failed to render system template: {}", e)))?;
    let user = handlebars
        .render("user", &data)
        .map_err(|e| AppError::Prompt(format!("Failed to render user template: {}", e)))?;

    let system = if system.trim().is_empty() {
        None
    } else {
        Some(system)
    };

    Ok(BuiltPrompt {
        system,
        user,
        metadata: BuiltPromptMetadata {
            source_prompt_id: definition.id.clone(),
            persona: input.persona.to_string(),
            context_chars: input.context.chars().count(),
            temperature: definition.behavior.temperature,
            max_tokens: definition.behavior.max_tokens,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::default_prompt;
    use crate::types::PromptBehavior;

    fn input<'a>(context: &'a str, query: &'a str) -> PromptInput<'a> {
        PromptInput {
            persona: "Sparky",
            city: "springfield",
            context,
            query,
        }
    }

    #[test]
    fn test_default_prompt_mentions_persona_and_city() {
        let built = build_prompt(&default_prompt(), &input("### [a.txt]\nText", "Where?")).unwrap();

        let system = built.system.unwrap();
        assert!(system.contains("Sparky"));
        assert!(system.contains("springfield"));
        assert!(built.user.contains("### [a.txt]"));
        assert!(built.user.contains("Where?"));
        assert_eq!(built.metadata.persona, "Sparky");
    }

    #[test]
    fn test_no_html_escaping() {
        let def = PromptDefinition {
            id: "t".to_string(),
            title: "T".to_string(),
            api_version: "1.0".to_string(),
            behavior: PromptBehavior::default(),
            system: String::new(),
            template: "{{query}}".to_string(),
        };

        let built = build_prompt(&def, &input("", "Is <b>parking</b> & loading allowed?")).unwrap();
        assert_eq!(built.user, "Is <b>parking</b> & loading allowed?");
        assert!(built.system.is_none());
    }

    #[test]
    fn test_invalid_template_is_prompt_error() {
        let mut def = default_prompt();
        def.template = "{{#if}}".to_string();

        let err = build_prompt(&def, &input("", "q")).unwrap_err();
        assert!(matches!(err, AppError::Prompt(_)));
    }
}
