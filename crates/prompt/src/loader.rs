//! Prompt loader for YAML prompt definitions.

use crate::types::{PromptBehavior, PromptDefinition};
use civic_core::{AppError, AppResult};
use std::path::Path;

/// Identifier of the built-in answering prompt.
pub const DEFAULT_PROMPT_ID: &str = "city.answer";

const DEFAULT_SYSTEM: &str = "You are {{persona}}, the virtual assistant for the city of {{city}}.
Answer residents' questions using only the excerpts in the context. Keep a {{tone}}, {{style}} tone.

Rules:
- Every excerpt starts with a header such as ### [file.txt]. When you use an excerpt, cite it by writing its file name in square brackets exactly as in the header, for example [file.txt].
- If the excerpts do not contain the answer, say that you could not find it in the city's documents and suggest contacting city staff.
- Never invent regulations, fees, deadlines or article numbers.
";

const DEFAULT_TEMPLATE: &str = "Context:
{{context}}

Question: {{query}}";

/// The built-in answering prompt.
pub fn default_prompt() -> PromptDefinition {
    PromptDefinition {
        id: DEFAULT_PROMPT_ID.to_string(),
        title: "City document answer".to_string(),
        api_version: "1.0".to_string(),
        behavior: PromptBehavior::default(),
        system: DEFAULT_SYSTEM.to_string(),
        template: DEFAULT_TEMPLATE.to_string(),
    }
}

/// Load a prompt definition by ID.
///
/// Looks for `.civic/prompts/<id>.yml` in the workspace. When no such file
/// exists and `prompt_id` is [`DEFAULT_PROMPT_ID`], the built-in definition is
/// returned.
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = workspace_path
        .join(".civic/prompts")
        .join(format!("{}.yml", prompt_id));

    if !prompt_file.exists() {
        if prompt_id == DEFAULT_PROMPT_ID {
            tracing::debug!("Using built-in prompt {}", DEFAULT_PROMPT_ID);
            return Ok(default_prompt());
        }
        return Err(AppError::Prompt(format!(
            "Prompt file not found: {:?}",
            prompt_file
        )));
    }

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition)?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.template.contains("{{query}}") {
        return Err(AppError::Prompt(format!(
            "Prompt '{}' template must reference {{{{query}}}}",
            def.id
        )));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_prompt(dir: &Path, id: &str, body: &str) {
        let prompts_dir = dir.join(".civic/prompts");
        fs::create_dir_all(&prompts_dir).unwrap();
        fs::write(prompts_dir.join(format!("{}.yml", id)), body).unwrap();
    }

    #[test]
    fn test_default_prompt_without_override() {
        let temp = TempDir::new().unwrap();
        let prompt = load_prompt(temp.path(), DEFAULT_PROMPT_ID).unwrap();
        assert_eq!(prompt.id, DEFAULT_PROMPT_ID);
        assert!(prompt.system.contains("{{persona}}"));
    }

    #[test]
    fn test_workspace_override_wins() {
        let temp = TempDir::new().unwrap();
        write_prompt(
            temp.path(),
            DEFAULT_PROMPT_ID,
            "id: city.answer\ntitle: Custom\napiVersion: \"1.1\"\nsystem: \"Hi {{persona}}\"\ntemplate: \"{{context}} {{query}}\"\n",
        );

        let prompt = load_prompt(temp.path(), DEFAULT_PROMPT_ID).unwrap();
        assert_eq!(prompt.title, "Custom");
    }

    #[test]
    fn test_template_without_query_is_rejected() {
        let temp = TempDir::new().unwrap();
        write_prompt(
            temp.path(),
            "broken",
            "id: broken\ntitle: Broken\napiVersion: \"1.0\"\nsystem: s\ntemplate: \"{{context}}\"\n",
        );

        assert!(load_prompt(temp.path(), "broken").is_err());
    }

    #[test]
    fn test_load_nonexistent_prompt() {
        let temp = TempDir::new().unwrap();
        assert!(load_prompt(temp.path(), "nonexistent").is_err());
    }
}
