//! Prompt system for the Civic Assistant.
//!
//! A prompt definition holds two Handlebars templates: the system directive
//! (persona, grounding and citation rules) and the user message (context
//! block plus question). Definitions are YAML; a built-in default is used
//! when the workspace does not override it.

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{default_prompt, load_prompt, DEFAULT_PROMPT_ID};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptBehavior, PromptDefinition, PromptInput};
