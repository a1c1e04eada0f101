//! Text-generation client crate for the Civic Assistant.
//!
//! The generation call is an opaque collaborator: callers hand an
//! [`LlmRequest`] to any [`LlmClient`] and get text back. Two providers ship
//! with the crate:
//!
//! - **Ollama**: local runtime (default)
//! - **OpenAI**: any OpenAI-compatible chat-completions endpoint
//!
//! # Example
//! ```no_run
//! use civic_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Where can I park?", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::{create_client, ProviderType};
pub use providers::{OllamaClient, OpenAiClient};
