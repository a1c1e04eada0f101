//! Gated retrieval-and-answer orchestration.
//!
//! Runs the gate, reads the tenant's corpus, ranks and assembles context,
//! calls the generation client and rewrites citations in its output.

use crate::assembler::ContextSource;
use crate::corpus::CorpusStore;
use crate::retriever::{Retriever, SearchResult};
use crate::rewriter::rewrite_citations;
use chrono::{DateTime, Utc};
use civic_access::AccessGate;
use civic_core::{AppConfig, AppError, AppResult};
use civic_llm::{create_client, LlmClient, LlmRequest};
use civic_prompt::{build_prompt, load_prompt, PromptDefinition, PromptInput, DEFAULT_PROMPT_ID};
use serde::Serialize;
use std::sync::Arc;
use tracing::Instrument;

/// Returned when the tenant's corpus yields no context.
pub const NO_GROUNDING_TEXT: &str =
    "I could not find any city documents to answer this question. Please contact city staff for help.";

/// Returned when the generation call comes back blank.
pub const NO_ANSWER_TEXT: &str =
    "I'm sorry, I could not produce an answer right now. Please try again later.";

/// Message surfaced when the generation call fails.
const GENERATION_FAILED: &str = "the assistant is temporarily unavailable";

/// One inbound question.
#[derive(Debug, Clone)]
pub struct AnswerRequest {
    pub tenant_key: String,

    /// Token presented by the caller, if any
    pub token: Option<String>,

    /// Evaluation time for the activation window
    pub now: DateTime<Utc>,

    pub query: String,
}

impl AnswerRequest {
    pub fn new(
        tenant_key: impl Into<String>,
        token: Option<String>,
        now: DateTime<Utc>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            tenant_key: tenant_key.into(),
            token,
            now,
            query: query.into(),
        }
    }
}

/// How an answer was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerKind {
    /// Generated from context, citations rewritten
    Generated,

    /// Context was empty; the generation call was skipped
    NoGrounding,

    /// The generation call returned nothing usable
    NoAnswer,
}

/// Answer returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub tenant_key: String,
    pub persona_name: String,
    pub kind: AnswerKind,
    pub text: String,

    /// Documents placed in context, in rank order
    pub sources: Vec<ContextSource>,
}

/// The assistant for all tenants: a [`Retriever`] plus the generation
/// client and answering prompt.
///
/// Cheap to share: wrap it in an `Arc` and call it from concurrent tasks.
pub struct Assistant {
    retriever: Retriever,
    client: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
}

impl Assistant {
    pub fn new(
        gate: AccessGate,
        store: CorpusStore,
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
    ) -> Self {
        Self::with_retriever(Retriever::new(gate, store), client, model)
    }

    /// Add generation to an existing retriever.
    pub fn with_retriever(
        retriever: Retriever,
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            retriever,
            client,
            model: model.into(),
            prompt: civic_prompt::default_prompt(),
        }
    }

    pub fn with_prompt(mut self, prompt: PromptDefinition) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_max_context_chars(mut self, max_context_chars: usize) -> Self {
        self.retriever = self.retriever.with_max_context_chars(max_context_chars);
        self
    }

    /// Build the assistant from configuration: everything
    /// [`Retriever::from_config`] reads, plus the active provider and the
    /// answering prompt.
    ///
    /// # Errors
    /// `AppError::Config` when validation fails or the provider cannot be
    /// created; `AppError::Prompt` for a broken prompt override.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        config.validate()?;

        let retriever = Retriever::from_config(config)?;
        let api_key = config.resolve_api_key(&config.provider);
        let client = create_client(
            &config.provider,
            config.provider_endpoint(),
            api_key.as_deref(),
            config.provider_timeout(),
        )?;
        let prompt = load_prompt(&config.workspace, DEFAULT_PROMPT_ID)?;

        tracing::info!(
            tenants = retriever.gate().tenants().len(),
            provider = client.provider_name(),
            model = %config.model,
            "Assistant ready"
        );

        Ok(Self::with_retriever(retriever, client, config.model.clone()).with_prompt(prompt))
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub fn gate(&self) -> &AccessGate {
        self.retriever.gate()
    }

    pub fn store(&self) -> &CorpusStore {
        self.retriever.store()
    }

    /// Operator toggle for every tenant. See [`AccessGate::set_access`].
    pub fn set_access(&self, operator_credential: &str, enabled: bool) -> AppResult<bool> {
        self.retriever.set_access(operator_credential, enabled)
    }

    /// See [`Retriever::search`].
    pub fn search(&self, request: &AnswerRequest) -> AppResult<SearchResult> {
        self.retriever.search(request)
    }

    /// Answer a question for a tenant.
    ///
    /// # Errors
    /// - gate failures (`UnknownTenant`, `InvalidToken`, `ServiceSuspended`)
    /// - `Prompt` if the prompt templates fail to render
    /// - `Generation` with a generic message if the generation call fails
    pub async fn answer(&self, request: &AnswerRequest) -> AppResult<Answer> {
        let span = tracing::info_span!("answer", tenant = %request.tenant_key);
        self.answer_inner(request).instrument(span).await
    }

    async fn answer_inner(&self, request: &AnswerRequest) -> AppResult<Answer> {
        let SearchResult { pass, context, .. } = self.search(request)?;

        if context.is_empty() {
            tracing::info!("No grounding available; skipping generation");
            return Ok(Answer {
                tenant_key: pass.tenant_key,
                persona_name: pass.persona_name,
                kind: AnswerKind::NoGrounding,
                text: NO_GROUNDING_TEXT.to_string(),
                sources: Vec::new(),
            });
        }

        let built = build_prompt(
            &self.prompt,
            &PromptInput {
                persona: &pass.persona_name,
                city: &pass.tenant_key,
                context: &context.text,
                query: &request.query,
            },
        )?;

        let mut llm_request = LlmRequest::new(built.user, self.model.clone());
        if let Some(system) = built.system {
            llm_request = llm_request.with_system(system);
        }
        if let Some(temperature) = built.metadata.temperature {
            llm_request = llm_request.with_temperature(temperature);
        }
        if let Some(max_tokens) = built.metadata.max_tokens {
            llm_request = llm_request.with_max_tokens(max_tokens);
        }

        tracing::debug!(
            documents = context.sources.len(),
            context_chars = built.metadata.context_chars,
            provider = self.client.provider_name(),
            "Calling generation client"
        );

        let response = self.client.complete(&llm_request).await.map_err(|e| {
            tracing::warn!(provider = self.client.provider_name(), "Generation failed: {}", e);
            AppError::Generation(GENERATION_FAILED.to_string())
        })?;

        if response.content.trim().is_empty() {
            tracing::warn!("Generation returned an empty answer");
            return Ok(Answer {
                tenant_key: pass.tenant_key,
                persona_name: pass.persona_name,
                kind: AnswerKind::NoAnswer,
                text: NO_ANSWER_TEXT.to_string(),
                sources: context.sources,
            });
        }

        let index = self.store().load_citations(&pass.tenant_key);
        let text = rewrite_citations(&index, response.content.trim());

        tracing::info!(documents = context.sources.len(), "Answered");

        Ok(Answer {
            tenant_key: pass.tenant_key,
            persona_name: pass.persona_name,
            kind: AnswerKind::Generated,
            text,
            sources: context.sources,
        })
    }

    /// See [`Retriever::rewrite_citations`].
    pub fn rewrite_citations(&self, tenant_key: &str, text: &str) -> AppResult<String> {
        self.retriever.rewrite_citations(tenant_key, text)
    }
}
