//! Gated retrieval without generation.
//!
//! Ranking and citation rewriting only need the gate, the corpus store and the
//! context budget, so they work with no generation provider configured.

use crate::answer::AnswerRequest;
use crate::assembler::{assemble_context, ContextBlock, ContextSource};
use crate::corpus::CorpusStore;
use crate::rewriter::rewrite_citations;
use crate::scorer::score_documents;
use civic_access::{AccessGate, GatePass};
use civic_core::config::DEFAULT_MAX_CONTEXT_CHARS;
use civic_core::{AppConfig, AppError, AppResult};
use serde::Serialize;

/// Ranking and context for a query, without generation.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub pass: GatePass,

    /// Every document with its score, highest first
    pub ranked: Vec<ContextSource>,

    pub context: ContextBlock,
}

/// Access gate plus corpus reads for all tenants.
#[derive(Debug, Clone)]
pub struct Retriever {
    gate: AccessGate,
    store: CorpusStore,
    max_context_chars: usize,
}

impl Retriever {
    pub fn new(gate: AccessGate, store: CorpusStore) -> Self {
        Self {
            gate,
            store,
            max_context_chars: DEFAULT_MAX_CONTEXT_CHARS,
        }
    }

    pub fn with_max_context_chars(mut self, max_context_chars: usize) -> Self {
        self.max_context_chars = max_context_chars;
        self
    }

    /// Build from configuration: tenants, corpus root and context budget.
    ///
    /// # Errors
    /// `AppError::Config` for invalid tenants or a zero context budget.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        config.validate_retrieval()?;

        let gate = AccessGate::from_config(config)?;
        let store = CorpusStore::new(config.corpus_root());

        tracing::debug!(
            tenants = gate.tenants().len(),
            corpus = ?store.root(),
            budget = config.corpus.max_context_chars,
            "Retriever ready"
        );

        Ok(Self::new(gate, store).with_max_context_chars(config.corpus.max_context_chars))
    }

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    pub fn store(&self) -> &CorpusStore {
        &self.store
    }

    pub fn max_context_chars(&self) -> usize {
        self.max_context_chars
    }

    /// Operator toggle for every tenant. See [`AccessGate::set_access`].
    pub fn set_access(&self, operator_credential: &str, enabled: bool) -> AppResult<bool> {
        self.gate.set_access(operator_credential, enabled)
    }

    /// Gate the request, then rank the tenant's corpus and assemble context.
    pub fn search(&self, request: &AnswerRequest) -> AppResult<SearchResult> {
        let pass = self
            .gate
            .check(&request.tenant_key, request.token.as_deref(), request.now)?;
        let corpus = self.store.load(&pass.tenant_key);
        let scored = score_documents(&corpus, &request.query);
        let context = assemble_context(&scored, self.max_context_chars);

        let ranked = scored
            .iter()
            .map(|s| ContextSource {
                file_name: s.document.file_name.clone(),
                score: s.score,
            })
            .collect();

        Ok(SearchResult {
            pass,
            ranked,
            context,
        })
    }

    /// Rewrite citation markers in `text` using a tenant's index.
    ///
    /// Not gated; the tenant only has to exist.
    pub fn rewrite_citations(&self, tenant_key: &str, text: &str) -> AppResult<String> {
        let tenant = self
            .gate
            .tenants()
            .resolve(tenant_key)
            .ok_or_else(|| AppError::UnknownTenant(tenant_key.to_string()))?;

        let index = self.store.load_citations(tenant.key());
        Ok(rewrite_citations(&index, text))
    }
}
