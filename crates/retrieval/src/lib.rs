//! Keyword-relevance retrieval and answering for the Civic Assistant.
//!
//! The pipeline for one request:
//!
//! 1. [`civic_access::AccessGate`] authorizes the tenant and token.
//! 2. [`CorpusStore`] reads the tenant's `.txt` documents.
//! 3. [`score_documents`] ranks them by whole-word query hits plus a fixed
//!    topical bonus.
//! 4. [`assemble_context`] concatenates them under a character budget.
//! 5. The generation collaborator answers from that context.
//! 6. [`rewrite_citations`] turns `[file.txt]` markers into article labels
//!    using the tenant's [`CitationIndex`].
//!
//! [`Retriever`] covers steps 1 to 4 and citation rewriting with no
//! generation provider; [`Assistant`] adds step 5 on top of it.

pub mod answer;
pub mod assembler;
pub mod citations;
pub mod corpus;
pub mod retriever;
pub mod rewriter;
pub mod scorer;
pub mod types;

#[cfg(test)]
mod tests;

pub use answer::{Answer, AnswerKind, AnswerRequest, Assistant, NO_ANSWER_TEXT, NO_GROUNDING_TEXT};
pub use assembler::{assemble_context, ContextBlock, ContextSource};
pub use citations::CitationIndex;
pub use corpus::CorpusStore;
pub use retriever::{Retriever, SearchResult};
pub use rewriter::{citation_label, find_markers, rewrite_citations, CitationMarker};
pub use scorer::{score_documents, tokenize_query};
pub use types::{CitationEntry, Corpus, Document, ScoredDocument, DOCUMENT_SUFFIX};
