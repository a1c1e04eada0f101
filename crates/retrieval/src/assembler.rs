//! Budgeted context assembly.

use crate::types::ScoredDocument;
use serde::Serialize;

/// A document that made it into the context block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextSource {
    pub file_name: String,
    pub score: f64,
}

/// The context block handed to the generation call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContextBlock {
    pub text: String,
    pub sources: Vec<ContextSource>,
}

impl ContextBlock {
    /// An empty block means no grounding is available.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Concatenate ranked documents into one block.
///
/// Each document contributes a `### [<file>]` header, its trimmed text and a
/// blank line. Before each document the running total of appended text
/// (characters, headers excluded) is compared with `max_chars`; once it has
/// reached the budget assembly stops. The document that crosses the budget is
/// kept whole.
pub fn assemble_context(ranked: &[ScoredDocument<'_>], max_chars: usize) -> ContextBlock {
    let mut block = ContextBlock::default();
    let mut total = 0usize;

    for scored in ranked {
        if total >= max_chars {
            break;
        }

        let text = scored.document.text.trim();
        block.text.push_str("### [");
        block.text.push_str(&scored.document.file_name);
        block.text.push_str("]\n");
        block.text.push_str(text);
        block.text.push_str("\n\n");

        total += text.chars().count();
        block.sources.push(ContextSource {
            file_name: scored.document.file_name.clone(),
            score: scored.score,
        });
    }

    tracing::debug!(
        documents = block.sources.len(),
        chars = total,
        budget = max_chars,
        "Assembled context"
    );

    block
}
