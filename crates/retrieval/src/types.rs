//! Retrieval type definitions.

use serde::{Deserialize, Serialize};

/// Suffix that marks a file as a corpus document and a citation target.
pub const DOCUMENT_SUFFIX: &str = ".txt";

/// True when `name` is a document file name: it ends with
/// [`DOCUMENT_SUFFIX`] and has something before it.
pub fn is_document_name(name: &str) -> bool {
    name.len() > DOCUMENT_SUFFIX.len() && name.ends_with(DOCUMENT_SUFFIX)
}

/// `name` without [`DOCUMENT_SUFFIX`].
pub fn document_stem(name: &str) -> &str {
    name.strip_suffix(DOCUMENT_SUFFIX).unwrap_or(name)
}

/// One corpus document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// File name including suffix; identity and raw citation marker
    pub file_name: String,

    /// Full text
    pub text: String,
}

impl Document {
    pub fn new(file_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            text: text.into(),
        }
    }
}

/// A tenant's documents in enumeration order.
///
/// The store enumerates files sorted by name, so order is stable for a fixed
/// corpus. Scoring ties fall back to this order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    documents: Vec<Document>,
}

impl Corpus {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, file_name: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.file_name == file_name)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl FromIterator<Document> for Corpus {
    fn from_iter<I: IntoIterator<Item = Document>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A document paired with its relevance score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument<'a> {
    pub document: &'a Document,
    pub score: f64,
}

/// Human label for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationEntry {
    /// Article or section identifier; may be empty
    pub article: String,

    pub title: String,
}
