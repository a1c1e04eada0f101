//! Citation side-table: document file name -> article and title.
//!
//! Format, one record per line:
//!
//! ```text
//! zoning-4.txt, 4, Parking and Loading
//! ```
//!
//! Fields are comma-separated and trimmed. The title is everything after the
//! second comma, so titles may contain commas. Lines with fewer than three
//! fields, or whose first field is not a document file name, are skipped;
//! this also drops a header row. A repeated file name keeps its last entry.

use crate::types::{is_document_name, CitationEntry};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CitationIndex {
    entries: BTreeMap<String, CitationEntry>,
}

impl CitationIndex {
    /// Parse side-table contents.
    pub fn parse(contents: &str) -> Self {
        let contents = contents.strip_prefix('\u{feff}').unwrap_or(contents);
        let mut entries = BTreeMap::new();

        for line in contents.lines() {
            let fields: Vec<&str> = line.splitn(3, ',').map(str::trim).collect();
            if fields.len() < 3 || !is_document_name(fields[0]) {
                continue;
            }

            entries.insert(
                fields[0].to_string(),
                CitationEntry {
                    article: fields[1].to_string(),
                    title: fields[2].to_string(),
                },
            );
        }

        Self { entries }
    }

    /// Read and parse the side-table at `path`; a missing or unreadable file
    /// yields an empty index.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let index = Self::parse(&contents);
                tracing::debug!("Loaded {} citation entries from {:?}", index.len(), path);
                index
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                tracing::warn!("Failed to read citation index {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn get(&self, file_name: &str) -> Option<&CitationEntry> {
        self.entries.get(file_name)
    }

    pub fn insert(&mut self, file_name: impl Into<String>, entry: CitationEntry) {
        self.entries.insert(file_name.into(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
