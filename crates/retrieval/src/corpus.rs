//! Per-tenant corpus storage on the filesystem.
//!
//! Layout: `<root>/<tenant_key>/*.txt` plus `<root>/<tenant_key>/citations.csv`.
//! Nothing is cached; every call reads the directory again, so documents
//! added or edited on disk are picked up by the next request.

use crate::citations::CitationIndex;
use crate::types::{is_document_name, Corpus, Document};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Name of the citation side-table inside a tenant directory.
pub const CITATION_INDEX_FILE: &str = "citations.csv";

/// Reads tenant documents and citation side-tables.
#[derive(Debug, Clone)]
pub struct CorpusStore {
    root: PathBuf,
}

impl CorpusStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one tenant's files.
    pub fn tenant_dir(&self, tenant_key: &str) -> PathBuf {
        self.root.join(tenant_key)
    }

    /// Load every document directly under the tenant directory, sorted by
    /// file name.
    ///
    /// Symlinked documents are followed. A missing or unreadable directory
    /// yields an empty corpus; unreadable files and broken links are skipped
    /// with a warning. Bytes that are not UTF-8 are replaced.
    pub fn load(&self, tenant_key: &str) -> Corpus {
        let dir = self.tenant_dir(tenant_key);

        if !dir.is_dir() {
            tracing::debug!(tenant = tenant_key, "No corpus directory at {:?}", dir);
            return Corpus::default();
        }

        let mut documents = Vec::new();

        for entry in WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(tenant = tenant_key, "Skipping corpus entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                if entry.path_is_symlink() {
                    tracing::debug!(tenant = tenant_key, "Skipping non-file link {:?}", entry.path());
                }
                continue;
            }

            let Some(file_name) = entry.file_name().to_str() else {
                continue;
            };
            if !is_document_name(file_name) {
                continue;
            }

            match std::fs::read(entry.path()) {
                Ok(bytes) => documents.push(Document::new(
                    file_name,
                    String::from_utf8_lossy(&bytes).into_owned(),
                )),
                Err(e) => {
                    tracing::warn!(tenant = tenant_key, file = file_name, "Failed to read document: {}", e);
                }
            }
        }

        tracing::debug!(tenant = tenant_key, documents = documents.len(), "Loaded corpus");
        Corpus::new(documents)
    }

    /// Load the tenant's citation index; missing file yields an empty index.
    pub fn load_citations(&self, tenant_key: &str) -> CitationIndex {
        CitationIndex::load(&self.tenant_dir(tenant_key).join(CITATION_INDEX_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn store_with(files: &[(&str, &str)]) -> (TempDir, CorpusStore) {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("springfield");
        fs::create_dir_all(&dir).unwrap();
        for (name, body) in files {
            fs::write(dir.join(name), body).unwrap();
        }
        let store = CorpusStore::new(temp.path());
        (temp, store)
    }

    #[test]
    fn test_load_only_document_files_in_name_order() {
        let (_temp, store) = store_with(&[
            ("zoning.txt", "Zoning text"),
            ("animals.txt", "Animal text"),
            ("readme.md", "ignored"),
            ("citations.csv", "animals.txt,1,Animals"),
        ]);

        let corpus = store.load("springfield");
        let names: Vec<_> = corpus.documents().iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(names, vec!["animals.txt", "zoning.txt"]);
        assert_eq!(corpus.get("zoning.txt").unwrap().text, "Zoning text");
    }

    #[test]
    fn test_subdirectories_are_not_walked() {
        let (temp, store) = store_with(&[("a.txt", "A")]);
        let nested = temp.path().join("springfield/archive");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("old.txt"), "old").unwrap();

        assert_eq!(store.load("springfield").len(), 1);
    }

    #[test]
    fn test_missing_directory_is_empty_corpus() {
        let temp = TempDir::new().unwrap();
        let store = CorpusStore::new(temp.path().join("nowhere"));
        assert!(store.load("springfield").is_empty());
        assert!(store.load_citations("springfield").is_empty());
    }

    #[test]
    fn test_corpus_changes_are_seen_without_restart() {
        let (temp, store) = store_with(&[("a.txt", "A")]);
        assert_eq!(store.load("springfield").len(), 1);

        fs::write(temp.path().join("springfield/b.txt"), "B").unwrap();
        assert_eq!(store.load("springfield").len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_documents_are_loaded() {
        let (temp, store) = store_with(&[("a.txt", "A")]);
        let shared = temp.path().join("shared");
        fs::create_dir_all(&shared).unwrap();
        fs::write(shared.join("ordinance.txt"), "Shared ordinance").unwrap();
        std::os::unix::fs::symlink(
            shared.join("ordinance.txt"),
            temp.path().join("springfield/ordinance.txt"),
        )
        .unwrap();

        let corpus = store.load("springfield");
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.get("ordinance.txt").unwrap().text, "Shared ordinance");
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_link_is_skipped() {
        let (temp, store) = store_with(&[("a.txt", "A")]);
        std::os::unix::fs::symlink(
            temp.path().join("gone.txt"),
            temp.path().join("springfield/gone.txt"),
        )
        .unwrap();

        assert_eq!(store.load("springfield").len(), 1);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let (temp, store) = store_with(&[]);
        fs::write(temp.path().join("springfield/bin.txt"), [b'o', b'k', 0xff]).unwrap();

        let corpus = store.load("springfield");
        assert!(corpus.get("bin.txt").unwrap().text.starts_with("ok"));
    }
}
