//! Citation rewriting.
//!
//! Generated answers cite excerpts as `[zoning-4.txt]`. The rewriter finds
//! those markers with a small scanner and replaces each with a label from
//! the tenant's [`CitationIndex`]:
//!
//! | index state              | label                         |
//! |--------------------------|-------------------------------|
//! | entry, article present   | `Article 4 — Parking`         |
//! | entry, article empty     | `Article — Parking`           |
//! | no entry                 | `zoning-4`                    |
//! | index empty              | `zoning-4`                    |
//!
//! Labels never contain square brackets, and the output is rescanned until no
//! marker is left, so rewriting already rewritten text changes nothing.

use crate::citations::CitationIndex;
use crate::types::{document_stem, is_document_name};

/// A raw citation marker found in text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CitationMarker<'a> {
    /// Byte offset of `[`
    pub start: usize,

    /// Byte offset one past `]`
    pub end: usize,

    /// Text between the brackets
    pub file_name: &'a str,
}

/// Find all markers, left to right, non-overlapping.
///
/// A marker is `[` + document file name + `]` with no brackets or line
/// breaks in between.
pub fn find_markers(text: &str) -> Vec<CitationMarker<'_>> {
    let mut markers = Vec::new();
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('[') {
        let inner_start = pos + offset + 1;

        let Some(rel) = text[inner_start..].find(['[', ']', '\n', '\r']) else {
            break;
        };
        let stop = inner_start + rel;

        if text.as_bytes()[stop] != b']' {
            // Another '[' or a line break: resume scanning from there.
            pos = stop;
            continue;
        }

        let file_name = &text[inner_start..stop];
        if is_document_name(file_name) {
            markers.push(CitationMarker {
                start: inner_start - 1,
                end: stop + 1,
                file_name,
            });
            pos = stop + 1;
        } else {
            pos = inner_start;
        }
    }

    markers
}

/// Label for one cited file.
pub fn citation_label(index: &CitationIndex, file_name: &str) -> String {
    let label = match index.get(file_name) {
        Some(entry) if !entry.article.is_empty() => {
            format!("Article {} — {}", entry.article, entry.title)
        }
        Some(entry) => format!("Article — {}", entry.title),
        None => document_stem(file_name).to_string(),
    };

    label.trim().replace('[', "(").replace(']', ")")
}

fn rewrite_once(index: &CitationIndex, text: &str, markers: &[CitationMarker<'_>]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    for marker in markers {
        out.push_str(&text[cursor..marker.start]);
        out.push_str(&citation_label(index, marker.file_name));
        cursor = marker.end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Replace every citation marker in `text`.
///
/// Text without markers is returned unchanged. When a replacement completes a
/// new marker around it (for example `[x[a.txt]y.txt]`), the result is
/// scanned again; each pass removes at least two brackets, so this ends.
pub fn rewrite_citations(index: &CitationIndex, text: &str) -> String {
    let mut current = text.to_string();

    loop {
        let markers = find_markers(&current);
        if markers.is_empty() {
            return current;
        }
        current = rewrite_once(index, &current, &markers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CitationEntry;

    fn index(entries: &[(&str, &str, &str)]) -> CitationIndex {
        let mut index = CitationIndex::default();
        for (file, article, title) in entries {
            index.insert(
                *file,
                CitationEntry {
                    article: article.to_string(),
                    title: title.to_string(),
                },
            );
        }
        index
    }

    #[test]
    fn test_article_label() {
        let index = index(&[("a.txt", "4", "Parking")]);
        assert_eq!(
            rewrite_citations(&index, "See [a.txt] for details."),
            "See Article 4 — Parking for details."
        );
    }

    #[test]
    fn test_empty_index_strips_suffix() {
        assert_eq!(rewrite_citations(&CitationIndex::default(), "See [a.txt]."), "See a.");
    }

    #[test]
    fn test_empty_article_and_missing_entry() {
        let index = index(&[("defs.txt", "", "Definitions")]);
        assert_eq!(
            rewrite_citations(&index, "[defs.txt] and [fees.txt]"),
            "Article — Definitions and fees"
        );
    }

    #[test]
    fn test_all_occurrences_are_replaced() {
        let index = index(&[("a.txt", "4", "Parking")]);
        assert_eq!(
            rewrite_citations(&index, "[a.txt][a.txt] [a.txt]"),
            "Article 4 — ParkingArticle 4 — Parking Article 4 — Parking"
        );
    }

    #[test]
    fn test_non_markers_are_left_alone() {
        let index = index(&[("a.txt", "4", "Parking")]);
        for text in [
            "no citations here",
            "[a.md] [.txt] [] [a.txt",
            "a.txt]",
            "[a\n.txt]",
            "[see a.txt",
        ] {
            assert_eq!(rewrite_citations(&index, text), text);
        }
    }

    #[test]
    fn test_nested_open_bracket_resumes_scan() {
        let index = index(&[("a.txt", "4", "Parking")]);
        assert_eq!(rewrite_citations(&index, "[note [a.txt]"), "[note Article 4 — Parking");
    }

    #[test]
    fn test_titles_with_brackets_cannot_rematch() {
        let index = index(&[("a.txt", "4", "Parking [see b.txt]")]);
        let once = rewrite_citations(&index, "Read [a.txt].");
        assert_eq!(once, "Read Article 4 — Parking (see b.txt).");
        assert_eq!(rewrite_citations(&index, &once), once);
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let index = index(&[("a.txt", "4", "Parking"), ("b.txt", "", "Fees")]);
        for text in [
            "See [a.txt] and [b.txt] and [c.txt].",
            "[x[a.txt]y.txt]",
            "plain text",
        ] {
            let once = rewrite_citations(&index, text);
            assert!(find_markers(&once).is_empty(), "markers left in {:?}", once);
            assert_eq!(rewrite_citations(&index, &once), once);
        }
    }

    #[test]
    fn test_find_markers_positions() {
        let markers = find_markers("ab [c.txt] d");
        assert_eq!(
            markers,
            vec![CitationMarker {
                start: 3,
                end: 10,
                file_name: "c.txt",
            }]
        );
    }

    #[test]
    fn test_unicode_around_markers() {
        let index = index(&[("é.txt", "9", "Accents")]);
        assert_eq!(rewrite_citations(&index, "→[é.txt]←"), "→Article 9 — Accents←");
    }
}
