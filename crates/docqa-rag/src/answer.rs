//! Rendering retrieved chunks as a cited answer.
//!
//! No text is generated: the answer is the retrieved passages themselves, each
//! labelled with the file (and page) it came from.

use std::fmt::Write;

use docqa_core::types::{Metadata, SearchHit};

pub const PREAMBLE: &str = "Here are the most relevant passages I found:\n\n";
pub const NOT_FOUND: &str = "I don\u{2019}t know based on the provided documents.";

const DIVIDER: &str = "----------------------------------------";

/// `[i] name.pdf (page N)` blocks in hit order. `question` is accepted for
/// future answer strategies and does not affect the output.
pub fn format_answer(_question: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return NOT_FOUND.to_string();
    }
    let mut out = String::from(PREAMBLE);
    for (i, hit) in hits.iter().enumerate() {
        let _ = write!(out, "{}\n{}\n\n", citation(i + 1, &hit.chunk.metadata), hit.chunk.text.trim());
    }
    out
}

/// Raw retrieved text, one `SOURCE i` block per hit.
pub fn format_sources(hits: &[SearchHit]) -> String {
    let mut out = String::new();
    for (i, hit) in hits.iter().enumerate() {
        let _ = write!(out, "SOURCE {}\n{}\n{}\n", i + 1, hit.chunk.text, DIVIDER);
    }
    out
}

fn citation(position: usize, meta: &Metadata) -> String {
    match meta.page {
        Some(page) => format!("[{}] {} (page {})", position, meta.source_name(), page + 1),
        None => format!("[{}] {}", position, meta.source_name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_core::types::Chunk;

    fn hit(text: &str, meta: Metadata) -> SearchHit {
        SearchHit { chunk: Chunk::new(text, meta), distance: 0.5 }
    }

    #[test]
    fn no_hits_means_not_found() {
        assert_eq!(format_answer("anything?", &[]), "I don’t know based on the provided documents.");
        assert_eq!(format_sources(&[]), "");
    }

    #[test]
    fn cites_basename_and_one_based_page() {
        let hits = vec![
            hit("  First passage.\n", Metadata::new("/tmp/up/manual.pdf").with_page(0)),
            hit("Second passage.", Metadata::new("notes.txt")),
        ];
        let answer = format_answer("q", &hits);
        assert_eq!(
            answer,
            "Here are the most relevant passages I found:\n\n\
             [1] manual.pdf (page 1)\nFirst passage.\n\n\
             [2] notes.txt\nSecond passage.\n\n"
        );
    }

    #[test]
    fn sources_keep_raw_text() {
        let hits = vec![hit("  raw  ", Metadata::new("a.md"))];
        let out = format_sources(&hits);
        assert!(out.starts_with("SOURCE 1\n  raw  \n"));
        assert!(out.trim_end().ends_with(DIVIDER));
    }
}
