use docqa_core::config::ChunkingConfig;
use docqa_core::types::{Document, Metadata};
use docqa_ingest::{split_documents, split_text};

fn config(chunk_size: usize, chunk_overlap: usize) -> ChunkingConfig {
    ChunkingConfig { chunk_size, chunk_overlap, ..ChunkingConfig::default() }
}

fn sample_text() -> String {
    let para = "Fire needs heat, fuel and oxygen. Remove one and the fire goes out. \
                Dry tinder catches quickly while green wood smoulders.";
    let mut text = String::new();
    for i in 0..6 {
        text.push_str(&format!("Section {i}.\n{para}\n{para}\n\n"));
    }
    text.push_str(&"x".repeat(130));
    text
}

/// Every non-whitespace character of `original` appears, in order, in `chunks`.
fn covers_in_order(original: &str, chunks: &[String]) -> bool {
    let joined: String = chunks.concat();
    let mut haystack = joined.chars().filter(|c| !c.is_whitespace());
    original
        .chars()
        .filter(|c| !c.is_whitespace())
        .all(|needle| haystack.any(|c| c == needle))
}

#[test]
fn short_text_is_one_chunk() {
    let text = "The sky is blue. Grass is green.";
    assert_eq!(split_text(text, &ChunkingConfig::default()), vec![text.to_string()]);
}

#[test]
fn paragraphs_fit_in_one_chunk_when_small() {
    let text = "First para.\n\nSecond para.";
    assert_eq!(split_text(text, &ChunkingConfig::default()), vec![text.to_string()]);
}

#[test]
fn chunks_respect_size_and_drop_nothing() {
    let text = sample_text();
    for (size, overlap) in [(900, 150), (120, 30), (40, 10), (7, 2)] {
        let chunks = split_text(&text, &config(size, overlap));
        assert!(chunks.len() > 1 || size >= text.chars().count(), "size={size}");
        for c in &chunks {
            assert!(c.chars().count() <= size, "size={size} chunk={c:?}");
            assert!(!c.trim().is_empty());
        }
        assert!(covers_in_order(&text, &chunks), "size={size} lost characters");
    }
}

#[test]
fn unbroken_run_falls_back_to_character_windows() {
    let chunks = split_text(&"x".repeat(25), &config(10, 3));
    let lens: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
    assert_eq!(lens, vec![10, 10, 10, 4]);
}

#[test]
fn neighbouring_chunks_overlap() {
    let text = "one two three four five six seven eight nine ten eleven twelve";
    let chunks = split_text(text, &config(20, 8));
    assert!(chunks.len() > 2);
    for pair in chunks.windows(2) {
        let last_word = pair[0].split_whitespace().last().unwrap();
        assert!(pair[1].starts_with(last_word), "{:?} then {:?}", pair[0], pair[1]);
    }
}

#[test]
fn chunks_keep_document_metadata_and_order() {
    let docs = vec![
        Document::new("alpha ".repeat(40), Metadata::new("a.pdf").with_page(0)),
        Document::new("", Metadata::new("empty.txt")),
        Document::new("bravo ".repeat(40), Metadata::new("a.pdf").with_page(1)),
        Document::new("charlie", Metadata::new("c.md")),
    ];
    let chunks = split_documents(&docs, &config(50, 10));
    assert!(chunks.iter().all(|c| c.metadata.source != "empty.txt"));

    let first_bravo = chunks.iter().position(|c| c.text.contains("bravo")).unwrap();
    assert!(chunks[..first_bravo].iter().all(|c| c.metadata.page == Some(0)));
    assert!(chunks[first_bravo..chunks.len() - 1].iter().all(|c| c.metadata.page == Some(1)));

    let last = chunks.last().unwrap();
    assert_eq!(last.text, "charlie");
    assert_eq!(last.metadata, Metadata::new("c.md"));
}
