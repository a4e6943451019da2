//! Recursive character splitting with overlap.
//!
//! Text is cut at the coarsest separator that occurs in it; pieces that are
//! still too long are cut again with the next finer separator, down to single
//! characters. Small pieces are then greedily merged back into windows of at
//! most `chunk_size` characters, each window starting with up to
//! `chunk_overlap` characters carried over from the previous one.
//!
//! Lengths are counted in `char`s, not bytes.

use std::collections::VecDeque;

use tracing::debug;

use docqa_core::config::ChunkingConfig;
use docqa_core::types::{Chunk, Document};

/// Split every document, keeping each document's metadata on its chunks.
pub fn split_documents(docs: &[Document], config: &ChunkingConfig) -> Vec<Chunk> {
    let chunks: Vec<Chunk> = docs
        .iter()
        .flat_map(|doc| {
            split_text(&doc.text, config)
                .into_iter()
                .map(move |text| Chunk::new(text, doc.metadata.clone()))
        })
        .collect();
    debug!("Split {} documents into {} chunks", docs.len(), chunks.len());
    chunks
}

pub fn split_text(text: &str, config: &ChunkingConfig) -> Vec<String> {
    let separators: Vec<&str> = config.separators.iter().map(String::as_str).collect();
    let mut out = Vec::new();
    split_recursive(text, &separators, config, &mut out);
    out
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn split_recursive(text: &str, separators: &[&str], config: &ChunkingConfig, out: &mut Vec<String>) {
    let mut separator = separators.last().copied().unwrap_or("");
    let mut finer: &[&str] = &[];
    for (i, &sep) in separators.iter().enumerate() {
        if sep.is_empty() {
            separator = "";
            break;
        }
        if text.contains(sep) {
            separator = sep;
            finer = &separators[i + 1..];
            break;
        }
    }

    let mut small: Vec<&str> = Vec::new();
    for piece in split_keep_separator(text, separator) {
        if char_len(piece) < config.chunk_size {
            small.push(piece);
            continue;
        }
        if !small.is_empty() {
            out.extend(merge_pieces(&small, config));
            small.clear();
        }
        if finer.is_empty() {
            out.push(piece.to_string());
        } else {
            split_recursive(piece, finer, config, out);
        }
    }
    if !small.is_empty() {
        out.extend(merge_pieces(&small, config));
    }
}

/// Split on `separator`, leaving each separator at the start of the piece that
/// follows it. An empty separator yields single characters. Empty pieces are dropped.
fn split_keep_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }
    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

fn merge_pieces(pieces: &[&str], config: &ChunkingConfig) -> Vec<String> {
    let mut windows = Vec::new();
    let mut current: VecDeque<(&str, usize)> = VecDeque::new();
    let mut total = 0usize;

    for &piece in pieces {
        let len = char_len(piece);
        if total + len > config.chunk_size && !current.is_empty() {
            if let Some(window) = join_window(&current) {
                windows.push(window);
            }
            while total > config.chunk_overlap || (total + len > config.chunk_size && total > 0) {
                match current.pop_front() {
                    Some((_, dropped)) => total -= dropped,
                    None => break,
                }
            }
        }
        current.push_back((piece, len));
        total += len;
    }
    if let Some(window) = join_window(&current) {
        windows.push(window);
    }
    windows
}

fn join_window(pieces: &VecDeque<(&str, usize)>) -> Option<String> {
    let joined: String = pieces.iter().map(|(p, _)| *p).collect();
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
