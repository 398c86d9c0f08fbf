//! Section- and sentence-boundary aware chunking.
//!
//! Splits normalized text into overlapping windows sized for embedding and
//! retrieval: short structural sections are emitted whole, long ones are
//! split paragraph-by-paragraph with overlap, and any paragraph that would
//! still overflow falls back to a word-boundary split.

use crate::config::{MIN_CHUNK_LEN, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use crate::model::ChunkText;

/// Splits `text` into `ChunkText`s targeting `chunk_size` characters with
/// `overlap` characters shared between consecutive chunks.
///
/// Chunks shorter than [`MIN_CHUNK_LEN`] are discarded. A chunk that would
/// exceed `1.5 * chunk_size` is further split at word boundaries.
#[must_use]
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<ChunkText> {
    let max_len = (chunk_size as f64 * 1.5) as usize;
    let mut out = Vec::new();

    for section in split_sections(text) {
        let section = section.trim();
        if section.is_empty() {
            continue;
        }
        if section.len() <= chunk_size {
            push_if_long_enough(&mut out, section);
            continue;
        }
        for piece in split_paragraphs_with_overlap(section, chunk_size, overlap) {
            if piece.len() > max_len {
                for sub in split_by_words(&piece, chunk_size) {
                    push_if_long_enough(&mut out, &sub);
                }
            } else {
                push_if_long_enough(&mut out, &piece);
            }
        }
    }

    for (i, c) in out.iter_mut().enumerate() {
        c.index = i;
    }
    out
}

/// Convenience wrapper using the configuration defaults.
#[must_use]
pub fn chunk_text_default(text: &str) -> Vec<ChunkText> {
    chunk_text(text, DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
}

fn push_if_long_enough(out: &mut Vec<ChunkText>, text: &str) {
    if text.len() >= MIN_CHUNK_LEN {
        out.push(ChunkText {
            index: 0,
            text: text.to_string(),
        });
    }
}

/// Splits on the structural markers injected by normalization
/// (`SECTION:`, `CLAUSE`, `TABLE:`), keeping the marker with its section.
fn split_sections(text: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        let is_marker = line.trim_start().starts_with("SECTION:")
            || line.trim_start().starts_with("TABLE:")
            || line.trim_start().starts_with("CLAUSE");
        if is_marker && !current.trim().is_empty() {
            sections.push(std::mem::take(&mut current));
        }
        current.push_str(line);
        current.push('\n');
    }
    if !current.trim().is_empty() {
        sections.push(current);
    }
    if sections.is_empty() {
        sections.push(text.to_string());
    }
    sections
}

fn split_paragraphs_with_overlap(section: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let paragraphs: Vec<&str> = section.split("\n\n").filter(|p| !p.trim().is_empty()).collect();
    let paragraphs: Vec<&str> = if paragraphs.is_empty() {
        section.lines().filter(|l| !l.trim().is_empty()).collect()
    } else {
        paragraphs
    };

    let mut pieces = Vec::new();
    let mut current = String::new();

    for para in paragraphs {
        if !current.is_empty() && current.len() + para.len() + 2 > chunk_size {
            pieces.push(current.clone());
            let tail = tail_chars(&current, overlap);
            current = tail;
        }
        if !current.is_empty() {
            current.push_str("\n\n");
        }
        current.push_str(para.trim());
    }
    if !current.trim().is_empty() {
        pieces.push(current);
    }
    pieces
}

fn tail_chars(s: &str, n: usize) -> String {
    if n == 0 || s.is_empty() {
        return String::new();
    }
    let start = s.len().saturating_sub(n);
    let mut start = start.min(s.len());
    while start > 0 && !s.is_char_boundary(start) {
        start -= 1;
    }
    s[start..].to_string()
}

fn split_by_words(text: &str, chunk_size: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut pieces = Vec::new();
    let mut current = String::new();

    for word in words {
        if !current.is_empty() && current.len() + word.len() + 1 > chunk_size {
            pieces.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
