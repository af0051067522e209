use crate::error::{RagError, Result};

/// Split text into overlapping fixed-size character windows.
///
/// Boundaries are chosen purely by character count; the first `overlap`
/// characters of each chunk after the first repeat the tail of its
/// predecessor. Identical input always yields the identical sequence.
pub fn split(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    if chunk_size == 0 {
        return Err(RagError::Config("chunk_size must be non-zero".to_string()));
    }
    if overlap >= chunk_size {
        return Err(RagError::Config(format!(
            "chunk_overlap ({}) must be smaller than chunk_size ({})",
            overlap, chunk_size
        )));
    }

    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();

    if chars.is_empty() {
        return Ok(chunks);
    }

    let mut start = 0;
    while start < chars.len() {
        let end = std::cmp::min(start + chunk_size, chars.len());
        chunks.push(chars[start..end].iter().collect());

        if end == chars.len() {
            break;
        }
        start += chunk_size - overlap;
    }

    Ok(chunks)
}
