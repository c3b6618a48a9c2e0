//! Splitting rendered payloads under a message-size ceiling.

/// Splits `text` into ordered, non-overlapping pieces of at most `ceiling`
/// characters. Concatenating the pieces yields `text`.
///
/// A ceiling of zero is treated as one.
pub fn chunk(text: &str, ceiling: usize) -> Vec<&str> {
    let ceiling = ceiling.max(1);
    let mut chunks = Vec::with_capacity(text.len() / ceiling + 1);
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == ceiling {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}
