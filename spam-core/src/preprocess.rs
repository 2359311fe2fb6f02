//! Text normalization shared by training and inference

/// Lowercase `text`, drop everything that is not `a-z` or whitespace, then trim.
///
/// Digits, punctuation and symbols are removed outright, so `"don't"` becomes
/// `"dont"` and `"$10,000"` disappears. The output only contains characters the
/// filter keeps, which makes the function idempotent.
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_whitespace())
        .collect();

    cleaned.trim().to_string()
}

/// Split already-normalized text into tokens
pub fn tokenize(normalized: &str) -> impl Iterator<Item = &str> + '_ {
    normalized.split_whitespace()
}
