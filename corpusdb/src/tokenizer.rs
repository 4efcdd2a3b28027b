use std::collections::{HashMap, HashSet};

/// Punctuation stripped from the ends of a token; characters inside a token
/// are left alone.
const ENCLOSING_PUNCTUATION: &[char] = &['.', ',', '?', '!'];

/// Tokenize text into the set of distinct normalized terms: split on
/// whitespace, lowercase, strip enclosing punctuation, drop empty leftovers.
pub fn tokenize(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|token| {
            token
                .to_lowercase()
                .trim_matches(ENCLOSING_PUNCTUATION)
                .to_string()
        })
        .filter(|term| !term.is_empty())
        .collect()
}

/// Count occurrences of each term within the lowercased text.
///
/// Counts are non-overlapping substring matches over the full text, so a term
/// is counted wherever it appears literally, including inside longer words.
pub fn term_frequencies(text: &str, terms: &HashSet<String>) -> HashMap<String, u64> {
    let lowered = text.to_lowercase();
    terms
        .iter()
        .map(|term| (term.clone(), lowered.matches(term.as_str()).count() as u64))
        .collect()
}
