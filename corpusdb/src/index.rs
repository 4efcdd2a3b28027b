use serde::{Deserialize, Serialize};
use time::Date;

pub type DocId = u64;
pub type CategoryId = u64;

/// A document category; documents reference it by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Vocabulary entry for one normalized term, keyed by the term text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermEntry {
    /// Character count of the term text, fixed at first insertion.
    pub num_chars: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub text: String,
    pub title: String,
    /// Alphanumeric characters in `text`; whitespace and punctuation excluded.
    pub num_chars: u32,
    pub date: Date,
    /// Name of an existing category.
    pub category: String,
}

/// One (document, term) entry of the inverted index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub term: String,
    pub count: u64,
}
