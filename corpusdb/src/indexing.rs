use std::collections::hash_map::Entry;
use std::collections::HashMap;

use time::Date;

use crate::error::{Error, Result, StorageError};
use crate::index::{DocId, Document, TermEntry};
use crate::store::Store;
use crate::tokenizer::{term_frequencies, tokenize};

/// Insert a vocabulary row for `term` unless one exists; the stored character
/// count is fixed at first insertion and never recomputed.
pub fn ensure_term(store: &Store, term: &str) -> Result<()> {
    let entry = TermEntry {
        num_chars: term.chars().count() as u32,
    };
    store.insert_term_if_absent(term, entry)?;
    Ok(())
}

/// Insert or additively increment the (document, term) posting.
///
/// Calling this twice for the same pair without an intervening delete
/// double-counts; the lifecycle operations below always delete before
/// re-indexing a document.
pub fn upsert_posting(store: &Store, doc_id: DocId, term: &str, count: u64) -> Result<()> {
    store.increment_posting(doc_id, term, count)?;
    Ok(())
}

/// Remove every posting held by a document. After each removal, the term is
/// checked across all documents and its vocabulary row is deleted once no
/// posting anywhere references it.
pub fn delete_document_postings(store: &Store, doc_id: DocId) -> Result<()> {
    for posting in store.postings_for_document(doc_id)? {
        store.remove_posting(doc_id, &posting.term)?;
        if !store.term_has_postings(&posting.term)? {
            store.remove_term(&posting.term)?;
            tracing::debug!(term = %posting.term, "removed orphaned term");
        }
    }
    Ok(())
}

/// Index a new document: validate the category, store the document row, then
/// ensure its terms exist and write one posting per distinct term.
pub fn create_document(
    store: &Store,
    id: DocId,
    text: &str,
    title: &str,
    date: Date,
    category: &str,
) -> Result<()> {
    let category = match store.category_by_name(category)? {
        Some(category) => category,
        None => return Err(Error::CategoryNotFound(category.to_string())),
    };

    let num_chars = text.chars().filter(|c| c.is_alphanumeric()).count() as u32;
    store.insert_document(&Document {
        id,
        text: text.to_string(),
        title: title.to_string(),
        num_chars,
        date,
        category: category.name,
    })?;

    let terms = tokenize(text);
    for term in &terms {
        ensure_term(store, term)?;
    }
    for (term, count) in term_frequencies(text, &terms) {
        upsert_posting(store, id, &term, count)?;
    }

    tracing::debug!(doc_id = id, terms = terms.len(), num_chars, "document indexed");
    Ok(())
}

/// Delete a document and its postings, cleaning up orphaned terms. Deleting
/// an absent id is a no-op.
pub fn delete_document(store: &Store, id: DocId) -> Result<()> {
    delete_document_postings(store, id)?;
    let removed = store.remove_document(id)?;
    tracing::debug!(doc_id = id, removed, "document deleted");
    Ok(())
}

/// Replace a document under the same id: delete, then create. The term and
/// posting set is recomputed from scratch from the new text.
pub fn update_document(
    store: &Store,
    id: DocId,
    text: &str,
    title: &str,
    date: Date,
    category: &str,
) -> Result<()> {
    delete_document(store, id)?;
    create_document(store, id, text, title, date, category)
}

/// Assemble the inverted index: for each term, the `", "`-joined list of
/// `"title:count"` entries over every document containing it, in ascending
/// document-id order.
pub fn inverted_index(store: &Store) -> Result<HashMap<String, String>> {
    let mut index: HashMap<String, String> = HashMap::new();
    for posting in store.postings()? {
        let doc = match store.document(posting.doc_id)? {
            Some(doc) => doc,
            None => {
                return Err(StorageError::Constraint(format!(
                    "posting references missing document {}",
                    posting.doc_id
                ))
                .into())
            }
        };
        match index.entry(posting.term) {
            Entry::Occupied(mut slot) => {
                slot.get_mut()
                    .push_str(&format!(", {}:{}", doc.title, posting.count));
            }
            Entry::Vacant(slot) => {
                slot.insert(format!("{}:{}", doc.title, posting.count));
            }
        }
    }
    Ok(index)
}
