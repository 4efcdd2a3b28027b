use std::path::Path;

use crate::error::StorageError;
use crate::index::{Category, CategoryId, DocId, Document, Posting, TermEntry};

/// Keyed storage for the four relations, backed by one sled database with a
/// tree per relation.
///
/// Keys: category name, term text, big-endian document id, and
/// `document id ‖ term` for postings, so one prefix scan yields a document's
/// postings and full scans visit rows in ascending key order.
pub struct Store {
    db: sled::Db,
    categories: sled::Tree,
    terms: sled::Tree,
    documents: sled::Tree,
    postings: sled::Tree,
}

impl Store {
    /// Open a store directory, creating it and its trees if absent.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path)?;
        let categories = db.open_tree("categories")?;
        let terms = db.open_tree("terms")?;
        let documents = db.open_tree("documents")?;
        let postings = db.open_tree("postings")?;
        Ok(Store {
            db,
            categories,
            terms,
            documents,
            postings,
        })
    }

    /// Flush pending writes to disk.
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }

    // --- categories ---

    pub fn create_category(&self, id: CategoryId, name: &str) -> Result<(), StorageError> {
        if name.is_empty() {
            return Err(StorageError::Constraint(
                "category name must be non-empty".into(),
            ));
        }
        for existing in self.categories()? {
            if existing.id == id {
                return Err(StorageError::Constraint(format!(
                    "category id {id} already exists"
                )));
            }
        }
        let row = bincode::serialize(&Category {
            id,
            name: name.to_string(),
        })?;
        self.categories
            .compare_and_swap(name.as_bytes(), None::<&[u8]>, Some(row))?
            .map_err(|_| StorageError::Constraint(format!("category \"{name}\" already exists")))?;
        Ok(())
    }

    pub fn category_by_name(&self, name: &str) -> Result<Option<Category>, StorageError> {
        match self.categories.get(name.as_bytes())? {
            Some(row) => Ok(Some(bincode::deserialize(&row)?)),
            None => Ok(None),
        }
    }

    pub fn categories(&self) -> Result<Vec<Category>, StorageError> {
        let mut out = Vec::new();
        for entry in self.categories.iter() {
            let (_, row) = entry?;
            out.push(bincode::deserialize(&row)?);
        }
        Ok(out)
    }

    // --- terms ---

    /// Insert a vocabulary row unless one already exists for this term; a
    /// pre-existing row is left untouched.
    pub fn insert_term_if_absent(&self, term: &str, entry: TermEntry) -> Result<(), StorageError> {
        let row = bincode::serialize(&entry)?;
        let _ = self
            .terms
            .compare_and_swap(term.as_bytes(), None::<&[u8]>, Some(row))?;
        Ok(())
    }

    pub fn term(&self, term: &str) -> Result<Option<TermEntry>, StorageError> {
        match self.terms.get(term.as_bytes())? {
            Some(row) => Ok(Some(bincode::deserialize(&row)?)),
            None => Ok(None),
        }
    }

    pub fn remove_term(&self, term: &str) -> Result<(), StorageError> {
        self.terms.remove(term.as_bytes())?;
        Ok(())
    }

    pub fn terms(&self) -> Result<Vec<(String, TermEntry)>, StorageError> {
        let mut out = Vec::new();
        for entry in self.terms.iter() {
            let (key, row) = entry?;
            let term = std::str::from_utf8(&key)
                .map_err(|e| StorageError::Codec(e.to_string()))?
                .to_string();
            out.push((term, bincode::deserialize(&row)?));
        }
        Ok(out)
    }

    // --- documents ---

    /// Insert a document row. Rejects a duplicate id and a category name that
    /// does not resolve to an existing category.
    pub fn insert_document(&self, doc: &Document) -> Result<(), StorageError> {
        if self.categories.get(doc.category.as_bytes())?.is_none() {
            return Err(StorageError::Constraint(format!(
                "document {} references unknown category \"{}\"",
                doc.id, doc.category
            )));
        }
        let row = bincode::serialize(doc)?;
        self.documents
            .compare_and_swap(doc.id.to_be_bytes(), None::<&[u8]>, Some(row))?
            .map_err(|_| StorageError::Constraint(format!("document {} already exists", doc.id)))?;
        Ok(())
    }

    pub fn document(&self, id: DocId) -> Result<Option<Document>, StorageError> {
        match self.documents.get(id.to_be_bytes())? {
            Some(row) => Ok(Some(bincode::deserialize(&row)?)),
            None => Ok(None),
        }
    }

    /// Remove a document row; removing an absent id is a no-op. Reports
    /// whether a row was actually removed.
    pub fn remove_document(&self, id: DocId) -> Result<bool, StorageError> {
        Ok(self.documents.remove(id.to_be_bytes())?.is_some())
    }

    // --- postings ---

    /// Insert a posting at `by`, or add `by` to the existing count. Returns
    /// the stored count after the write. Rejects postings whose document or
    /// term row is missing.
    pub fn increment_posting(
        &self,
        doc_id: DocId,
        term: &str,
        by: u64,
    ) -> Result<u64, StorageError> {
        if self.documents.get(doc_id.to_be_bytes())?.is_none() {
            return Err(StorageError::Constraint(format!(
                "posting references missing document {doc_id}"
            )));
        }
        if self.terms.get(term.as_bytes())?.is_none() {
            return Err(StorageError::Constraint(format!(
                "posting references missing term \"{term}\""
            )));
        }
        let merged = self
            .postings
            .update_and_fetch(posting_key(doc_id, term), |old| {
                let current = old.map(decode_count).unwrap_or(0);
                Some((current + by).to_be_bytes().to_vec())
            })?;
        Ok(merged.as_deref().map(decode_count).unwrap_or(by))
    }

    pub fn postings_for_document(&self, doc_id: DocId) -> Result<Vec<Posting>, StorageError> {
        let mut out = Vec::new();
        for entry in self.postings.scan_prefix(doc_id.to_be_bytes()) {
            let (key, value) = entry?;
            out.push(decode_posting(&key, &value)?);
        }
        Ok(out)
    }

    pub fn remove_posting(&self, doc_id: DocId, term: &str) -> Result<(), StorageError> {
        self.postings.remove(posting_key(doc_id, term))?;
        Ok(())
    }

    /// Whether any document still holds a posting for this term.
    pub fn term_has_postings(&self, term: &str) -> Result<bool, StorageError> {
        for entry in self.postings.iter() {
            let (key, _) = entry?;
            if key.len() > 8 && &key[8..] == term.as_bytes() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// All postings, in ascending (document id, term) key order.
    pub fn postings(&self) -> Result<Vec<Posting>, StorageError> {
        let mut out = Vec::new();
        for entry in self.postings.iter() {
            let (key, value) = entry?;
            out.push(decode_posting(&key, &value)?);
        }
        Ok(out)
    }
}

fn posting_key(doc_id: DocId, term: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(8 + term.len());
    key.extend_from_slice(&doc_id.to_be_bytes());
    key.extend_from_slice(term.as_bytes());
    key
}

fn decode_posting(key: &[u8], value: &[u8]) -> Result<Posting, StorageError> {
    if key.len() < 8 {
        return Err(StorageError::Codec(
            "posting key shorter than a document id".into(),
        ));
    }
    let mut id_bytes = [0u8; 8];
    id_bytes.copy_from_slice(&key[..8]);
    let term = std::str::from_utf8(&key[8..])
        .map_err(|e| StorageError::Codec(e.to_string()))?
        .to_string();
    Ok(Posting {
        doc_id: u64::from_be_bytes(id_bytes),
        term,
        count: decode_count(value),
    })
}

fn decode_count(value: &[u8]) -> u64 {
    value.try_into().map(u64::from_be_bytes).unwrap_or(0)
}
