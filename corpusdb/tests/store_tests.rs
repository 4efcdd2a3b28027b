use corpusdb::{Document, Store, StorageError, TermEntry};
use tempfile::{tempdir, TempDir};
use time::macros::date;

fn open_store() -> (TempDir, Store) {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    (dir, store)
}

fn sample_document(id: u64, category: &str) -> Document {
    Document {
        id,
        text: "some text".into(),
        title: format!("Doc {id}"),
        num_chars: 8,
        date: date!(2024 - 01 - 15),
        category: category.into(),
    }
}

#[test]
fn category_constraints() {
    let (_dir, store) = open_store();
    store.create_category(1, "news").unwrap();

    let dup_name = store.create_category(2, "news").unwrap_err();
    assert!(matches!(dup_name, StorageError::Constraint(_)));

    let dup_id = store.create_category(1, "sports").unwrap_err();
    assert!(matches!(dup_id, StorageError::Constraint(_)));

    let empty = store.create_category(3, "").unwrap_err();
    assert!(matches!(empty, StorageError::Constraint(_)));

    assert_eq!(store.categories().unwrap().len(), 1);
}

#[test]
fn document_insert_enforces_unique_id_and_category_reference() {
    let (_dir, store) = open_store();
    store.create_category(1, "news").unwrap();

    let unknown = store.insert_document(&sample_document(1, "nope")).unwrap_err();
    assert!(matches!(unknown, StorageError::Constraint(_)));

    store.insert_document(&sample_document(1, "news")).unwrap();
    let duplicate = store.insert_document(&sample_document(1, "news")).unwrap_err();
    assert!(matches!(duplicate, StorageError::Constraint(_)));
}

#[test]
fn removing_an_absent_document_is_a_no_op() {
    let (_dir, store) = open_store();
    assert!(!store.remove_document(42).unwrap());
}

#[test]
fn posting_increment_enforces_references_and_accumulates() {
    let (_dir, store) = open_store();
    store.create_category(1, "news").unwrap();

    let no_doc = store.increment_posting(1, "alpha", 1).unwrap_err();
    assert!(matches!(no_doc, StorageError::Constraint(_)));

    store.insert_document(&sample_document(1, "news")).unwrap();
    let no_term = store.increment_posting(1, "alpha", 1).unwrap_err();
    assert!(matches!(no_term, StorageError::Constraint(_)));

    store
        .insert_term_if_absent("alpha", TermEntry { num_chars: 5 })
        .unwrap();
    assert_eq!(store.increment_posting(1, "alpha", 2).unwrap(), 2);
    assert_eq!(store.increment_posting(1, "alpha", 3).unwrap(), 5);

    let postings = store.postings_for_document(1).unwrap();
    assert_eq!(postings.len(), 1);
    assert_eq!(postings[0].term, "alpha");
    assert_eq!(postings[0].count, 5);
}

#[test]
fn insert_term_if_absent_keeps_the_first_row() {
    let (_dir, store) = open_store();
    store
        .insert_term_if_absent("alpha", TermEntry { num_chars: 5 })
        .unwrap();
    store
        .insert_term_if_absent("alpha", TermEntry { num_chars: 99 })
        .unwrap();
    assert_eq!(store.term("alpha").unwrap().unwrap().num_chars, 5);
}

#[test]
fn store_contents_survive_reopen() {
    let dir = tempdir().unwrap();
    {
        let store = Store::open(dir.path()).unwrap();
        store.create_category(1, "news").unwrap();
        store.insert_document(&sample_document(1, "news")).unwrap();
        store.flush().unwrap();
    }
    let store = Store::open(dir.path()).unwrap();
    assert!(store.document(1).unwrap().is_some());
    assert_eq!(store.categories().unwrap().len(), 1);
}
