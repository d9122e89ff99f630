//! In-memory collection backend for tests and embedding.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;
use tracing::trace;

use chemdb_types::{DbError, DbResult, Id};

use crate::document::{field, now_ms, Document};
use crate::traits::Collection;

/// A `HashMap`-backed implementation of [`Collection`].
///
/// The reference backend: it implements the full trait contract and is
/// what the object layer is tested against. All documents live behind a
/// `RwLock` and are cloned on read, so handles can be shared freely
/// across threads. Consistency is per-operation only — read-modify-write
/// sequences across calls race exactly as they would against a remote
/// store.
pub struct InMemoryCollection {
    name: String,
    documents: RwLock<HashMap<Id, Document>>,
}

impl InMemoryCollection {
    /// Create a new empty collection.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: RwLock::new(HashMap::new()),
        }
    }

    /// The collection's name within its database.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Remove all documents.
    pub fn clear(&self) {
        self.documents.write().expect("lock poisoned").clear();
    }

    /// All identifiers currently stored, sorted.
    pub fn all_ids(&self) -> Vec<Id> {
        let map = self.documents.read().expect("lock poisoned");
        let mut ids: Vec<Id> = map.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl Collection for InMemoryCollection {
    fn insert(&self, mut document: Document) -> DbResult<Id> {
        let mut map = self.documents.write().expect("lock poisoned");
        let id = match document.id() {
            Some(id) => {
                if map.contains_key(&id) {
                    return Err(DbError::DuplicateId);
                }
                id
            }
            None => {
                let id = Id::new();
                document.set_id(id);
                id
            }
        };
        trace!(collection = %self.name, %id, "insert");
        map.insert(id, document);
        Ok(id)
    }

    fn find_by_id(&self, id: &Id) -> DbResult<Option<Document>> {
        let map = self.documents.read().expect("lock poisoned");
        Ok(map.get(id).cloned())
    }

    fn update_fields(&self, id: &Id, fields: &[(String, Value)]) -> DbResult<bool> {
        let mut map = self.documents.write().expect("lock poisoned");
        let Some(document) = map.get_mut(id) else {
            return Ok(false);
        };
        for (name, value) in fields {
            document.insert(name.clone(), value.clone());
        }
        document.insert(field::LAST_MODIFIED, Value::from(now_ms()));
        trace!(collection = %self.name, %id, fields = fields.len(), "update");
        Ok(true)
    }

    fn unset_field(&self, id: &Id, name: &str) -> DbResult<bool> {
        let mut map = self.documents.write().expect("lock poisoned");
        let Some(document) = map.get_mut(id) else {
            return Ok(false);
        };
        document.remove(name);
        document.insert(field::LAST_MODIFIED, Value::from(now_ms()));
        Ok(true)
    }

    fn delete(&self, id: &Id) -> DbResult<bool> {
        let mut map = self.documents.write().expect("lock poisoned");
        Ok(map.remove(id).is_some())
    }

    fn has(&self, id: &Id) -> DbResult<bool> {
        let map = self.documents.read().expect("lock poisoned");
        Ok(map.contains_key(id))
    }

    fn count(&self) -> DbResult<usize> {
        let map = self.documents.read().expect("lock poisoned");
        Ok(map.len())
    }
}

impl std::fmt::Debug for InMemoryCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.documents.read().expect("lock poisoned").len();
        f.debug_struct("InMemoryCollection")
            .field("name", &self.name)
            .field("document_count", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_doc() -> Document {
        let mut doc = Document::new();
        doc.stamp_new();
        doc.insert("kind", json!("test"));
        doc
    }

    // -----------------------------------------------------------------------
    // Insert / find
    // -----------------------------------------------------------------------

    #[test]
    fn insert_assigns_fresh_id() {
        let coll = InMemoryCollection::new("test");
        let id = coll.insert(make_doc()).unwrap();
        let found = coll.find_by_id(&id).unwrap().expect("should exist");
        assert_eq!(found.id(), Some(id));
        assert_eq!(found.get_str("kind"), Some("test"));
    }

    #[test]
    fn insert_keeps_supplied_id() {
        let coll = InMemoryCollection::new("test");
        let id = Id::new();
        let mut doc = make_doc();
        doc.set_id(id);
        assert_eq!(coll.insert(doc).unwrap(), id);
    }

    #[test]
    fn insert_duplicate_id_fails() {
        let coll = InMemoryCollection::new("test");
        let id = Id::new();
        let mut doc = make_doc();
        doc.set_id(id);
        coll.insert(doc.clone()).unwrap();
        assert_eq!(coll.insert(doc), Err(DbError::DuplicateId));
    }

    #[test]
    fn every_insert_is_a_new_record() {
        let coll = InMemoryCollection::new("test");
        let a = coll.insert(make_doc()).unwrap();
        let b = coll.insert(make_doc()).unwrap();
        assert_ne!(a, b);
        assert_eq!(coll.count().unwrap(), 2);
    }

    #[test]
    fn find_missing_returns_none() {
        let coll = InMemoryCollection::new("test");
        assert!(coll.find_by_id(&Id::new()).unwrap().is_none());
    }

    // -----------------------------------------------------------------------
    // Update / unset
    // -----------------------------------------------------------------------

    #[test]
    fn update_fields_sets_and_touches() {
        let coll = InMemoryCollection::new("test");
        let id = coll.insert(make_doc()).unwrap();
        let before = coll.find_by_id(&id).unwrap().unwrap();

        let updated = coll
            .update_fields(&id, &[("comment".to_string(), json!("hello"))])
            .unwrap();
        assert!(updated);

        let after = coll.find_by_id(&id).unwrap().unwrap();
        assert_eq!(after.get_str("comment"), Some("hello"));
        assert!(after.last_modified() >= before.last_modified());
        // untouched fields survive
        assert_eq!(after.get_str("kind"), Some("test"));
    }

    #[test]
    fn update_missing_returns_false() {
        let coll = InMemoryCollection::new("test");
        let updated = coll
            .update_field(&Id::new(), "comment", json!("x"))
            .unwrap();
        assert!(!updated);
    }

    #[test]
    fn unset_removes_field() {
        let coll = InMemoryCollection::new("test");
        let id = coll.insert(make_doc()).unwrap();
        coll.update_field(&id, "structure", json!(Id::new().to_hex()))
            .unwrap();
        assert!(coll.unset_field(&id, "structure").unwrap());

        let doc = coll.find_by_id(&id).unwrap().unwrap();
        assert!(!doc.contains("structure"));
    }

    #[test]
    fn updates_are_last_writer_wins() {
        let coll = InMemoryCollection::new("test");
        let id = coll.insert(make_doc()).unwrap();
        coll.update_field(&id, "data", json!(1.0)).unwrap();
        coll.update_field(&id, "data", json!(2.0)).unwrap();
        let doc = coll.find_by_id(&id).unwrap().unwrap();
        assert_eq!(doc.get_f64("data"), Some(2.0));
    }

    // -----------------------------------------------------------------------
    // Delete / has / count
    // -----------------------------------------------------------------------

    #[test]
    fn delete_and_has() {
        let coll = InMemoryCollection::new("test");
        let id = coll.insert(make_doc()).unwrap();
        assert!(coll.has(&id).unwrap());
        assert!(coll.delete(&id).unwrap());
        assert!(!coll.has(&id).unwrap());
        assert!(!coll.delete(&id).unwrap());
    }

    #[test]
    fn all_ids_is_sorted() {
        let coll = InMemoryCollection::new("test");
        for _ in 0..5 {
            coll.insert(make_doc()).unwrap();
        }
        let ids = coll.all_ids();
        assert_eq!(ids.len(), 5);
        for w in ids.windows(2) {
            assert!(w[0] <= w[1]);
        }
    }

    #[test]
    fn concurrent_reads_are_safe() {
        use std::sync::Arc;
        use std::thread;

        let coll = Arc::new(InMemoryCollection::new("test"));
        let id = coll.insert(make_doc()).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let coll = Arc::clone(&coll);
                thread::spawn(move || {
                    let doc = coll.find_by_id(&id).unwrap();
                    assert!(doc.is_some());
                })
            })
            .collect();
        for h in handles {
            h.join().expect("thread should not panic");
        }
    }
}
