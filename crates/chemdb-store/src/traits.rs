use std::sync::Arc;

use serde_json::Value;

use chemdb_types::{DbResult, Id};

use crate::document::Document;

/// One remote document collection, addressed by identifier.
///
/// This is the capability every linked object operates through. All
/// implementations must satisfy the same contract:
///
/// - `insert` assigns a fresh [`Id`] unless the document already carries
///   one; a carried identifier that exists in the collection fails with
///   `DuplicateId`.
/// - Reads of absent documents return `Ok(None)`, never an error — the
///   caller decides whether absence is a failure.
/// - Every successful field update or unset also touches `_lastmodified`.
/// - Updates are last-writer-wins. There is no concurrency token; two
///   writers racing on the same identifier converge to whichever write
///   lands last.
/// - No operation retries or substitutes defaults; every backend failure
///   is propagated.
pub trait Collection: Send + Sync {
    /// Insert a document, returning its identifier.
    ///
    /// This is a plain insert, not an upsert: each call stores a new
    /// record unless a caller-supplied `_id` collides.
    fn insert(&self, document: Document) -> DbResult<Id>;

    /// Fetch a document by identifier. `Ok(None)` if absent.
    fn find_by_id(&self, id: &Id) -> DbResult<Option<Document>>;

    /// Set the named fields on an existing document and touch
    /// `_lastmodified`. Returns `false` if no document has the identifier.
    fn update_fields(&self, id: &Id, fields: &[(String, Value)]) -> DbResult<bool>;

    /// Remove a field from an existing document and touch `_lastmodified`.
    /// Returns `false` if no document has the identifier.
    fn unset_field(&self, id: &Id, field: &str) -> DbResult<bool>;

    /// Delete a document. Returns `true` if it existed.
    fn delete(&self, id: &Id) -> DbResult<bool>;

    /// Whether a document with the identifier exists.
    fn has(&self, id: &Id) -> DbResult<bool>;

    /// Number of documents in the collection.
    fn count(&self) -> DbResult<usize>;

    /// Set a single field. Convenience over [`Collection::update_fields`].
    fn update_field(&self, id: &Id, field: &str, value: Value) -> DbResult<bool> {
        self.update_fields(id, &[(field.to_string(), value)])
    }
}

/// Shared, non-owning handle to a collection.
///
/// Cloning the handle shares the underlying capability; the handle never
/// owns the remote namespace's lifetime.
pub type CollectionHandle = Arc<dyn Collection>;
