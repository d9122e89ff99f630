//! The linked-object lifecycle every record type inherits.
//!
//! A record handle moves through three usable states:
//!
//! 1. **Unlinked** — neither an identifier nor a collection is attached;
//!    every stored-field operation fails with `MissingLinkedCollection`.
//! 2. **Linked** — a collection is attached but no identifier; operations
//!    addressing a specific document fail with `MissingId`. The only way
//!    out is a `create`, which binds a fresh identifier.
//! 3. **Linked + identified** — both present; the handle is fully usable.
//!
//! There is no "deleted" state: a backing document removed by someone
//! else surfaces as `IdNotFound` on the next access, never as a local
//! state change.

use chrono::{DateTime, Utc};

use chemdb_store::{field, CollectionHandle, Document};
use chemdb_types::{DbError, DbResult, Id};

/// Linkage state of a record handle: an optional owned identifier plus a
/// shared, non-owning collection capability.
#[derive(Clone, Default)]
pub struct Link {
    id: Option<Id>,
    collection: Option<CollectionHandle>,
}

impl Link {
    /// An unlinked, unidentified link.
    pub fn new() -> Self {
        Self::default()
    }

    /// Identified but not yet linked to storage.
    pub fn from_id(id: Id) -> Self {
        Self {
            id: Some(id),
            collection: None,
        }
    }

    /// Linked to storage but not yet identified.
    pub fn from_collection(collection: CollectionHandle) -> Self {
        Self {
            id: None,
            collection: Some(collection),
        }
    }

    /// Fully usable: linked and identified.
    pub fn full(id: Id, collection: CollectionHandle) -> Self {
        Self {
            id: Some(id),
            collection: Some(collection),
        }
    }

    pub(crate) fn set_id(&mut self, id: Id) {
        self.id = Some(id);
    }

    pub(crate) fn clear_id(&mut self) {
        self.id = None;
    }

    pub(crate) fn attach(&mut self, collection: CollectionHandle) {
        self.collection = Some(collection);
    }

    pub(crate) fn detach(&mut self) {
        self.collection = None;
    }

    pub(crate) fn id(&self) -> Option<Id> {
        self.id
    }

    pub(crate) fn collection(&self) -> Option<&CollectionHandle> {
        self.collection.as_ref()
    }
}

impl std::fmt::Debug for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Link")
            .field("id", &self.id)
            .field("linked", &self.collection.is_some())
            .finish()
    }
}

/// Behavior shared by every stored record type.
///
/// Implementors supply the two link accessors and their type tag; the
/// trait provides the whole state-machine surface. The two-tier gate is
/// uniform everywhere: linkage is checked before identity, so an
/// unlinked handle always reports `MissingLinkedCollection` even when it
/// also has no identifier.
pub trait DbObject {
    /// The `_objecttype` tag this record type stores.
    const OBJECT_TYPE: &'static str;

    fn link_ref(&self) -> &Link;
    fn link_mut(&mut self) -> &mut Link;

    /// Attach a storage collection. Never clears an existing identifier.
    fn link(&mut self, collection: CollectionHandle) {
        self.link_mut().attach(collection);
    }

    /// Drop the storage reference. The identifier is kept.
    fn detach(&mut self) {
        self.link_mut().detach();
    }

    /// Whether a collection is attached.
    fn has_link(&self) -> bool {
        self.link_ref().collection().is_some()
    }

    /// The attached collection.
    fn collection(&self) -> DbResult<&CollectionHandle> {
        self.link_ref()
            .collection()
            .ok_or(DbError::MissingLinkedCollection)
    }

    /// Whether an identifier is set.
    fn has_id(&self) -> bool {
        self.link_ref().id().is_some()
    }

    /// The identifier.
    fn id(&self) -> DbResult<Id> {
        self.link_ref().id().ok_or(DbError::MissingId)
    }

    /// The two-tier gate: collection first, then identifier.
    fn require_linked_and_identified(&self) -> DbResult<(&CollectionHandle, Id)> {
        let collection = self.collection()?;
        let id = self.link_ref().id().ok_or(DbError::MissingId)?;
        Ok((collection, id))
    }

    /// Whether the backing document exists in the linked collection.
    fn exists(&self) -> DbResult<bool> {
        let (collection, id) = self.require_linked_and_identified()?;
        collection.has(&id)
    }

    /// Fetch the full backing document.
    fn raw_document(&self) -> DbResult<Document> {
        let (collection, id) = self.require_linked_and_identified()?;
        collection.find_by_id(&id)?.ok_or(DbError::IdNotFound)
    }

    /// The backing document as a JSON string.
    fn json(&self) -> DbResult<String> {
        Ok(self.raw_document()?.to_json())
    }

    /// Creation time of the backing document.
    fn created(&self) -> DbResult<DateTime<Utc>> {
        self.raw_document()?
            .created()
            .ok_or(DbError::MissingTimestamp)
    }

    /// Last modification time of the backing document.
    fn last_modified(&self) -> DbResult<DateTime<Utc>> {
        self.raw_document()?
            .last_modified()
            .ok_or(DbError::MissingTimestamp)
    }

    fn has_created_timestamp(&self) -> DbResult<bool> {
        Ok(self.raw_document()?.created().is_some())
    }

    fn has_last_modified_timestamp(&self) -> DbResult<bool> {
        Ok(self.raw_document()?.last_modified().is_some())
    }

    /// Whether this record predates `other`, by creation time or, with
    /// `modification`, by last modification time.
    fn older_than<O: DbObject>(&self, other: &O, modification: bool) -> DbResult<bool> {
        if modification {
            Ok(self.last_modified()? < other.last_modified()?)
        } else {
            Ok(self.created()? < other.created()?)
        }
    }

    /// Update `_lastmodified` to now without changing any other field.
    fn touch(&self) -> DbResult<()> {
        let (collection, id) = self.require_linked_and_identified()?;
        if !collection.update_fields(&id, &[])? {
            return Err(DbError::IdNotFound);
        }
        Ok(())
    }

    /// Whether analysis jobs should process this record.
    fn analyze(&self) -> DbResult<bool> {
        Ok(!crate::fields::get::<bool>(self, field::ANALYSIS_DISABLED)?)
    }

    /// Whether exploration jobs should process this record.
    fn explore(&self) -> DbResult<bool> {
        Ok(!crate::fields::get::<bool>(self, field::EXPLORATION_DISABLED)?)
    }

    fn set_analysis_enabled(&self, enabled: bool) -> DbResult<()> {
        crate::fields::set(self, field::ANALYSIS_DISABLED, &!enabled)
    }

    fn set_exploration_enabled(&self, enabled: bool) -> DbResult<()> {
        crate::fields::set(self, field::EXPLORATION_DISABLED, &!enabled)
    }

    /// Delete the backing document and clear the local identifier.
    ///
    /// With `expect_presence`, a missing document fails `IdNotFound`;
    /// otherwise deletion of an already-gone document is a no-op.
    fn wipe(&mut self, expect_presence: bool) -> DbResult<()> {
        let (collection, id) = self.require_linked_and_identified()?;
        let existed = collection.delete(&id)?;
        if expect_presence && !existed {
            return Err(DbError::IdNotFound);
        }
        self.link_mut().clear_id();
        Ok(())
    }
}
