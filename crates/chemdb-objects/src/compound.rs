//! Compounds: aggregates of structures that share a molecular graph,
//! plus the reactions they participate in.

use serde_json::Value;
use tracing::debug;

use chemdb_store::{field, CollectionHandle, Document};
use chemdb_types::{DbResult, Id};

use crate::fields::FieldValue;
use crate::object::{DbObject, Link};
use crate::refs;

/// Handle to a stored compound record.
#[derive(Clone, Debug, Default)]
pub struct Compound {
    link: Link,
}

impl DbObject for Compound {
    const OBJECT_TYPE: &'static str = "compound";

    fn link_ref(&self) -> &Link {
        &self.link
    }

    fn link_mut(&mut self) -> &mut Link {
        &mut self.link
    }
}

fn build_document(structures: &[Id]) -> Document {
    let mut document = Document::new();
    document.stamp_new();
    document.insert(field::OBJECT_TYPE, Value::String("compound".into()));
    document.insert("structures", structures.to_vec().to_value());
    document.insert("reactions", Value::Array(Vec::new()));
    document
}

impl Compound {
    pub fn new() -> Self {
        Self { link: Link::new() }
    }

    pub fn from_id(id: Id) -> Self {
        Self {
            link: Link::from_id(id),
        }
    }

    pub fn from_collection(collection: CollectionHandle) -> Self {
        Self {
            link: Link::from_collection(collection),
        }
    }

    pub fn from_parts(id: Id, collection: CollectionHandle) -> Self {
        Self {
            link: Link::full(id, collection),
        }
    }

    /// Insert a new compound over the given structures. The first
    /// structure is the centroid; the reaction list starts empty.
    pub fn create(structures: &[Id], collection: &CollectionHandle) -> DbResult<Self> {
        let id = collection.insert(build_document(structures))?;
        debug!(%id, structures = structures.len(), "compound created");
        Ok(Self::from_parts(id, CollectionHandle::clone(collection)))
    }

    /// Insert through the linked collection and bind the fresh id.
    pub fn create_linked(&mut self, structures: &[Id]) -> DbResult<Id> {
        let collection = self.collection()?;
        let id = collection.insert(build_document(structures))?;
        debug!(%id, structures = structures.len(), "compound created");
        self.link_mut().set_id(id);
        Ok(id)
    }

    // --- structures ---

    /// The first structure in the list.
    pub fn centroid(&self) -> DbResult<Id> {
        refs::first(self, "structures")
    }

    pub fn structures(&self) -> DbResult<Vec<Id>> {
        refs::get(self, "structures")
    }

    pub fn set_structures(&self, ids: &[Id]) -> DbResult<()> {
        refs::set(self, "structures", ids)
    }

    pub fn add_structure(&self, id: Id) -> DbResult<()> {
        refs::add(self, "structures", id)
    }

    pub fn remove_structure(&self, id: Id) -> DbResult<()> {
        refs::remove(self, "structures", id)
    }

    pub fn has_structure(&self, id: Id) -> DbResult<bool> {
        refs::has(self, "structures", id)
    }

    pub fn structure_count(&self) -> DbResult<usize> {
        refs::count(self, "structures")
    }

    pub fn clear_structures(&self) -> DbResult<()> {
        refs::clear(self, "structures")
    }

    // --- reactions ---

    pub fn reactions(&self) -> DbResult<Vec<Id>> {
        refs::get(self, "reactions")
    }

    pub fn set_reactions(&self, ids: &[Id]) -> DbResult<()> {
        refs::set(self, "reactions", ids)
    }

    pub fn add_reaction(&self, id: Id) -> DbResult<()> {
        refs::add(self, "reactions", id)
    }

    pub fn remove_reaction(&self, id: Id) -> DbResult<()> {
        refs::remove(self, "reactions", id)
    }

    pub fn has_reaction(&self, id: Id) -> DbResult<bool> {
        refs::has(self, "reactions", id)
    }

    pub fn reaction_count(&self) -> DbResult<usize> {
        refs::count(self, "reactions")
    }

    pub fn clear_reactions(&self) -> DbResult<()> {
        refs::clear(self, "reactions")
    }
}
