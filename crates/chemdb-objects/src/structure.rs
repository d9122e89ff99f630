//! Structures: individual molecular geometries with charge, spin
//! multiplicity, an exploration label and an optional aggregate
//! back-link.

use serde_json::Value;
use tracing::debug;

use chemdb_store::{field, CollectionHandle, Document};
use chemdb_types::{DbResult, Id, StructureLabel};

use crate::fields;
use crate::object::{DbObject, Link};

/// Handle to a stored structure record.
#[derive(Clone, Debug, Default)]
pub struct Structure {
    link: Link,
}

impl DbObject for Structure {
    const OBJECT_TYPE: &'static str = "structure";

    fn link_ref(&self) -> &Link {
        &self.link
    }

    fn link_mut(&mut self) -> &mut Link {
        &mut self.link
    }
}

fn build_document(charge: i64, multiplicity: i64, label: StructureLabel) -> Document {
    let mut document = Document::new();
    document.stamp_new();
    document.insert(field::OBJECT_TYPE, Value::String("structure".into()));
    document.insert("charge", Value::from(charge));
    document.insert("multiplicity", Value::from(multiplicity));
    document.insert("label", Value::String(label.as_str().into()));
    document.insert("comment", Value::String(String::new()));
    document
}

impl Structure {
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

    /// Insert a new structure record.
    pub fn create(
        charge: i64,
        multiplicity: i64,
        label: StructureLabel,
        collection: &CollectionHandle,
    ) -> DbResult<Self> {
        let id = collection.insert(build_document(charge, multiplicity, label))?;
        debug!(%id, charge, multiplicity, "structure created");
        Ok(Self::from_parts(id, CollectionHandle::clone(collection)))
    }

    /// Insert through the linked collection and bind the fresh id.
    pub fn create_linked(
        &mut self,
        charge: i64,
        multiplicity: i64,
        label: StructureLabel,
    ) -> DbResult<Id> {
        let collection = self.collection()?;
        let id = collection.insert(build_document(charge, multiplicity, label))?;
        debug!(%id, charge, multiplicity, "structure created");
        self.link_mut().set_id(id);
        Ok(id)
    }

    pub fn charge(&self) -> DbResult<i64> {
        fields::get(self, "charge")
    }

    pub fn set_charge(&self, charge: i64) -> DbResult<()> {
        fields::set(self, "charge", &charge)
    }

    pub fn multiplicity(&self) -> DbResult<i64> {
        fields::get(self, "multiplicity")
    }

    pub fn set_multiplicity(&self, multiplicity: i64) -> DbResult<()> {
        fields::set(self, "multiplicity", &multiplicity)
    }

    /// The exploration label, decoded through the string map.
    pub fn label(&self) -> DbResult<StructureLabel> {
        fields::get(self, "label")
    }

    pub fn set_label(&self, label: StructureLabel) -> DbResult<()> {
        fields::set(self, "label", &label)
    }

    pub fn comment(&self) -> DbResult<String> {
        fields::get(self, "comment")
    }

    pub fn set_comment(&self, comment: &str) -> DbResult<()> {
        fields::set(self, "comment", &comment.to_string())
    }

    pub fn has_comment(&self) -> DbResult<bool> {
        fields::non_null(self, "comment")
    }

    pub fn clear_comment(&self) -> DbResult<()> {
        self.set_comment("")
    }

    // --- aggregate back-link ---

    /// The owning aggregate. Fails with `MissingIdOrField` when the
    /// structure has not been assigned to one.
    pub fn compound(&self) -> DbResult<Id> {
        fields::get(self, "compound")
    }

    pub fn has_compound(&self) -> DbResult<bool> {
        fields::exists(self, "compound")
    }

    pub fn set_compound(&self, id: Id) -> DbResult<()> {
        fields::set(self, "compound", &id)
    }

    pub fn clear_compound(&self) -> DbResult<()> {
        fields::unset(self, "compound")
    }
}
