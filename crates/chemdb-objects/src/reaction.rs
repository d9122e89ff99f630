//! Reactions: directed links between two sets of aggregates, the
//! left-hand and right-hand side, realized by a set of elementary
//! steps.

use serde_json::Value;
use tracing::debug;

use chemdb_store::{field, CollectionHandle, Document};
use chemdb_types::{DbResult, Id};

use crate::fields::FieldValue;
use crate::object::{DbObject, Link};
use crate::refs;

/// One side of a reaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Lhs,
    Rhs,
}

impl Side {
    /// The stored field name for this side.
    pub fn field_name(self) -> &'static str {
        match self {
            Side::Lhs => "lhs",
            Side::Rhs => "rhs",
        }
    }

    /// The opposite side.
    pub fn other(self) -> Side {
        match self {
            Side::Lhs => Side::Rhs,
            Side::Rhs => Side::Lhs,
        }
    }
}

/// Handle to a stored reaction record.
#[derive(Clone, Debug, Default)]
pub struct Reaction {
    link: Link,
}

impl DbObject for Reaction {
    const OBJECT_TYPE: &'static str = "reaction";

    fn link_ref(&self) -> &Link {
        &self.link
    }

    fn link_mut(&mut self) -> &mut Link {
        &mut self.link
    }
}

fn build_document(lhs: &[Id], rhs: &[Id]) -> Document {
    let mut document = Document::new();
    document.stamp_new();
    document.insert(field::OBJECT_TYPE, Value::String("reaction".into()));
    document.insert(Side::Lhs.field_name(), lhs.to_vec().to_value());
    document.insert(Side::Rhs.field_name(), rhs.to_vec().to_value());
    document.insert("elementary_steps", Value::Array(Vec::new()));
    document
}

impl Reaction {
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

    /// Insert a new reaction between the two aggregate sets.
    pub fn create(
        lhs: &[Id],
        rhs: &[Id],
        collection: &CollectionHandle,
    ) -> DbResult<Self> {
        let id = collection.insert(build_document(lhs, rhs))?;
        debug!(%id, lhs = lhs.len(), rhs = rhs.len(), "reaction created");
        Ok(Self::from_parts(id, CollectionHandle::clone(collection)))
    }

    /// Insert through the linked collection and bind the fresh id.
    pub fn create_linked(&mut self, lhs: &[Id], rhs: &[Id]) -> DbResult<Id> {
        let collection = self.collection()?;
        let id = collection.insert(build_document(lhs, rhs))?;
        debug!(%id, lhs = lhs.len(), rhs = rhs.len(), "reaction created");
        self.link_mut().set_id(id);
        Ok(id)
    }

    /// The aggregates on one side, in stored order.
    pub fn reactants(&self, side: Side) -> DbResult<Vec<Id>> {
        refs::get(self, side.field_name())
    }

    pub fn set_reactants(&self, side: Side, ids: &[Id]) -> DbResult<()> {
        refs::set(self, side.field_name(), ids)
    }

    pub fn add_reactant(&self, side: Side, id: Id) -> DbResult<()> {
        refs::add(self, side.field_name(), id)
    }

    pub fn remove_reactant(&self, side: Side, id: Id) -> DbResult<()> {
        refs::remove(self, side.field_name(), id)
    }

    pub fn has_reactant(&self, side: Side, id: Id) -> DbResult<bool> {
        refs::has(self, side.field_name(), id)
    }

    /// Which side (if any) the aggregate appears on. Checks lhs first.
    pub fn side_of(&self, id: Id) -> DbResult<Option<Side>> {
        if self.has_reactant(Side::Lhs, id)? {
            return Ok(Some(Side::Lhs));
        }
        if self.has_reactant(Side::Rhs, id)? {
            return Ok(Some(Side::Rhs));
        }
        Ok(None)
    }

    pub fn reactant_count(&self, side: Side) -> DbResult<usize> {
        refs::count(self, side.field_name())
    }

    pub fn clear_reactants(&self, side: Side) -> DbResult<()> {
        refs::clear(self, side.field_name())
    }

    // --- elementary steps ---

    pub fn elementary_steps(&self) -> DbResult<Vec<Id>> {
        refs::get(self, "elementary_steps")
    }

    pub fn set_elementary_steps(&self, ids: &[Id]) -> DbResult<()> {
        refs::set(self, "elementary_steps", ids)
    }

    pub fn add_elementary_step(&self, id: Id) -> DbResult<()> {
        refs::add(self, "elementary_steps", id)
    }

    pub fn remove_elementary_step(&self, id: Id) -> DbResult<()> {
        refs::remove(self, "elementary_steps", id)
    }

    pub fn has_elementary_step(&self, id: Id) -> DbResult<bool> {
        refs::has(self, "elementary_steps", id)
    }

    pub fn elementary_step_count(&self) -> DbResult<usize> {
        refs::count(self, "elementary_steps")
    }

    pub fn clear_elementary_steps(&self) -> DbResult<()> {
        refs::clear(self, "elementary_steps")
    }
}
