//! Elementary steps: paths connecting two sets of structures (not
//! aggregates). A step starts out `Regular`, may point at a distinct
//! transition-state structure, and carries a back-link to the reaction
//! it belongs to.

use serde_json::Value;
use tracing::debug;

use chemdb_store::{field, CollectionHandle, Document};
use chemdb_types::{DbResult, ElementaryStepType, Id};

use crate::fields::{self, FieldValue};
use crate::object::{DbObject, Link};
use crate::reaction::Side;
use crate::refs;

/// Handle to a stored elementary-step record.
#[derive(Clone, Debug, Default)]
pub struct ElementaryStep {
    link: Link,
}

impl DbObject for ElementaryStep {
    const OBJECT_TYPE: &'static str = "elementary_step";

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
    document.insert(field::OBJECT_TYPE, Value::String("elementary_step".into()));
    document.insert(
        "type",
        Value::String(ElementaryStepType::Regular.as_str().into()),
    );
    document.insert(Side::Lhs.field_name(), lhs.to_vec().to_value());
    document.insert(Side::Rhs.field_name(), rhs.to_vec().to_value());
    document
}

impl ElementaryStep {
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

    /// Insert a new step between the two structure sets. The step type
    /// starts as `Regular`.
    pub fn create(
        lhs: &[Id],
        rhs: &[Id],
        collection: &CollectionHandle,
    ) -> DbResult<Self> {
        let id = collection.insert(build_document(lhs, rhs))?;
        debug!(%id, lhs = lhs.len(), rhs = rhs.len(), "elementary step created");
        Ok(Self::from_parts(id, CollectionHandle::clone(collection)))
    }

    /// Insert through the linked collection and bind the fresh id.
    pub fn create_linked(&mut self, lhs: &[Id], rhs: &[Id]) -> DbResult<Id> {
        let collection = self.collection()?;
        let id = collection.insert(build_document(lhs, rhs))?;
        debug!(%id, lhs = lhs.len(), rhs = rhs.len(), "elementary step created");
        self.link_mut().set_id(id);
        Ok(id)
    }

    /// The step type, decoded through the string map.
    pub fn step_type(&self) -> DbResult<ElementaryStepType> {
        fields::get(self, "type")
    }

    pub fn set_step_type(&self, step_type: ElementaryStepType) -> DbResult<()> {
        fields::set(self, "type", &step_type)
    }

    // --- reactants (structures, per side) ---

    /// The structures on one side, in stored order.
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

    pub fn reactant_count(&self, side: Side) -> DbResult<usize> {
        refs::count(self, side.field_name())
    }

    pub fn clear_reactants(&self, side: Side) -> DbResult<()> {
        refs::clear(self, side.field_name())
    }

    // --- reaction back-link ---

    /// The owning reaction. Fails with `MissingIdOrField` when the step
    /// has not been assigned to one.
    pub fn reaction(&self) -> DbResult<Id> {
        fields::get(self, "reaction")
    }

    pub fn has_reaction(&self) -> DbResult<bool> {
        fields::exists(self, "reaction")
    }

    pub fn set_reaction(&self, id: Id) -> DbResult<()> {
        fields::set(self, "reaction", &id)
    }

    pub fn clear_reaction(&self) -> DbResult<()> {
        fields::unset(self, "reaction")
    }

    // --- transition state ---

    /// The distinct transition-state structure. Fails with
    /// `MissingIdOrField` when none is linked (barrierless steps have
    /// none).
    pub fn transition_state(&self) -> DbResult<Id> {
        fields::get(self, "transition_state")
    }

    pub fn has_transition_state(&self) -> DbResult<bool> {
        fields::exists(self, "transition_state")
    }

    pub fn set_transition_state(&self, id: Id) -> DbResult<()> {
        fields::set(self, "transition_state", &id)
    }

    pub fn clear_transition_state(&self) -> DbResult<()> {
        fields::unset(self, "transition_state")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chemdb_store::InMemoryCollection;
    use chemdb_types::DbError;
    use std::sync::Arc;

    fn collection() -> CollectionHandle {
        Arc::new(InMemoryCollection::new("elementary_steps"))
    }

    #[test]
    fn create_defaults_to_regular() {
        let coll = collection();
        let (a, b) = (Id::new(), Id::new());
        let step = ElementaryStep::create(&[a], &[b], &coll).unwrap();

        assert_eq!(step.step_type().unwrap(), ElementaryStepType::Regular);
        assert_eq!(step.reactants(Side::Lhs).unwrap(), vec![a]);
        assert_eq!(step.reactants(Side::Rhs).unwrap(), vec![b]);
        assert!(!step.has_reaction().unwrap());
        assert!(!step.has_transition_state().unwrap());

        let doc = step.raw_document().unwrap();
        assert_eq!(doc.object_type(), Some("elementary_step"));
        assert_eq!(doc.get_str("type"), Some("regular"));
    }

    #[test]
    fn step_type_uses_string_map() {
        let coll = collection();
        let step = ElementaryStep::create(&[], &[], &coll).unwrap();
        step.set_step_type(ElementaryStepType::Barrierless).unwrap();
        assert_eq!(step.step_type().unwrap(), ElementaryStepType::Barrierless);

        let doc = step.raw_document().unwrap();
        assert_eq!(doc.get_str("type"), Some("barrierless"));
    }

    #[test]
    fn reactant_membership_per_side() {
        let coll = collection();
        let step = ElementaryStep::create(&[], &[], &coll).unwrap();
        let s = Id::new();

        step.add_reactant(Side::Lhs, s).unwrap();
        assert!(step.has_reactant(Side::Lhs, s).unwrap());
        assert!(!step.has_reactant(Side::Rhs, s).unwrap());
        assert_eq!(step.reactant_count(Side::Lhs).unwrap(), 1);

        step.remove_reactant(Side::Lhs, s).unwrap();
        assert_eq!(step.reactant_count(Side::Lhs).unwrap(), 0);
    }

    #[test]
    fn reaction_back_link_lifecycle() {
        let coll = collection();
        let step = ElementaryStep::create(&[], &[], &coll).unwrap();
        assert_eq!(step.reaction().unwrap_err(), DbError::MissingIdOrField);

        let reaction = Id::new();
        step.set_reaction(reaction).unwrap();
        assert!(step.has_reaction().unwrap());
        assert_eq!(step.reaction().unwrap(), reaction);

        step.clear_reaction().unwrap();
        assert!(!step.has_reaction().unwrap());
    }

    #[test]
    fn transition_state_lifecycle() {
        let coll = collection();
        let step = ElementaryStep::create(&[], &[], &coll).unwrap();
        assert_eq!(
            step.transition_state().unwrap_err(),
            DbError::MissingIdOrField
        );

        let ts = Id::new();
        step.set_transition_state(ts).unwrap();
        assert!(step.has_transition_state().unwrap());
        assert_eq!(step.transition_state().unwrap(), ts);

        step.clear_transition_state().unwrap();
        assert!(!step.has_transition_state().unwrap());
    }

    #[test]
    fn create_linked_binds_id() {
        let coll = collection();
        let mut step = ElementaryStep::from_collection(Arc::clone(&coll));
        let id = step.create_linked(&[Id::new()], &[Id::new()]).unwrap();
        assert_eq!(step.id().unwrap(), id);
    }

    #[test]
    fn gating_applies() {
        let step = ElementaryStep::new();
        assert_eq!(
            step.step_type().unwrap_err(),
            DbError::MissingLinkedCollection
        );
    }
}
