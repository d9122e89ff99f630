//! Calculations: scheduled units of work. A calculation carries the
//! level of theory to run with, a scheduling priority and a status that
//! walks the usual construction-to-analyzed ladder.

use serde_json::Value;
use tracing::debug;

use chemdb_store::{field, CollectionHandle, Document};
use chemdb_types::{CalculationStatus, DbError, DbResult, Id, Model};

use crate::fields::{self, FieldValue};
use crate::object::{DbObject, Link};

/// Handle to a stored calculation record.
#[derive(Clone, Debug, Default)]
pub struct Calculation {
    link: Link,
}

impl DbObject for Calculation {
    const OBJECT_TYPE: &'static str = "calculation";

    fn link_ref(&self) -> &Link {
        &self.link
    }

    fn link_mut(&mut self) -> &mut Link {
        &mut self.link
    }
}

fn build_document(model: &Model) -> Document {
    let mut document = Document::new();
    document.stamp_new();
    document.insert(field::OBJECT_TYPE, Value::String("calculation".into()));
    document.insert("model", model.to_value());
    document.insert(
        "status",
        Value::String(CalculationStatus::Construction.as_str().into()),
    );
    document.insert("priority", Value::from(10_i64));
    document.insert("comment", Value::String(String::new()));
    document
}

fn validate_priority(priority: i64) -> DbResult<()> {
    if !(1..=10).contains(&priority) {
        return Err(DbError::Field);
    }
    Ok(())
}

impl Calculation {
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

    /// Insert a new calculation in `Construction` status with the
    /// lowest priority (10).
    pub fn create(model: &Model, collection: &CollectionHandle) -> DbResult<Self> {
        let id = collection.insert(build_document(model))?;
        debug!(%id, "calculation created");
        Ok(Self::from_parts(id, CollectionHandle::clone(collection)))
    }

    /// Insert through the linked collection and bind the fresh id.
    pub fn create_linked(&mut self, model: &Model) -> DbResult<Id> {
        let collection = self.collection()?;
        let id = collection.insert(build_document(model))?;
        debug!(%id, "calculation created");
        self.link_mut().set_id(id);
        Ok(id)
    }

    /// The status, decoded through the string map.
    pub fn status(&self) -> DbResult<CalculationStatus> {
        fields::get(self, "status")
    }

    pub fn set_status(&self, status: CalculationStatus) -> DbResult<()> {
        fields::set(self, "status", &status)
    }

    pub fn model(&self) -> DbResult<Model> {
        fields::get(self, "model")
    }

    pub fn set_model(&self, model: &Model) -> DbResult<()> {
        fields::set(self, "model", model)
    }

    /// Scheduling priority: 1 (most urgent) through 10.
    pub fn priority(&self) -> DbResult<i64> {
        fields::get(self, "priority")
    }

    /// Fails with `Field` when `priority` is outside `1..=10`.
    pub fn set_priority(&self, priority: i64) -> DbResult<()> {
        validate_priority(priority)?;
        fields::set(self, "priority", &priority)
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use chemdb_store::InMemoryCollection;
    use std::sync::Arc;

    fn collection() -> CollectionHandle {
        Arc::new(InMemoryCollection::new("calculations"))
    }

    fn model() -> Model {
        Model::new("dft", "pbe", "def2-svp")
    }

    #[test]
    fn create_defaults() {
        let coll = collection();
        let calculation = Calculation::create(&model(), &coll).unwrap();

        assert_eq!(calculation.status().unwrap(), CalculationStatus::Construction);
        assert_eq!(calculation.priority().unwrap(), 10);
        assert_eq!(calculation.model().unwrap(), model());
        assert_eq!(calculation.comment().unwrap(), "");
    }

    #[test]
    fn status_walks_the_ladder() {
        let coll = collection();
        let calculation = Calculation::create(&model(), &coll).unwrap();

        for status in [
            CalculationStatus::New,
            CalculationStatus::Pending,
            CalculationStatus::Complete,
            CalculationStatus::Analyzed,
        ] {
            calculation.set_status(status).unwrap();
            assert_eq!(calculation.status().unwrap(), status);
        }

        let doc = calculation.raw_document().unwrap();
        assert_eq!(doc.get_str("status"), Some("analyzed"));
    }

    #[test]
    fn priority_range_is_enforced() {
        let coll = collection();
        let calculation = Calculation::create(&model(), &coll).unwrap();

        calculation.set_priority(1).unwrap();
        assert_eq!(calculation.priority().unwrap(), 1);

        assert_eq!(calculation.set_priority(0).unwrap_err(), DbError::Field);
        assert_eq!(calculation.set_priority(11).unwrap_err(), DbError::Field);
        assert_eq!(calculation.set_priority(-3).unwrap_err(), DbError::Field);
        // The stored value is untouched by rejected writes.
        assert_eq!(calculation.priority().unwrap(), 1);
    }

    #[test]
    fn rejected_priority_short_circuits_gating() {
        // Validation runs before storage access, so even an unlinked
        // handle reports the range error first.
        let calculation = Calculation::new();
        assert_eq!(calculation.set_priority(0).unwrap_err(), DbError::Field);
    }

    #[test]
    fn model_swap() {
        let coll = collection();
        let calculation = Calculation::create(&model(), &coll).unwrap();
        let refined = Model::with_spin_mode("dft", "pbe0", "def2-tzvp", "unrestricted");
        calculation.set_model(&refined).unwrap();
        assert_eq!(calculation.model().unwrap(), refined);
    }

    #[test]
    fn comment_family() {
        let coll = collection();
        let calculation = Calculation::create(&model(), &coll).unwrap();
        assert!(!calculation.has_comment().unwrap());
        calculation.set_comment("restart from previous wavefunction").unwrap();
        assert!(calculation.has_comment().unwrap());
        calculation.clear_comment().unwrap();
        assert!(!calculation.has_comment().unwrap());
    }

    #[test]
    fn create_linked_binds_id() {
        let coll = collection();
        let mut calculation = Calculation::from_collection(Arc::clone(&coll));
        let id = calculation.create_linked(&model()).unwrap();
        assert_eq!(calculation.id().unwrap(), id);
    }
}
