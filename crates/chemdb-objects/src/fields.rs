//! Typed access to single stored fields, shared by every record type.
//!
//! Every helper runs the same two-tier gate (collection, then id) before
//! touching storage. [`get`] treats an absent field as `MissingIdOrField`;
//! [`partial_get`] reports absence as `None` so optional fields do not
//! need error handling at every call site.

use serde_json::Value;

use chemdb_store::Document;
use chemdb_types::{
    CalculationStatus, DbError, DbResult, ElementaryStepType, Id, Model,
    StructureLabel,
};

use crate::object::DbObject;

/// Encode/decode pair between a Rust value and its stored JSON form.
///
/// `from_value` returns `None` both for absent-shaped input and for a
/// stored value of the wrong type; the helpers translate that into the
/// taxonomy.
pub trait FieldValue: Sized {
    fn to_value(&self) -> Value;
    fn from_value(value: &Value) -> Option<Self>;
}

impl FieldValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FieldValue for f64 {
    fn to_value(&self) -> Value {
        Value::from(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FieldValue for i64 {
    fn to_value(&self) -> Value {
        Value::from(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl FieldValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FieldValue for Id {
    fn to_value(&self) -> Value {
        Value::String(self.to_hex())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().and_then(|s| Id::from_hex(s).ok())
    }
}

impl FieldValue for Vec<Id> {
    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(FieldValue::to_value).collect())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_array()?.iter().map(Id::from_value).collect()
    }
}

impl FieldValue for Model {
    fn to_value(&self) -> Value {
        // A model is a struct of strings; serialization cannot fail.
        serde_json::to_value(self).expect("model serialization is infallible")
    }

    fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

impl FieldValue for CalculationStatus {
    fn to_value(&self) -> Value {
        Value::String(self.as_str().to_string())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().and_then(CalculationStatus::from_str)
    }
}

impl FieldValue for StructureLabel {
    fn to_value(&self) -> Value {
        Value::String(self.as_str().to_string())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().and_then(StructureLabel::from_str)
    }
}

impl FieldValue for ElementaryStepType {
    fn to_value(&self) -> Value {
        Value::String(self.as_str().to_string())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().and_then(ElementaryStepType::from_str)
    }
}

/// Set a field on the backing document. Touches `_lastmodified`.
pub fn set<T: FieldValue>(
    obj: &(impl DbObject + ?Sized),
    field: &str,
    value: &T,
) -> DbResult<()> {
    let (collection, id) = obj.require_linked_and_identified()?;
    if !collection.update_field(&id, field, value.to_value())? {
        return Err(DbError::IdNotFound);
    }
    Ok(())
}

/// Fetch a field value, if the document and the field are present.
pub fn partial_get<T: FieldValue>(
    obj: &(impl DbObject + ?Sized),
    field: &str,
) -> DbResult<Option<T>> {
    let (collection, id) = obj.require_linked_and_identified()?;
    let Some(document) = collection.find_by_id(&id)? else {
        return Ok(None);
    };
    Ok(document.get(field).and_then(T::from_value))
}

/// Fetch a field value; absence of the document, the field, or a
/// decodable value is `MissingIdOrField`.
pub fn get<T: FieldValue>(obj: &(impl DbObject + ?Sized), field: &str) -> DbResult<T> {
    partial_get(obj, field)?.ok_or(DbError::MissingIdOrField)
}

/// Remove a field from the backing document. Touches `_lastmodified`.
pub fn unset(obj: &(impl DbObject + ?Sized), field: &str) -> DbResult<()> {
    let (collection, id) = obj.require_linked_and_identified()?;
    if !collection.unset_field(&id, field)? {
        return Err(DbError::IdNotFound);
    }
    Ok(())
}

/// Whether the field exists on the backing document (including `null`).
pub fn exists(obj: &(impl DbObject + ?Sized), field: &str) -> DbResult<bool> {
    Ok(fetch(obj)?.contains(field))
}

/// Whether the field exists and is neither `null` nor an empty string.
pub fn non_null(obj: &(impl DbObject + ?Sized), field: &str) -> DbResult<bool> {
    Ok(fetch(obj)?.non_null(field))
}

fn fetch(obj: &(impl DbObject + ?Sized)) -> DbResult<Document> {
    let (collection, id) = obj.require_linked_and_identified()?;
    collection.find_by_id(&id)?.ok_or(DbError::IdNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Link;
    use chemdb_store::{CollectionHandle, InMemoryCollection};
    use serde_json::json;
    use std::sync::Arc;

    struct TestRecord {
        link: Link,
    }

    impl DbObject for TestRecord {
        const OBJECT_TYPE: &'static str = "test_record";

        fn link_ref(&self) -> &Link {
            &self.link
        }

        fn link_mut(&mut self) -> &mut Link {
            &mut self.link
        }
    }

    fn stored() -> (CollectionHandle, TestRecord) {
        let coll: CollectionHandle = Arc::new(InMemoryCollection::new("test"));
        let mut doc = Document::new();
        doc.stamp_new();
        let id = coll.insert(doc).unwrap();
        let record = TestRecord {
            link: Link::full(id, Arc::clone(&coll)),
        };
        (coll, record)
    }

    #[test]
    fn set_then_get() {
        let (_coll, record) = stored();
        set(&record, "comment", &"density fit".to_string()).unwrap();
        assert_eq!(
            get::<String>(&record, "comment").unwrap(),
            "density fit"
        );
    }

    #[test]
    fn get_missing_field_fails() {
        let (_coll, record) = stored();
        assert_eq!(
            get::<String>(&record, "comment").unwrap_err(),
            DbError::MissingIdOrField
        );
        assert_eq!(partial_get::<String>(&record, "comment").unwrap(), None);
    }

    #[test]
    fn get_wrong_type_fails() {
        let (coll, record) = stored();
        coll.update_field(&record.id().unwrap(), "charge", json!("not a number"))
            .unwrap();
        assert_eq!(
            get::<i64>(&record, "charge").unwrap_err(),
            DbError::MissingIdOrField
        );
    }

    #[test]
    fn id_field_roundtrip() {
        let (_coll, record) = stored();
        let structure = Id::new();
        set(&record, "structure", &structure).unwrap();
        assert_eq!(get::<Id>(&record, "structure").unwrap(), structure);
    }

    #[test]
    fn id_vec_preserves_order() {
        let (_coll, record) = stored();
        let ids = vec![Id::new(), Id::new(), Id::new()];
        set(&record, "structures", &ids).unwrap();
        assert_eq!(get::<Vec<Id>>(&record, "structures").unwrap(), ids);
    }

    #[test]
    fn model_field_roundtrip() {
        let (_coll, record) = stored();
        let model = Model::with_spin_mode("dft", "pbe0", "def2-tzvp", "restricted");
        set(&record, "model", &model).unwrap();
        let read: Model = get(&record, "model").unwrap();
        assert_eq!(read, model);
        assert_eq!(read.spin_mode, "restricted");
    }

    #[test]
    fn status_field_uses_string_map() {
        let (coll, record) = stored();
        set(&record, "status", &CalculationStatus::Pending).unwrap();
        let doc = coll.find_by_id(&record.id().unwrap()).unwrap().unwrap();
        assert_eq!(doc.get_str("status"), Some("pending"));
        assert_eq!(
            get::<CalculationStatus>(&record, "status").unwrap(),
            CalculationStatus::Pending
        );
    }

    #[test]
    fn unset_and_exists() {
        let (_coll, record) = stored();
        set(&record, "structure", &Id::new()).unwrap();
        assert!(exists(&record, "structure").unwrap());
        unset(&record, "structure").unwrap();
        assert!(!exists(&record, "structure").unwrap());
    }

    #[test]
    fn non_null_treats_empty_string_as_absent() {
        let (_coll, record) = stored();
        set(&record, "comment", &String::new()).unwrap();
        assert!(exists(&record, "comment").unwrap());
        assert!(!non_null(&record, "comment").unwrap());
        set(&record, "comment", &"x".to_string()).unwrap();
        assert!(non_null(&record, "comment").unwrap());
    }

    #[test]
    fn gating_order_is_collection_then_id() {
        let unlinked = TestRecord { link: Link::new() };
        assert_eq!(
            get::<bool>(&unlinked, "f").unwrap_err(),
            DbError::MissingLinkedCollection
        );

        let coll: CollectionHandle = Arc::new(InMemoryCollection::new("test"));
        let linked = TestRecord {
            link: Link::from_collection(coll),
        };
        assert_eq!(get::<bool>(&linked, "f").unwrap_err(), DbError::MissingId);
    }

    #[test]
    fn set_on_deleted_document_fails() {
        let (coll, record) = stored();
        coll.delete(&record.id().unwrap()).unwrap();
        assert_eq!(
            set(&record, "comment", &"x".to_string()).unwrap_err(),
            DbError::IdNotFound
        );
    }
}
