//! Accessors for reference-collection fields: ordered lists of
//! identifiers stored under a named field on a parent record (a
//! compound's structures, a flask's compounds, a reaction's sides).
//!
//! All helpers require a linked and identified handle and fail with the
//! standard two-tier errors. The sequence preserves the order supplied
//! by the last `set`/`add`; duplicates are permitted. None of the
//! read-modify-write helpers is atomic across the storage boundary —
//! two concurrent writers on the same field race exactly as spec'd for
//! the backend.

use chemdb_types::{DbError, DbResult, Id};

use crate::fields;
use crate::object::DbObject;

/// The full ordered sequence. Missing document or field is
/// `MissingIdOrField`.
pub fn get(obj: &(impl DbObject + ?Sized), field: &str) -> DbResult<Vec<Id>> {
    fields::get(obj, field)
}

/// Atomic full replacement of the sequence.
pub fn set(obj: &(impl DbObject + ?Sized), field: &str, ids: &[Id]) -> DbResult<()> {
    fields::set(obj, field, &ids.to_vec())
}

/// Append one identifier. Creates the field if it does not exist yet.
pub fn add(obj: &(impl DbObject + ?Sized), field: &str, id: Id) -> DbResult<()> {
    let mut ids = fields::partial_get::<Vec<Id>>(obj, field)?.unwrap_or_default();
    ids.push(id);
    set(obj, field, &ids)
}

/// Remove every entry equal to `id`. Removing a non-member is not an
/// error.
pub fn remove(obj: &(impl DbObject + ?Sized), field: &str, id: Id) -> DbResult<()> {
    let mut ids = fields::partial_get::<Vec<Id>>(obj, field)?.unwrap_or_default();
    ids.retain(|entry| *entry != id);
    set(obj, field, &ids)
}

/// Membership test.
pub fn has(obj: &(impl DbObject + ?Sized), field: &str, id: Id) -> DbResult<bool> {
    Ok(get(obj, field)?.contains(&id))
}

/// Number of entries. Callers treat `> 0` as the non-empty test.
pub fn count(obj: &(impl DbObject + ?Sized), field: &str) -> DbResult<usize> {
    Ok(get(obj, field)?.len())
}

/// Empty the sequence (the field remains, as an empty list).
pub fn clear(obj: &(impl DbObject + ?Sized), field: &str) -> DbResult<()> {
    set(obj, field, &[])
}

/// The first entry — the centroid convention. An absent or empty field
/// is `MissingIdOrField`.
pub fn first(obj: &(impl DbObject + ?Sized), field: &str) -> DbResult<Id> {
    get(obj, field)?
        .first()
        .copied()
        .ok_or(DbError::MissingIdOrField)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{DbObject, Link};
    use chemdb_store::{CollectionHandle, Document, InMemoryCollection};
    use std::sync::Arc;

    struct Parent {
        link: Link,
    }

    impl DbObject for Parent {
        const OBJECT_TYPE: &'static str = "parent";

        fn link_ref(&self) -> &Link {
            &self.link
        }

        fn link_mut(&mut self) -> &mut Link {
            &mut self.link
        }
    }

    fn parent() -> Parent {
        let coll: CollectionHandle = Arc::new(InMemoryCollection::new("test"));
        let mut doc = Document::new();
        doc.stamp_new();
        let id = coll.insert(doc).unwrap();
        Parent {
            link: Link::full(id, coll),
        }
    }

    #[test]
    fn set_preserves_order() {
        let obj = parent();
        let (a, b, c) = (Id::new(), Id::new(), Id::new());
        set(&obj, "structures", &[a, b, c]).unwrap();
        assert_eq!(get(&obj, "structures").unwrap(), vec![a, b, c]);
    }

    #[test]
    fn add_appends() {
        let obj = parent();
        let (a, b) = (Id::new(), Id::new());
        add(&obj, "structures", a).unwrap();
        add(&obj, "structures", b).unwrap();
        assert_eq!(get(&obj, "structures").unwrap(), vec![a, b]);
    }

    #[test]
    fn duplicates_are_permitted() {
        let obj = parent();
        let a = Id::new();
        add(&obj, "structures", a).unwrap();
        add(&obj, "structures", a).unwrap();
        assert_eq!(count(&obj, "structures").unwrap(), 2);
    }

    #[test]
    fn remove_removes_all_matches() {
        let obj = parent();
        let (a, b) = (Id::new(), Id::new());
        set(&obj, "structures", &[a, b, a]).unwrap();
        remove(&obj, "structures", a).unwrap();
        assert_eq!(get(&obj, "structures").unwrap(), vec![b]);
    }

    #[test]
    fn remove_middle_keeps_order() {
        let obj = parent();
        let (a, b, c) = (Id::new(), Id::new(), Id::new());
        set(&obj, "structures", &[a, b, c]).unwrap();
        remove(&obj, "structures", b).unwrap();
        assert_eq!(get(&obj, "structures").unwrap(), vec![a, c]);
    }

    #[test]
    fn remove_non_member_is_fine() {
        let obj = parent();
        let a = Id::new();
        set(&obj, "structures", &[a]).unwrap();
        remove(&obj, "structures", Id::new()).unwrap();
        assert_eq!(get(&obj, "structures").unwrap(), vec![a]);
    }

    #[test]
    fn has_and_count() {
        let obj = parent();
        let (a, b) = (Id::new(), Id::new());
        set(&obj, "structures", &[a]).unwrap();
        assert!(has(&obj, "structures", a).unwrap());
        assert!(!has(&obj, "structures", b).unwrap());
        assert_eq!(count(&obj, "structures").unwrap(), 1);
    }

    #[test]
    fn clear_leaves_empty_field() {
        let obj = parent();
        set(&obj, "structures", &[Id::new()]).unwrap();
        clear(&obj, "structures").unwrap();
        assert_eq!(count(&obj, "structures").unwrap(), 0);
        assert_eq!(get(&obj, "structures").unwrap(), Vec::<Id>::new());
    }

    #[test]
    fn first_is_the_centroid() {
        let obj = parent();
        let (a, b) = (Id::new(), Id::new());
        set(&obj, "structures", &[a, b]).unwrap();
        assert_eq!(first(&obj, "structures").unwrap(), a);
    }

    #[test]
    fn first_fails_on_empty_or_absent() {
        let obj = parent();
        assert_eq!(
            first(&obj, "structures").unwrap_err(),
            DbError::MissingIdOrField
        );
        set(&obj, "structures", &[]).unwrap();
        assert_eq!(
            first(&obj, "structures").unwrap_err(),
            DbError::MissingIdOrField
        );
    }

    #[test]
    fn gating_applies() {
        let unlinked = Parent { link: Link::new() };
        assert_eq!(
            get(&unlinked, "structures").unwrap_err(),
            DbError::MissingLinkedCollection
        );
    }
}
