//! The generic property CRUD engine.
//!
//! One create/read/update protocol shared by every payload kind: the
//! control flow lives here once, parametrized over
//! [`PropertyPayload`](crate::payload::PropertyPayload); the per-kind
//! handles are type aliases of [`TypedProperty`].

use std::marker::PhantomData;

use serde_json::Value;
use tracing::debug;

use chemdb_store::{field, CollectionHandle, Document};
use chemdb_types::{DbError, DbResult, Id, Model};

use crate::fields::{self, FieldValue};
use crate::object::{DbObject, Link};
use crate::payload::{
    DenseMatrix, PropertyPayload, SparseMatrix, PROPERTY_TYPE_FIELD,
};

/// Boolean-valued property.
pub type BoolProperty = TypedProperty<bool>;
/// Scalar-valued property.
pub type NumberProperty = TypedProperty<f64>;
/// String-valued property.
pub type StringProperty = TypedProperty<String>;
/// Dense-vector property.
pub type VectorProperty = TypedProperty<Vec<f64>>;
/// Dense-matrix property.
pub type DenseMatrixProperty = TypedProperty<DenseMatrix>;
/// Sparse-matrix property.
pub type SparseMatrixProperty = TypedProperty<SparseMatrix>;

fn build_document<P: PropertyPayload>(
    model: &Model,
    name: &str,
    data: &P,
    structure: Option<Id>,
    calculation: Option<Id>,
) -> Document {
    let mut document = Document::new();
    document.stamp_new();
    document.insert(field::OBJECT_TYPE, Value::String("property".into()));
    document.insert(
        PROPERTY_TYPE_FIELD,
        Value::String(P::PROPERTY_TYPE.into()),
    );
    document.insert("property_name", Value::String(name.into()));
    document.insert("model", model.to_value());
    document.insert("comment", Value::String(String::new()));
    data.encode_into(&mut document);
    if let Some(id) = structure {
        document.insert("structure", id.to_value());
    }
    if let Some(id) = calculation {
        document.insert("calculation", id.to_value());
    }
    document
}

/// Field accessors shared by the typed and untyped property handles.
///
/// Everything requires a linked and identified handle; the `has_*`
/// variants report a simply-absent optional link as `false` rather than
/// an error.
pub trait PropertyRecord: DbObject {
    /// The name of the property ("electronic_energy", ...).
    fn property_name(&self) -> DbResult<String> {
        fields::get(self, "property_name")
    }

    fn set_property_name(&self, name: &str) -> DbResult<()> {
        fields::set(self, "property_name", &name.to_string())
    }

    /// The level of theory the property was computed with.
    fn model(&self) -> DbResult<Model> {
        fields::get(self, "model")
    }

    fn set_model(&self, model: &Model) -> DbResult<()> {
        fields::set(self, "model", model)
    }

    fn comment(&self) -> DbResult<String> {
        fields::get(self, "comment")
    }

    fn set_comment(&self, comment: &str) -> DbResult<()> {
        fields::set(self, "comment", &comment.to_string())
    }

    fn has_comment(&self) -> DbResult<bool> {
        fields::non_null(self, "comment")
    }

    fn clear_comment(&self) -> DbResult<()> {
        self.set_comment("")
    }

    /// The structure this property belongs to. Fails with
    /// `MissingIdOrField` when no provenance link is set.
    fn structure(&self) -> DbResult<Id> {
        fields::get(self, "structure")
    }

    /// The structure link, if set.
    fn partial_structure(&self) -> DbResult<Option<Id>> {
        fields::partial_get(self, "structure")
    }

    fn has_structure(&self) -> DbResult<bool> {
        fields::exists(self, "structure")
    }

    fn set_structure(&self, id: Id) -> DbResult<()> {
        fields::set(self, "structure", &id)
    }

    fn clear_structure(&self) -> DbResult<()> {
        fields::unset(self, "structure")
    }

    /// The calculation this property was produced by. Fails with
    /// `MissingIdOrField` when no provenance link is set.
    fn calculation(&self) -> DbResult<Id> {
        fields::get(self, "calculation")
    }

    fn has_calculation(&self) -> DbResult<bool> {
        fields::exists(self, "calculation")
    }

    fn set_calculation(&self, id: Id) -> DbResult<()> {
        fields::set(self, "calculation", &id)
    }

    fn clear_calculation(&self) -> DbResult<()> {
        fields::unset(self, "calculation")
    }
}

/// A property handle fixed to one payload kind.
#[derive(Clone, Debug)]
pub struct TypedProperty<P: PropertyPayload> {
    link: Link,
    _payload: PhantomData<P>,
}

impl<P: PropertyPayload> DbObject for TypedProperty<P> {
    const OBJECT_TYPE: &'static str = "property";

    fn link_ref(&self) -> &Link {
        &self.link
    }

    fn link_mut(&mut self) -> &mut Link {
        &mut self.link
    }
}

impl<P: PropertyPayload> PropertyRecord for TypedProperty<P> {}

impl<P: PropertyPayload> TypedProperty<P> {
    /// A fresh, unlinked, unidentified handle.
    pub fn new() -> Self {
        Self::from_link(Link::new())
    }

    /// A handle for an existing identifier, not yet linked.
    pub fn from_id(id: Id) -> Self {
        Self::from_link(Link::from_id(id))
    }

    /// A linked handle without an identifier; `create` will bind one.
    pub fn from_collection(collection: CollectionHandle) -> Self {
        Self::from_link(Link::from_collection(collection))
    }

    /// A fully usable handle for an existing stored property.
    pub fn from_parts(id: Id, collection: CollectionHandle) -> Self {
        Self::from_link(Link::full(id, collection))
    }

    pub(crate) fn from_link(link: Link) -> Self {
        Self {
            link,
            _payload: PhantomData,
        }
    }

    /// Insert a new property document and return its handle.
    ///
    /// A plain insert: every call stores a new record.
    pub fn create(
        model: &Model,
        name: &str,
        data: &P,
        collection: &CollectionHandle,
    ) -> DbResult<Self> {
        Self::create_with_provenance(model, name, data, None, None, collection)
    }

    /// Insert a new property document with provenance links.
    pub fn create_with_provenance(
        model: &Model,
        name: &str,
        data: &P,
        structure: Option<Id>,
        calculation: Option<Id>,
        collection: &CollectionHandle,
    ) -> DbResult<Self> {
        let document = build_document(model, name, data, structure, calculation);
        let id = collection.insert(document)?;
        debug!(%id, kind = P::PROPERTY_TYPE, name, "property created");
        Ok(Self::from_parts(id, CollectionHandle::clone(collection)))
    }

    /// Insert a new property document through the linked collection and
    /// bind the fresh identifier onto this handle.
    ///
    /// Requires a link; any previously set identifier is ignored and
    /// replaced.
    pub fn create_linked(
        &mut self,
        model: &Model,
        name: &str,
        data: &P,
        structure: Option<Id>,
        calculation: Option<Id>,
    ) -> DbResult<Id> {
        let collection = self.collection()?;
        let document = build_document(model, name, data, structure, calculation);
        let id = collection.insert(document)?;
        debug!(%id, kind = P::PROPERTY_TYPE, name, "property created");
        self.link.set_id(id);
        Ok(id)
    }

    /// Fetch and decode the payload.
    ///
    /// Fails with `IdNotFound` when the document is gone and with
    /// `ObjectTypeMismatch` when the stored kind tag is not
    /// `P::PROPERTY_TYPE`.
    pub fn get_data(&self) -> DbResult<P> {
        let (collection, id) = self.require_linked_and_identified()?;
        let document = collection.find_by_id(&id)?.ok_or(DbError::IdNotFound)?;
        let tag = document
            .get_str(PROPERTY_TYPE_FIELD)
            .ok_or(DbError::MissingIdOrField)?;
        if tag != P::PROPERTY_TYPE {
            return Err(DbError::ObjectTypeMismatch);
        }
        P::decode(&document)
    }

    /// Re-encode and overwrite the payload fields only.
    ///
    /// Name, model, comment and provenance links are untouched. This is
    /// an unconditional last-writer-wins overwrite; concurrent writers
    /// on the same identifier converge to whichever write lands last.
    pub fn set_data(&self, data: &P) -> DbResult<()> {
        let (collection, id) = self.require_linked_and_identified()?;
        let mut payload = Document::new();
        data.encode_into(&mut payload);
        let updates: Vec<(String, Value)> = payload
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if !collection.update_fields(&id, &updates)? {
            return Err(DbError::IdNotFound);
        }
        Ok(())
    }

    /// Forget the payload kind.
    pub fn into_untyped(self) -> Property {
        Property { link: self.link }
    }
}

impl<P: PropertyPayload> Default for TypedProperty<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// A property handle whose payload kind is not (yet) known.
///
/// Useful when following provenance links: fetch the stored kind tag
/// with [`Property::property_type`], or convert with
/// [`Property::into_typed`].
#[derive(Clone, Debug)]
pub struct Property {
    link: Link,
}

impl DbObject for Property {
    const OBJECT_TYPE: &'static str = "property";

    fn link_ref(&self) -> &Link {
        &self.link
    }

    fn link_mut(&mut self) -> &mut Link {
        &mut self.link
    }
}

impl PropertyRecord for Property {}

impl Property {
    /// A handle for an existing identifier, not yet linked.
    pub fn from_id(id: Id) -> Self {
        Self {
            link: Link::from_id(id),
        }
    }

    /// A fully usable handle for an existing stored property.
    pub fn from_parts(id: Id, collection: CollectionHandle) -> Self {
        Self {
            link: Link::full(id, collection),
        }
    }

    /// The stored payload-kind tag.
    pub fn property_type(&self) -> DbResult<String> {
        fields::get(self, PROPERTY_TYPE_FIELD)
    }

    /// Whether the stored payload kind is `P`.
    pub fn is_of_type<P: PropertyPayload>(&self) -> DbResult<bool> {
        Ok(self.property_type()? == P::PROPERTY_TYPE)
    }

    /// Convert into the typed handle for `P`, verifying the stored tag.
    pub fn into_typed<P: PropertyPayload>(self) -> DbResult<TypedProperty<P>> {
        if !self.is_of_type::<P>()? {
            return Err(DbError::ObjectTypeMismatch);
        }
        Ok(TypedProperty::from_link(self.link))
    }
}
