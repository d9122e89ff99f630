//! Record handles over the document store.
//!
//! Every domain record is a thin handle: a [`Link`] (optional
//! collection, optional identifier) plus accessor methods that read and
//! write the backing document on demand. Handles hold no cached field
//! data, so two handles on the same identifier always observe each
//! other's writes.
//!
//! # Design Rules
//!
//! - All storage access runs the two-tier gate: no collection is
//!   `MissingLinkedCollection`, no identifier is `MissingId`, in that
//!   order.
//! - Accessors take `&self`; only operations that change the handle
//!   itself (linking, binding a created id, wiping) take `&mut self`.
//! - Field encoding goes through [`fields::FieldValue`]; property
//!   payload encoding goes through [`payload::PropertyPayload`].

pub mod fields;
pub mod refs;

mod calculation;
mod compound;
mod elementary_step;
mod flask;
mod object;
mod payload;
mod property;
mod reaction;
mod structure;

pub use calculation::Calculation;
pub use compound::Compound;
pub use elementary_step::ElementaryStep;
pub use flask::Flask;
pub use object::{DbObject, Link};
pub use payload::{
    DenseMatrix, PropertyPayload, SparseMatrix, PROPERTY_TYPE_FIELD,
};
pub use property::{
    BoolProperty, DenseMatrixProperty, NumberProperty, Property, PropertyRecord,
    SparseMatrixProperty, StringProperty, TypedProperty, VectorProperty,
};
pub use reaction::{Reaction, Side};
pub use structure::Structure;
