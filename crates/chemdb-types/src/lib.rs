//! Foundation types for chemdb.
//!
//! This crate provides the identifier, model descriptor, database layout
//! and error taxonomy used throughout the chemdb workspace. Every other
//! chemdb crate depends on `chemdb-types`.
//!
//! # Key Types
//!
//! - [`Id`] — 12-byte, globally unique, time-ordered surrogate key
//! - [`Model`] — level-of-theory descriptor with `any`/`none` wildcard
//!   matching
//! - [`layout`] — default collection names and the closed document enums
//! - [`DbError`] — the flat failure taxonomy shared by all components

pub mod error;
pub mod id;
pub mod layout;
pub mod model;

pub use error::{DbError, DbResult};
pub use id::Id;
pub use layout::{CalculationStatus, ElementaryStepType, StructureLabel};
pub use model::Model;
