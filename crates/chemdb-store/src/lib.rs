//! Storage layer for chemdb.
//!
//! This crate defines the generic [`Document`] shape, the [`Collection`]
//! capability trait every linked object operates through, an in-memory
//! reference backend, and the [`Manager`] that owns the connection
//! lifecycle and the named-collection layout.
//!
//! # Design Rules
//!
//! 1. The storage layer never interprets domain fields; documents are
//!    opaque JSON maps with typed access at the edges.
//! 2. Absent documents read as `Ok(None)`; the object layer decides
//!    whether absence is an error.
//! 3. Updates are last-writer-wins with no concurrency token; every
//!    successful update touches `_lastmodified`.
//! 4. Failures are propagated, never retried or defaulted away.

pub mod document;
pub mod manager;
pub mod memory;
pub mod traits;

pub use document::{field, now_ms, Document};
pub use manager::{Credentials, Manager, Version, SCHEMA_VERSION};
pub use memory::InMemoryCollection;
pub use traits::{Collection, CollectionHandle};
