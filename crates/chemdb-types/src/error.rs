use thiserror::Error;

/// The flat failure taxonomy shared by every chemdb component.
///
/// Three tiers, never caught inside the workspace:
///
/// - state preconditions ([`MissingLinkedCollection`](DbError::MissingLinkedCollection),
///   [`MissingId`](DbError::MissingId)) — raised before any storage access;
///   the caller can recover by linking or creating first.
/// - storage consistency ([`IdNotFound`](DbError::IdNotFound),
///   [`ObjectTypeMismatch`](DbError::ObjectTypeMismatch),
///   [`DuplicateId`](DbError::DuplicateId), ...) — surfaced after a storage
///   round trip; local state is stale or the schema disagrees.
/// - environment ([`MissingCredentials`](DbError::MissingCredentials),
///   [`DatabaseDisconnected`](DbError::DatabaseDisconnected),
///   [`VersionMismatch`](DbError::VersionMismatch)) — the collaborator
///   itself is unusable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DbError {
    /// An operation required a linked collection, but none is attached.
    #[error("missing linked collection")]
    MissingLinkedCollection,

    /// An operation required an identifier, but none is set.
    #[error("the object is missing an ID to be used in this context")]
    MissingId,

    /// An identifier is set, but no matching document exists in storage.
    #[error("no object with the given ID could be found")]
    IdNotFound,

    /// The stored type tag disagrees with the requested decode type.
    #[error("the object type requested does not match the one in the database")]
    ObjectTypeMismatch,

    /// A document carried an identifier that already exists in storage.
    #[error("the object to be added to the database has an ID that already exists in the database")]
    DuplicateId,

    /// A required timestamp field is absent; add to or update from the
    /// database first.
    #[error("the object is missing a requested timestamp")]
    MissingTimestamp,

    /// No credentials are available to establish a connection.
    #[error("no credentials available")]
    MissingCredentials,

    /// No connection to a database is established.
    #[error("no connection to a database available")]
    DatabaseDisconnected,

    /// The requested collection does not exist.
    #[error("the requested collection could not be found")]
    MissingCollection,

    /// The object is missing data in at least one required field.
    #[error("the object is missing data in at least one required field; action aborted")]
    UnpopulatedObject,

    /// The document with the given identifier, or the requested field in
    /// it, could not be found.
    #[error("the object with the given ID, or the requested field in it, could not be found")]
    MissingIdOrField,

    /// A restriction placed on a particular field is not fulfilled.
    #[error("the requested field did not match the specifications")]
    Field,

    /// The database was created with a version this client does not support.
    #[error("the database was created with a version that is not supported by this client")]
    VersionMismatch,

    /// An identifier string does not have the canonical 24-hex-char form.
    #[error("malformed identifier: {0}")]
    MalformedIdentifier(String),
}

/// Result alias used across all chemdb crates.
pub type DbResult<T> = Result<T, DbError>;
