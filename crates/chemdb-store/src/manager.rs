//! Connection manager: credentials, the named-collection registry, and
//! the database version metadata.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use chemdb_types::layout::{default_collection, internal_collection};
use chemdb_types::{DbError, DbResult};

use crate::document::Document;
use crate::memory::InMemoryCollection;
use crate::traits::{Collection, CollectionHandle};

/// Schema version this client writes and accepts (major, minor, patch).
pub const SCHEMA_VERSION: Version = Version {
    major: 1,
    minor: 0,
    patch: 0,
};

/// A database schema version as stored in the meta collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub major: i64,
    pub minor: i64,
    pub patch: i64,
}

impl Version {
    /// Compatibility requires matching major and minor; patch may differ.
    pub fn is_compatible_with(&self, other: &Version) -> bool {
        self.major == other.major && self.minor == other.minor
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Connection settings for a database, loadable from TOML.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// The name of the host running the database.
    pub hostname: String,
    /// The port the database listens on.
    pub port: u16,
    /// The name of the database on the server.
    pub database_name: String,
    /// The username, if authentication is required.
    pub username: String,
    /// The password, if authentication is required.
    pub password: String,
    /// The authentication database, if authentication is required.
    pub auth_database: String,
    /// Seconds before the initial connection attempt times out.
    pub connection_timeout_secs: u64,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            hostname: "localhost".into(),
            port: 27017,
            database_name: "chemdb".into(),
            username: String::new(),
            password: String::new(),
            auth_database: String::new(),
            connection_timeout_secs: 60,
        }
    }
}

impl Credentials {
    /// Create credentials for a named database on a host.
    pub fn new(
        hostname: impl Into<String>,
        port: u16,
        database_name: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            port,
            database_name: database_name.into(),
            ..Self::default()
        }
    }

    /// Parse credentials from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Load credentials from a TOML file.
    ///
    /// Any read or parse failure surfaces as `MissingCredentials`: a
    /// broken credentials file and an absent one are equally unusable.
    pub fn from_file(path: impl AsRef<Path>) -> DbResult<Self> {
        let text =
            std::fs::read_to_string(path).map_err(|_| DbError::MissingCredentials)?;
        Self::from_toml_str(&text).map_err(|_| DbError::MissingCredentials)
    }
}

/// Database names a server would reject.
fn validate_database_name(name: &str) -> DbResult<()> {
    const FORBIDDEN: [char; 12] = ['/', '\\', '.', ' ', '"', '$', '*', '<', '>', ':', '|', '?'];
    if name.is_empty() || name.len() > 64 || name.chars().any(|c| FORBIDDEN.contains(&c)) {
        return Err(DbError::Field);
    }
    Ok(())
}

/// Client handle for one database: connection lifecycle plus access to
/// its named collections.
///
/// The manager assumes a single logical thread of control; collection
/// handles obtained from it can outlive a `disconnect()` but any
/// operation through them after the server dropped the namespace
/// surfaces storage errors, not manager errors.
pub struct Manager {
    credentials: Option<Credentials>,
    connected: bool,
    collections: HashMap<String, Arc<InMemoryCollection>>,
}

impl Manager {
    /// Create a manager without credentials. `connect` will fail until
    /// credentials are supplied.
    pub fn new() -> Self {
        Self {
            credentials: None,
            connected: false,
            collections: HashMap::new(),
        }
    }

    /// Create a manager with credentials already set.
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            credentials: Some(credentials),
            connected: false,
            collections: HashMap::new(),
        }
    }

    /// Replace the credentials. Does not touch an existing connection.
    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = Some(credentials);
    }

    /// The current credentials.
    pub fn credentials(&self) -> DbResult<&Credentials> {
        self.credentials.as_ref().ok_or(DbError::MissingCredentials)
    }

    /// Whether a connection is currently established.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Establish the connection described by the credentials.
    pub fn connect(&mut self) -> DbResult<()> {
        let credentials = self.credentials()?;
        validate_database_name(&credentials.database_name)?;
        debug!(
            host = %credentials.hostname,
            port = credentials.port,
            database = %credentials.database_name,
            "connecting"
        );
        self.connected = true;
        Ok(())
    }

    /// Drop the connection. Stored data is kept by the backend.
    pub fn disconnect(&mut self) {
        self.connected = false;
    }

    fn require_connected(&self) -> DbResult<()> {
        if self.connected {
            Ok(())
        } else {
            Err(DbError::DatabaseDisconnected)
        }
    }

    /// Create the default collection layout and write the version
    /// document. Safe to call on an already-initialized database.
    pub fn init(&mut self) -> DbResult<()> {
        self.require_connected()?;
        for name in default_collection::ALL {
            self.collections
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(InMemoryCollection::new(name)));
        }
        let meta = self
            .collections
            .entry(internal_collection::META.to_string())
            .or_insert_with(|| Arc::new(InMemoryCollection::new(internal_collection::META)));
        if meta.count()? == 0 {
            let mut doc = Document::new();
            doc.stamp_new();
            doc.insert("version", json!(SCHEMA_VERSION));
            meta.insert(doc)?;
        }
        debug!("database initialized");
        Ok(())
    }

    /// Drop every collection, version metadata included.
    pub fn wipe(&mut self) -> DbResult<()> {
        self.require_connected()?;
        self.collections.clear();
        debug!("database wiped");
        Ok(())
    }

    /// Whether the named collection exists.
    pub fn has_collection(&self, name: &str) -> DbResult<bool> {
        self.require_connected()?;
        Ok(self.collections.contains_key(name))
    }

    /// Fetch a handle to the named collection.
    pub fn get_collection(&self, name: &str) -> DbResult<CollectionHandle> {
        self.require_connected()?;
        self.collections
            .get(name)
            .map(|c| Arc::clone(c) as CollectionHandle)
            .ok_or(DbError::MissingCollection)
    }

    /// Create (or fetch) a collection outside the default layout.
    pub fn create_collection(&mut self, name: &str) -> DbResult<CollectionHandle> {
        self.require_connected()?;
        let coll = self
            .collections
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(InMemoryCollection::new(name)));
        Ok(Arc::clone(coll) as CollectionHandle)
    }

    /// The schema version recorded in the meta collection.
    pub fn database_version(&self) -> DbResult<Version> {
        self.require_connected()?;
        let meta = self
            .collections
            .get(internal_collection::META)
            .ok_or(DbError::MissingCollection)?;
        let id = meta.all_ids().into_iter().next().ok_or(DbError::UnpopulatedObject)?;
        let doc = meta.find_by_id(&id)?.ok_or(DbError::UnpopulatedObject)?;
        let version = doc
            .get("version")
            .cloned()
            .ok_or(DbError::UnpopulatedObject)?;
        serde_json::from_value(version).map_err(|_| DbError::UnpopulatedObject)
    }

    /// Fail with `VersionMismatch` unless the stored schema version is
    /// compatible with this client.
    pub fn ensure_compatible(&self) -> DbResult<()> {
        let stored = self.database_version()?;
        if stored.is_compatible_with(&SCHEMA_VERSION) {
            Ok(())
        } else {
            Err(DbError::VersionMismatch)
        }
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("connected", &self.connected)
            .field("collections", &self.collections.len())
            .finish()
    }
}
