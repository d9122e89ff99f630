use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use chemdb_types::Id;

/// Names of the fields the storage layer itself reserves.
pub mod field {
    /// The document's identifier, stored in canonical hex form.
    pub const ID: &str = "_id";
    /// The record type tag (structure, compound, property, ...).
    pub const OBJECT_TYPE: &str = "_objecttype";
    /// Creation time, epoch milliseconds.
    pub const CREATED: &str = "_created";
    /// Last modification time, epoch milliseconds.
    pub const LAST_MODIFIED: &str = "_lastmodified";
    /// Whether analysis jobs should skip this record.
    pub const ANALYSIS_DISABLED: &str = "analysis_disabled";
    /// Whether exploration jobs should skip this record.
    pub const EXPLORATION_DISABLED: &str = "exploration_disabled";
}

/// Current wall-clock time in the form timestamps are stored in.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// A generic stored record: a JSON object map with typed access.
///
/// The storage layer never interprets domain fields; the typed getters
/// exist so higher layers can decode without touching `serde_json`
/// directly. Getters return `None` both when a field is absent and when
/// it holds a different type — the caller decides which of the two is an
/// error.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Insert or replace a field.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Remove a field. Returns the previous value if there was one.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Raw field access.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether the field exists at all (including explicit `null`).
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Whether the field exists and is neither `null` nor an empty string.
    pub fn non_null(&self, key: &str) -> bool {
        match self.0.get(key) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }

    /// Iterate over all fields in insertion-independent map order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(Value::as_i64)
    }

    pub fn get_array(&self, key: &str) -> Option<&Vec<Value>> {
        self.0.get(key).and_then(Value::as_array)
    }

    pub fn get_document(&self, key: &str) -> Option<&Map<String, Value>> {
        self.0.get(key).and_then(Value::as_object)
    }

    /// Decode an identifier field from its canonical hex form.
    pub fn get_id(&self, key: &str) -> Option<Id> {
        self.get_str(key).and_then(|s| Id::from_hex(s).ok())
    }

    /// Decode an ordered list of identifiers.
    pub fn get_id_array(&self, key: &str) -> Option<Vec<Id>> {
        let values = self.get_array(key)?;
        values
            .iter()
            .map(|v| v.as_str().and_then(|s| Id::from_hex(s).ok()))
            .collect()
    }

    /// The document's own identifier, if assigned.
    pub fn id(&self) -> Option<Id> {
        self.get_id(field::ID)
    }

    /// Assign the document's identifier.
    pub fn set_id(&mut self, id: Id) {
        self.insert(field::ID, Value::String(id.to_hex()));
    }

    /// The record type tag, if present.
    pub fn object_type(&self) -> Option<&str> {
        self.get_str(field::OBJECT_TYPE)
    }

    /// Stamp `_created` and `_lastmodified` with the same instant and set
    /// the analysis/exploration flags to their enabled defaults.
    pub fn stamp_new(&mut self) {
        let now = now_ms();
        self.insert(field::CREATED, Value::from(now));
        self.insert(field::LAST_MODIFIED, Value::from(now));
        self.insert(field::ANALYSIS_DISABLED, Value::Bool(false));
        self.insert(field::EXPLORATION_DISABLED, Value::Bool(false));
    }

    /// Creation time, if stamped.
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.get_i64(field::CREATED)
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }

    /// Last modification time, if stamped.
    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.get_i64(field::LAST_MODIFIED)
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
