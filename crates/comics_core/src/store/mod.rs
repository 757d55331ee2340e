//! Document store capability and backends.
//!
//! # Responsibility
//! - Define the keyed, schema-less collection contract the repository views
//!   consume: id lookups, field-predicate queries, whole-document saves and
//!   targeted single-document field updates.
//! - Share field-matching rules across backends.
//!
//! # Invariants
//! - Every stored document is addressed by a store-generated string id.
//! - `save` replaces the whole body; only the targeted updates touch a single
//!   field, and each of them is atomic for its one document.
//! - Field names are plain identifiers; `id` is owned by the store.
//! - Listing order is insertion order.

use crate::db::DbError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryDocumentStore;
pub use sqlite::SqliteDocumentStore;

/// Field holding the document id in typed entities.
pub const ID_FIELD: &str = "id";

static FIELD_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid field name regex"));

/// Store-assigned document identifier.
pub type DocumentId = String;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by document store backends.
#[derive(Debug)]
pub enum StoreError {
    /// Backend cannot serve the call right now.
    Unavailable(String),
    /// SQLite failure; only lock and I/O failures count as unavailable.
    Db(DbError),
    /// Connection was not bootstrapped through `db::open_*`.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Field name is not a plain identifier or is reserved.
    InvalidField(String),
    /// Document body is not a JSON object or value is unsupported.
    InvalidDocument(String),
    /// JSON encode/decode failure.
    Codec(serde_json::Error),
}

impl StoreError {
    /// Returns whether this is the store-unavailable kind callers may retry
    /// on their own terms.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Unavailable(_) => true,
            Self::Db(err) => err.is_transient(),
            _ => false,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(message) => write!(f, "document store unavailable: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::InvalidField(field) => write!(f, "invalid document field `{field}`"),
            Self::InvalidDocument(message) => write!(f, "invalid document: {message}"),
            Self::Codec(err) => write!(f, "document codec error: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Codec(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Codec(value)
    }
}

/// Predicate mode for `DocumentStore::find_by_field`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Scalar field equals the value, or an array field holds an element
    /// equal to the value. Strings compare case-sensitively.
    Exact,
    /// String field, or any string element of an array field, contains the
    /// value after Unicode lowercasing both sides.
    ContainsIgnoreCase,
}

/// One schema-less record: store id plus a JSON object body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    /// `None` until the store assigns one on first save.
    pub id: Option<DocumentId>,
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { id: None, fields }
    }

    pub fn with_id(id: impl Into<DocumentId>, fields: Map<String, Value>) -> Self {
        Self {
            id: Some(id.into()),
            fields,
        }
    }

    /// Encodes a typed entity, lifting its `id` field out of the body.
    pub fn from_entity<T: Serialize>(entity: &T) -> StoreResult<Self> {
        match serde_json::to_value(entity)? {
            Value::Object(mut fields) => {
                let id = match fields.remove(ID_FIELD) {
                    Some(Value::String(id)) => Some(id),
                    Some(Value::Null) | None => None,
                    Some(other) => {
                        return Err(StoreError::InvalidDocument(format!(
                            "id must be a string, got `{other}`"
                        )))
                    }
                };
                Ok(Self { id, fields })
            }
            other => Err(StoreError::InvalidDocument(format!(
                "expected a JSON object, got `{other}`"
            ))),
        }
    }

    /// Decodes into a typed entity, injecting the store id as `id`.
    pub fn into_entity<T: DeserializeOwned>(self) -> StoreResult<T> {
        let mut fields = self.fields;
        if let Some(id) = self.id {
            fields.insert(ID_FIELD.to_string(), Value::String(id));
        }
        Ok(serde_json::from_value(Value::Object(fields))?)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

/// Keyed document collection consumed by the repository views.
///
/// Point lookups return `Ok(None)` for missing ids; errors are reserved for
/// backend failures and malformed input.
pub trait DocumentStore {
    /// Name of the backing collection, used in diagnostics.
    fn collection(&self) -> &str;
    fn find_by_id(&self, id: &str) -> StoreResult<Option<Document>>;
    fn find_all(&self) -> StoreResult<Vec<Document>>;
    fn find_by_field(
        &self,
        field: &str,
        value: &Value,
        mode: MatchMode,
    ) -> StoreResult<Vec<Document>>;
    /// Inserts when `id` is absent or unknown, else replaces the whole body.
    fn save(&self, document: Document) -> StoreResult<Document>;
    /// Returns whether a document was removed.
    fn delete_by_id(&self, id: &str) -> StoreResult<bool>;
    /// Appends `value` to the array `field` unless already present. A missing
    /// or non-array field becomes `[value]`. Returns whether the document
    /// exists.
    fn add_to_set(&self, id: &str, field: &str, value: &Value) -> StoreResult<bool>;
    /// Removes every element equal to `value` from the array `field`.
    /// Returns whether the document exists.
    fn pull(&self, id: &str, field: &str, value: &Value) -> StoreResult<bool>;
    /// Removes `field` from the body. Returns whether the document exists.
    fn unset_field(&self, id: &str, field: &str) -> StoreResult<bool>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn collection(&self) -> &str {
        (**self).collection()
    }

    fn find_by_id(&self, id: &str) -> StoreResult<Option<Document>> {
        (**self).find_by_id(id)
    }

    fn find_all(&self) -> StoreResult<Vec<Document>> {
        (**self).find_all()
    }

    fn find_by_field(
        &self,
        field: &str,
        value: &Value,
        mode: MatchMode,
    ) -> StoreResult<Vec<Document>> {
        (**self).find_by_field(field, value, mode)
    }

    fn save(&self, document: Document) -> StoreResult<Document> {
        (**self).save(document)
    }

    fn delete_by_id(&self, id: &str) -> StoreResult<bool> {
        (**self).delete_by_id(id)
    }

    fn add_to_set(&self, id: &str, field: &str, value: &Value) -> StoreResult<bool> {
        (**self).add_to_set(id, field, value)
    }

    fn pull(&self, id: &str, field: &str, value: &Value) -> StoreResult<bool> {
        (**self).pull(id, field, value)
    }

    fn unset_field(&self, id: &str, field: &str) -> StoreResult<bool> {
        (**self).unset_field(id, field)
    }
}

/// Rejects field names that are not plain identifiers or that name the
/// store-owned `id`.
pub fn validate_field_name(field: &str) -> StoreResult<()> {
    if field == ID_FIELD || !FIELD_NAME_RE.is_match(field) {
        return Err(StoreError::InvalidField(field.to_string()));
    }
    Ok(())
}

/// Applies `MatchMode` semantics to one document body.
pub(crate) fn field_matches(
    fields: &Map<String, Value>,
    field: &str,
    value: &Value,
    mode: MatchMode,
) -> bool {
    match fields.get(field) {
        Some(Value::Array(items)) => items.iter().any(|item| scalar_matches(item, value, mode)),
        Some(stored) => scalar_matches(stored, value, mode),
        None => false,
    }
}

fn scalar_matches(stored: &Value, value: &Value, mode: MatchMode) -> bool {
    match mode {
        MatchMode::Exact => !stored.is_null() && stored == value,
        MatchMode::ContainsIgnoreCase => match (stored, value) {
            (Value::String(haystack), Value::String(needle)) => haystack
                .to_lowercase()
                .contains(needle.to_lowercase().as_str()),
            _ => false,
        },
    }
}
