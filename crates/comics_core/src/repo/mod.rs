//! Typed repository views over document collections.
//!
//! # Responsibility
//! - Map Author/Comic entities onto generic `DocumentStore` calls.
//! - Name the field queries each collection supports.
//!
//! # Invariants
//! - Views never reference each other; only the catalog service composes
//!   them.
//! - Point lookups return `Ok(None)` for missing ids, never an error.
//! - Undecodable stored documents surface as `InvalidData`, not as silently
//!   skipped rows.

use crate::store::{Document, StoreError};
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod author_repo;
pub mod comic_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for catalog persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Store(StoreError),
    InvalidData(String),
}

impl RepoError {
    /// Returns whether the underlying store was unreachable.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::Store(err) if err.is_unavailable())
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted document: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

fn decode<T: DeserializeOwned>(collection: &str, document: Document) -> RepoResult<T> {
    let id = document.id.clone().unwrap_or_default();
    document.into_entity().map_err(|err| {
        RepoError::InvalidData(format!("{collection}/{id}: {err}"))
    })
}

fn decode_all<T: DeserializeOwned>(
    collection: &str,
    documents: Vec<Document>,
) -> RepoResult<Vec<T>> {
    documents
        .into_iter()
        .map(|document| decode(collection, document))
        .collect()
}
