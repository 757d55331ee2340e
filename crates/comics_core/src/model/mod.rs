//! Catalog domain model.
//!
//! # Responsibility
//! - Define the Author and Comic documents as stored in their collections.
//! - Own field-level validation applied before any write.
//!
//! # Invariants
//! - Ids are assigned by the store and never changed afterwards.
//! - `Comic::author_id` is the authoritative side of the relationship;
//!   `Author::comic_ids` is a denormalized back-reference that may drift.

pub mod author;
pub mod comic;

use serde::{Deserialize, Deserializer};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Reads an explicit `null` the same as a missing key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Field-level validation failure for catalog documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// A required text field is empty after trim.
    BlankField(&'static str),
    /// Publication year is below zero.
    NegativeYear(i32),
    /// Genre list holds an empty entry.
    BlankGenre,
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "`{field}` must not be blank"),
            Self::NegativeYear(year) => write!(f, "year must not be negative, got {year}"),
            Self::BlankGenre => write!(f, "genres must not contain blank entries"),
        }
    }
}

impl Error for ModelValidationError {}
