//! Comic document.

use super::{null_as_default, ModelValidationError};
use crate::model::author::AuthorId;
use serde::{Deserialize, Serialize};

/// Store-assigned comic identifier.
pub type ComicId = String;

/// Comic record in the `Comics` collection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comic {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ComicId>,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub year: i32,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub synopsis: Option<String>,
    /// Set-like: exact, case-sensitive strings.
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<String>,
    /// Zero or one author. Absent from the stored body when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<AuthorId>,
}

impl Comic {
    /// Creates an unsaved comic with title and year.
    pub fn new(title: impl Into<String>, year: i32) -> Self {
        Self {
            title: title.into(),
            year,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.title.trim().is_empty() {
            return Err(ModelValidationError::BlankField("title"));
        }
        if self.year < 0 {
            return Err(ModelValidationError::NegativeYear(self.year));
        }
        if self.genres.iter().any(|genre| genre.trim().is_empty()) {
            return Err(ModelValidationError::BlankGenre);
        }
        if matches!(&self.author_id, Some(author_id) if author_id.trim().is_empty()) {
            return Err(ModelValidationError::BlankField("authorId"));
        }
        Ok(())
    }

    /// Drops repeated genres, keeping first-seen order and original case.
    pub fn normalized_genres(&self) -> Vec<String> {
        let mut genres: Vec<String> = Vec::with_capacity(self.genres.len());
        for genre in &self.genres {
            if !genres.contains(genre) {
                genres.push(genre.clone());
            }
        }
        genres
    }
}
