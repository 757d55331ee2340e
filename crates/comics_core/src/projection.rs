//! Read-only projections handed to callers.
//!
//! A comic projection embeds its author as scalars only, and an author
//! projection lists comics without their author, so nesting stops after one
//! level.

use crate::model::author::{Author, AuthorId};
use crate::model::comic::{Comic, ComicId};
use serde::Serialize;

/// Author as seen by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorProjection {
    pub id: AuthorId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
    /// Rebuilt from `Comic.authorId` at read time; `None` when embedded in a
    /// comic projection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comics: Option<Vec<ComicProjection>>,
}

impl AuthorProjection {
    /// Scalar fields only.
    pub fn scalars(author: &Author) -> Self {
        Self {
            id: author.id.clone().unwrap_or_default(),
            name: author.name.clone(),
            surname: author.surname.clone(),
            nationality: author.nationality.clone(),
            birth_date: author.birth_date.clone(),
            biography: author.biography.clone(),
            comics: None,
        }
    }
}

/// Comic as seen by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComicProjection {
    pub id: ComicId,
    pub title: String,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
    pub genres: Vec<String>,
    /// Unset when the comic has no author or its reference dangles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorProjection>,
}

impl ComicProjection {
    /// Scalar fields only.
    pub fn scalars(comic: &Comic) -> Self {
        Self {
            id: comic.id.clone().unwrap_or_default(),
            title: comic.title.clone(),
            year: comic.year,
            publisher: comic.publisher.clone(),
            synopsis: comic.synopsis.clone(),
            genres: comic.genres.clone(),
            author: None,
        }
    }

    pub fn with_author(mut self, author: Option<AuthorProjection>) -> Self {
        self.author = author;
        self
    }
}
