//! Comic repository view.
//!
//! # Responsibility
//! - Typed CRUD and field queries over the `Comics` collection.
//!
//! # Invariants
//! - `find_by_genre` is an exact, case-sensitive element match.
//! - `find_by_title_contains` is a case-insensitive substring match.

use super::{decode, decode_all, RepoResult};
use crate::model::comic::Comic;
use crate::store::{Document, DocumentStore, MatchMode};
use serde_json::Value;

/// Default collection name for comics.
pub const COMICS_COLLECTION: &str = "Comics";

const TITLE_FIELD: &str = "title";
const AUTHOR_ID_FIELD: &str = "authorId";
const YEAR_FIELD: &str = "year";
const GENRES_FIELD: &str = "genres";

/// Comic accessor over any document store.
pub struct ComicRepository<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> ComicRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn find_all(&self) -> RepoResult<Vec<Comic>> {
        decode_all(self.store.collection(), self.store.find_all()?)
    }

    pub fn find_by_id(&self, id: &str) -> RepoResult<Option<Comic>> {
        self.store
            .find_by_id(id)?
            .map(|document| decode(self.store.collection(), document))
            .transpose()
    }

    pub fn find_by_title_contains(&self, text: &str) -> RepoResult<Vec<Comic>> {
        self.find_by(
            TITLE_FIELD,
            Value::String(text.to_string()),
            MatchMode::ContainsIgnoreCase,
        )
    }

    pub fn find_by_author_id(&self, author_id: &str) -> RepoResult<Vec<Comic>> {
        self.find_by(
            AUTHOR_ID_FIELD,
            Value::String(author_id.to_string()),
            MatchMode::Exact,
        )
    }

    pub fn find_by_year(&self, year: i32) -> RepoResult<Vec<Comic>> {
        self.find_by(YEAR_FIELD, Value::from(year), MatchMode::Exact)
    }

    pub fn find_by_genre(&self, genre: &str) -> RepoResult<Vec<Comic>> {
        self.find_by(
            GENRES_FIELD,
            Value::String(genre.to_string()),
            MatchMode::Exact,
        )
    }

    /// Inserts when `comic.id` is unset, else replaces the stored document.
    pub fn save(&self, comic: &Comic) -> RepoResult<Comic> {
        let saved = self.store.save(Document::from_entity(comic)?)?;
        decode(self.store.collection(), saved)
    }

    pub fn delete_by_id(&self, id: &str) -> RepoResult<bool> {
        Ok(self.store.delete_by_id(id)?)
    }

    /// Removes `authorId` from one comic without rewriting the rest of it.
    ///
    /// Returns `false` when the comic does not exist.
    pub fn clear_author(&self, comic_id: &str) -> RepoResult<bool> {
        Ok(self.store.unset_field(comic_id, AUTHOR_ID_FIELD)?)
    }

    fn find_by(&self, field: &str, value: Value, mode: MatchMode) -> RepoResult<Vec<Comic>> {
        let documents = self.store.find_by_field(field, &value, mode)?;
        decode_all(self.store.collection(), documents)
    }
}
