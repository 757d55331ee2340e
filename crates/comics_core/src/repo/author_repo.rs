//! Author repository view.
//!
//! # Responsibility
//! - Typed CRUD and field queries over the `Authors` collection.
//! - Targeted `comicIds` updates so concurrent appends do not clobber each
//!   other.
//!
//! # Invariants
//! - `save` always replaces the whole document.

use super::{decode, decode_all, RepoResult};
use crate::model::author::Author;
use crate::store::{Document, DocumentStore, MatchMode};
use serde_json::Value;

/// Default collection name for authors.
pub const AUTHORS_COLLECTION: &str = "Authors";

const NAME_FIELD: &str = "name";
const NATIONALITY_FIELD: &str = "nationality";
const COMIC_IDS_FIELD: &str = "comicIds";

/// Author accessor over any document store.
pub struct AuthorRepository<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> AuthorRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn find_all(&self) -> RepoResult<Vec<Author>> {
        decode_all(self.store.collection(), self.store.find_all()?)
    }

    pub fn find_by_id(&self, id: &str) -> RepoResult<Option<Author>> {
        self.store
            .find_by_id(id)?
            .map(|document| decode(self.store.collection(), document))
            .transpose()
    }

    /// Case-insensitive substring match on `name`.
    pub fn find_by_name_contains(&self, text: &str) -> RepoResult<Vec<Author>> {
        self.find_by(NAME_FIELD, text, MatchMode::ContainsIgnoreCase)
    }

    /// Exact match on `nationality`.
    pub fn find_by_nationality(&self, nationality: &str) -> RepoResult<Vec<Author>> {
        self.find_by(NATIONALITY_FIELD, nationality, MatchMode::Exact)
    }

    /// Inserts when `author.id` is unset, else replaces the stored document.
    pub fn save(&self, author: &Author) -> RepoResult<Author> {
        let saved = self.store.save(Document::from_entity(author)?)?;
        decode(self.store.collection(), saved)
    }

    pub fn delete_by_id(&self, id: &str) -> RepoResult<bool> {
        Ok(self.store.delete_by_id(id)?)
    }

    /// Adds `comic_id` to the author's `comicIds` unless present.
    ///
    /// Returns `false` when the author does not exist.
    pub fn add_comic_ref(&self, author_id: &str, comic_id: &str) -> RepoResult<bool> {
        Ok(self.store.add_to_set(
            author_id,
            COMIC_IDS_FIELD,
            &Value::String(comic_id.to_string()),
        )?)
    }

    /// Removes `comic_id` from the author's `comicIds`.
    ///
    /// Returns `false` when the author does not exist.
    pub fn remove_comic_ref(&self, author_id: &str, comic_id: &str) -> RepoResult<bool> {
        Ok(self.store.pull(
            author_id,
            COMIC_IDS_FIELD,
            &Value::String(comic_id.to_string()),
        )?)
    }

    fn find_by(&self, field: &str, text: &str, mode: MatchMode) -> RepoResult<Vec<Author>> {
        let documents =
            self.store
                .find_by_field(field, &Value::String(text.to_string()), mode)?;
        decode_all(self.store.collection(), documents)
    }
}
