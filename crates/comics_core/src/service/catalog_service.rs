//! Comic/Author relational resolution service.
//!
//! # Responsibility
//! - Join comics to their author (and authors to their comics) at read time.
//! - Keep `Comic.authorId` and `Author.comicIds` in step on writes, one
//!   single-document write at a time.
//! - Reject invalid documents before anything is persisted.
//!
//! # Invariants
//! - `Comic.authorId` is the source of truth. Author projections rebuild
//!   their comic list with `find_by_author_id`; `comicIds` is never read.
//! - A dangling `authorId` resolves to "no author", never to an error.
//! - Deleting an author first unsets `authorId` on every referencing comic.
//! - Writes are not transactional across collections. If the back-reference
//!   write fails after the primary write, the primary write stands and the
//!   failure is logged.
//! - Primary-write and read failures propagate unchanged; nothing is retried.

use crate::model::author::{Author, AuthorId};
use crate::model::comic::Comic;
use crate::model::ModelValidationError;
use crate::projection::{AuthorProjection, ComicProjection};
use crate::repo::author_repo::AuthorRepository;
use crate::repo::comic_repo::ComicRepository;
use crate::repo::RepoError;
use crate::store::DocumentStore;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CatalogResult<T> = Result<T, CatalogServiceError>;

/// Service error for catalog use-cases.
#[derive(Debug)]
pub enum CatalogServiceError {
    /// Input rejected before any write.
    Validation(ModelValidationError),
    /// Persistence-layer failure, passed through untranslated.
    Repo(RepoError),
}

impl CatalogServiceError {
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::Repo(err) if err.is_store_unavailable())
    }
}

impl Display for CatalogServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "validation failed: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CatalogServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ModelValidationError> for CatalogServiceError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for CatalogServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// Nothing stored under that id; nothing was changed.
    NotFound,
}

/// Catalog facade owning both repository views.
pub struct CatalogService<A: DocumentStore, C: DocumentStore> {
    authors: AuthorRepository<A>,
    comics: ComicRepository<C>,
}

impl<A: DocumentStore, C: DocumentStore> CatalogService<A, C> {
    pub fn new(authors: AuthorRepository<A>, comics: ComicRepository<C>) -> Self {
        Self { authors, comics }
    }

    /// Builds both views directly from their backing stores.
    pub fn from_stores(author_store: A, comic_store: C) -> Self {
        Self::new(
            AuthorRepository::new(author_store),
            ComicRepository::new(comic_store),
        )
    }

    /// Resolves one comic with its author embedded when resolvable.
    pub fn resolve_comic(&self, id: &str) -> CatalogResult<Option<ComicProjection>> {
        match self.comics.find_by_id(id)? {
            Some(comic) => Ok(Some(self.project_comic(&comic)?)),
            None => Ok(None),
        }
    }

    /// Resolves one author with the comics that currently reference it.
    pub fn resolve_author(&self, id: &str) -> CatalogResult<Option<AuthorProjection>> {
        match self.authors.find_by_id(id)? {
            Some(author) => Ok(Some(self.project_author(&author)?)),
            None => Ok(None),
        }
    }

    pub fn list_comics(&self) -> CatalogResult<Vec<ComicProjection>> {
        let comics = self.comics.find_all()?;
        self.project_comics(&comics)
    }

    pub fn list_authors(&self) -> CatalogResult<Vec<AuthorProjection>> {
        let authors = self.authors.find_all()?;
        self.project_authors(&authors)
    }

    /// Case-insensitive title substring search.
    pub fn find_comics_by_title(&self, text: &str) -> CatalogResult<Vec<ComicProjection>> {
        let comics = self.comics.find_by_title_contains(text)?;
        self.project_comics(&comics)
    }

    pub fn find_comics_by_author(&self, author_id: &str) -> CatalogResult<Vec<ComicProjection>> {
        let comics = self.comics.find_by_author_id(author_id)?;
        self.project_comics(&comics)
    }

    pub fn find_comics_by_year(&self, year: i32) -> CatalogResult<Vec<ComicProjection>> {
        let comics = self.comics.find_by_year(year)?;
        self.project_comics(&comics)
    }

    /// Exact, case-sensitive genre match: `"scifi"` does not find `"SciFi"`.
    pub fn find_comics_by_genre(&self, genre: &str) -> CatalogResult<Vec<ComicProjection>> {
        let comics = self.comics.find_by_genre(genre)?;
        self.project_comics(&comics)
    }

    /// Case-insensitive name substring search.
    pub fn find_authors_by_name(&self, text: &str) -> CatalogResult<Vec<AuthorProjection>> {
        let authors = self.authors.find_by_name_contains(text)?;
        self.project_authors(&authors)
    }

    pub fn find_authors_by_nationality(
        &self,
        nationality: &str,
    ) -> CatalogResult<Vec<AuthorProjection>> {
        let authors = self.authors.find_by_nationality(nationality)?;
        self.project_authors(&authors)
    }

    /// Persists a new author.
    ///
    /// # Contract
    /// - Client-supplied `id` and `comicIds` are ignored.
    pub fn create_author(&self, mut author: Author) -> CatalogResult<AuthorProjection> {
        author.validate()?;
        author.id = None;
        author.comic_ids.clear();

        let saved = self.authors.save(&author)?;
        info!(
            "event=author_create module=service status=ok author_id={}",
            saved.id.as_deref().unwrap_or_default()
        );
        self.project_author(&saved)
    }

    /// Replaces an author's scalar fields.
    ///
    /// Returns `None` when no author is stored under `id`. The stored
    /// `comicIds` are carried over untouched.
    pub fn update_author(
        &self,
        id: &str,
        mut author: Author,
    ) -> CatalogResult<Option<AuthorProjection>> {
        author.validate()?;
        let Some(existing) = self.authors.find_by_id(id)? else {
            return Ok(None);
        };

        author.id = Some(id.to_string());
        author.comic_ids = existing.comic_ids;
        let saved = self.authors.save(&author)?;
        info!("event=author_update module=service status=ok author_id={id}");
        Ok(Some(self.project_author(&saved)?))
    }

    /// Deletes an author after unsetting `authorId` on every comic that
    /// references it.
    ///
    /// A failure while unsetting aborts before the author is deleted, so no
    /// comic is left pointing at a removed author by this call.
    pub fn delete_author(&self, id: &str) -> CatalogResult<DeleteOutcome> {
        if self.authors.find_by_id(id)?.is_none() {
            debug!("event=author_delete module=service status=not_found author_id={id}");
            return Ok(DeleteOutcome::NotFound);
        }

        let referencing = self.comics.find_by_author_id(id)?;
        for comic in &referencing {
            if let Some(comic_id) = comic.id.as_deref() {
                self.comics.clear_author(comic_id)?;
            }
        }

        self.authors.delete_by_id(id)?;
        info!(
            "event=author_delete module=service status=ok author_id={id} comics_detached={}",
            referencing.len()
        );
        Ok(DeleteOutcome::Deleted)
    }

    /// Persists a new comic and records it on its author.
    ///
    /// # Contract
    /// - Client-supplied `id` is ignored; genres are de-duplicated.
    /// - The comic is kept even when its author is missing; the reference
    ///   then dangles and resolves to no author.
    /// - Returns the resolved projection of the stored comic.
    pub fn create_comic(&self, mut comic: Comic) -> CatalogResult<ComicProjection> {
        comic.validate()?;
        comic.id = None;
        comic.genres = comic.normalized_genres();

        let saved = self.comics.save(&comic)?;
        let comic_id = saved.id.clone().unwrap_or_default();
        info!("event=comic_create module=service status=ok comic_id={comic_id}");

        if let Some(author_id) = saved.author_id.as_deref() {
            self.link_comic(author_id, &comic_id);
        }

        self.project_comic(&saved)
    }

    /// Replaces a comic and moves its back-reference when the author changes.
    ///
    /// Returns `None` when no comic is stored under `id`.
    pub fn update_comic(
        &self,
        id: &str,
        mut comic: Comic,
    ) -> CatalogResult<Option<ComicProjection>> {
        comic.validate()?;
        let Some(existing) = self.comics.find_by_id(id)? else {
            return Ok(None);
        };

        comic.id = Some(id.to_string());
        comic.genres = comic.normalized_genres();
        let saved = self.comics.save(&comic)?;
        info!("event=comic_update module=service status=ok comic_id={id}");

        if let Some(previous) = existing.author_id.as_deref() {
            if saved.author_id.as_deref() != Some(previous) {
                self.unlink_comic(previous, id);
            }
        }
        if let Some(author_id) = saved.author_id.as_deref() {
            self.link_comic(author_id, id);
        }

        Ok(Some(self.project_comic(&saved)?))
    }

    /// Removes a comic and drops it from its author's `comicIds`.
    pub fn delete_comic(&self, id: &str) -> CatalogResult<DeleteOutcome> {
        let Some(comic) = self.comics.find_by_id(id)? else {
            debug!("event=comic_delete module=service status=not_found comic_id={id}");
            return Ok(DeleteOutcome::NotFound);
        };

        if let Some(author_id) = comic.author_id.as_deref() {
            self.unlink_comic(author_id, id);
        }

        self.comics.delete_by_id(id)?;
        info!("event=comic_delete module=service status=ok comic_id={id}");
        Ok(DeleteOutcome::Deleted)
    }

    fn project_comic(&self, comic: &Comic) -> CatalogResult<ComicProjection> {
        let author = match comic.author_id.as_deref() {
            Some(author_id) => self.embedded_author(comic, author_id)?,
            None => None,
        };
        Ok(ComicProjection::scalars(comic).with_author(author))
    }

    /// Projects a result page, looking each distinct author up once.
    fn project_comics(&self, comics: &[Comic]) -> CatalogResult<Vec<ComicProjection>> {
        let mut resolved: HashMap<AuthorId, Option<AuthorProjection>> = HashMap::new();
        let mut projections = Vec::with_capacity(comics.len());

        for comic in comics {
            let author = match comic.author_id.as_deref() {
                Some(author_id) => match resolved.get(author_id) {
                    Some(cached) => cached.clone(),
                    None => {
                        let author = self.embedded_author(comic, author_id)?;
                        resolved.insert(author_id.to_string(), author.clone());
                        author
                    }
                },
                None => None,
            };
            projections.push(ComicProjection::scalars(comic).with_author(author));
        }

        Ok(projections)
    }

    fn embedded_author(
        &self,
        comic: &Comic,
        author_id: &str,
    ) -> CatalogResult<Option<AuthorProjection>> {
        match self.authors.find_by_id(author_id)? {
            Some(author) => Ok(Some(AuthorProjection::scalars(&author))),
            None => {
                debug!(
                    "event=dangling_reference module=service comic_id={} author_id={author_id}",
                    comic.id.as_deref().unwrap_or_default()
                );
                Ok(None)
            }
        }
    }

    fn project_author(&self, author: &Author) -> CatalogResult<AuthorProjection> {
        let mut projection = AuthorProjection::scalars(author);
        let comics = match author.id.as_deref() {
            Some(author_id) => self.comics.find_by_author_id(author_id)?,
            None => Vec::new(),
        };
        projection.comics = Some(comics.iter().map(ComicProjection::scalars).collect());
        Ok(projection)
    }

    fn project_authors(&self, authors: &[Author]) -> CatalogResult<Vec<AuthorProjection>> {
        authors
            .iter()
            .map(|author| self.project_author(author))
            .collect()
    }

    /// Best-effort back-reference append.
    fn link_comic(&self, author_id: &str, comic_id: &str) {
        match self.authors.add_comic_ref(author_id, comic_id) {
            Ok(true) => debug!(
                "event=backref_link module=service status=ok author_id={author_id} comic_id={comic_id}"
            ),
            Ok(false) => debug!(
                "event=dangling_reference module=service comic_id={comic_id} author_id={author_id}"
            ),
            Err(err) => warn!(
                "event=backref_link module=service status=error author_id={author_id} comic_id={comic_id} error={err}"
            ),
        }
    }

    /// Best-effort back-reference removal.
    fn unlink_comic(&self, author_id: &str, comic_id: &str) {
        match self.authors.remove_comic_ref(author_id, comic_id) {
            Ok(true) => debug!(
                "event=backref_unlink module=service status=ok author_id={author_id} comic_id={comic_id}"
            ),
            Ok(false) => debug!(
                "event=dangling_reference module=service comic_id={comic_id} author_id={author_id}"
            ),
            Err(err) => warn!(
                "event=backref_unlink module=service status=error author_id={author_id} comic_id={comic_id} error={err}"
            ),
        }
    }
}
