//! Comic/Author catalog core.
//!
//! Two schema-less document collections, `Authors` and `Comics`, joined by
//! the catalog service as if related by a foreign key.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod projection;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{CatalogConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::author::{Author, AuthorId};
pub use model::comic::{Comic, ComicId};
pub use model::ModelValidationError;
pub use projection::{AuthorProjection, ComicProjection};
pub use repo::author_repo::{AuthorRepository, AUTHORS_COLLECTION};
pub use repo::comic_repo::{ComicRepository, COMICS_COLLECTION};
pub use repo::{RepoError, RepoResult};
pub use service::catalog_service::{
    CatalogResult, CatalogService, CatalogServiceError, DeleteOutcome,
};
pub use store::{
    Document, DocumentId, DocumentStore, MatchMode, MemoryDocumentStore, SqliteDocumentStore,
    StoreError, StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
