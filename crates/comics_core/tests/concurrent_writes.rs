use comics_core::db::open_db;
use comics_core::{
    Author, AuthorRepository, CatalogService, Comic, MemoryDocumentStore, SqliteDocumentStore,
    AUTHORS_COLLECTION, COMICS_COLLECTION,
};
use std::collections::HashSet;
use std::thread;

fn comic_by(title: String, author_id: &str) -> Comic {
    let mut comic = Comic::new(title, 2000);
    comic.author_id = Some(author_id.to_string());
    comic
}

#[test]
fn parallel_creates_on_memory_stores_keep_every_back_reference() {
    const WRITERS: usize = 16;
    let authors = MemoryDocumentStore::new(AUTHORS_COLLECTION);
    let comics = MemoryDocumentStore::new(COMICS_COLLECTION);
    let service = CatalogService::from_stores(&authors, &comics);
    let author = service.create_author(Author::new("Alan Moore")).unwrap();

    let created: HashSet<String> = thread::scope(|scope| {
        let handles: Vec<_> = (0..WRITERS)
            .map(|index| {
                let service = &service;
                let author_id = author.id.as_str();
                scope.spawn(move || {
                    service
                        .create_comic(comic_by(format!("Issue {index}"), author_id))
                        .unwrap()
                        .id
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    let stored = AuthorRepository::new(&authors)
        .find_by_id(&author.id)
        .unwrap()
        .unwrap();
    assert_eq!(stored.comic_ids.len(), WRITERS);
    assert_eq!(stored.comic_ids.into_iter().collect::<HashSet<_>>(), created);
}

#[test]
fn parallel_creates_on_sqlite_connections_keep_every_back_reference() {
    const WRITERS: usize = 8;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.db");

    let setup = open_db(&path).unwrap();
    let author = CatalogService::from_stores(
        SqliteDocumentStore::try_new(&setup, AUTHORS_COLLECTION).unwrap(),
        SqliteDocumentStore::try_new(&setup, COMICS_COLLECTION).unwrap(),
    )
    .create_author(Author::new("Alan Moore"))
    .unwrap();

    let connections: Vec<_> = (0..WRITERS).map(|_| open_db(&path).unwrap()).collect();
    let created: HashSet<String> = thread::scope(|scope| {
        let handles: Vec<_> = connections
            .into_iter()
            .enumerate()
            .map(|(index, conn)| {
                let author_id = author.id.as_str();
                scope.spawn(move || {
                    let service = CatalogService::from_stores(
                        SqliteDocumentStore::try_new(&conn, AUTHORS_COLLECTION).unwrap(),
                        SqliteDocumentStore::try_new(&conn, COMICS_COLLECTION).unwrap(),
                    );
                    service
                        .create_comic(comic_by(format!("Issue {index}"), author_id))
                        .unwrap()
                        .id
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    let authors = SqliteDocumentStore::try_new(&setup, AUTHORS_COLLECTION).unwrap();
    let stored = AuthorRepository::new(authors)
        .find_by_id(&author.id)
        .unwrap()
        .unwrap();
    assert_eq!(stored.comic_ids.len(), WRITERS);
    assert_eq!(stored.comic_ids.into_iter().collect::<HashSet<_>>(), created);
}
