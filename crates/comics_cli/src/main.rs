//! CLI smoke entry point.
//!
//! # Responsibility
//! - Wire config, logging, storage and the catalog service end to end.
//! - Print catalog projections as JSON for quick local inspection.
//!
//! Usage:
//! - `comics_cli` lists every comic.
//! - `comics_cli comic <id>` / `comics_cli author <id>` resolve one document.
//! - `comics_cli genre <name>` searches comics by exact genre.
//! - `comics_cli demo` seeds one author and one comic, then lists comics.

use comics_core::db::{open_db, open_db_in_memory};
use comics_core::{
    init_logging, Author, CatalogConfig, CatalogService, Comic, SqliteDocumentStore,
    AUTHORS_COLLECTION, COMICS_COLLECTION,
};
use log::error;
use serde::Serialize;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run(std::env::args().skip(1).collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("comics_cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), Box<dyn Error>> {
    let config = CatalogConfig::from_env()?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(config.log_level, log_dir)?;
    }

    let conn = match &config.db_path {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let service = CatalogService::from_stores(
        SqliteDocumentStore::try_new(&conn, AUTHORS_COLLECTION)?,
        SqliteDocumentStore::try_new(&conn, COMICS_COLLECTION)?,
    );

    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match args.as_slice() {
        [] => print_json(&service.list_comics()?),
        ["comic", id] => print_json(&service.resolve_comic(id)?),
        ["author", id] => print_json(&service.resolve_author(id)?),
        ["genre", genre] => print_json(&service.find_comics_by_genre(genre)?),
        ["demo"] => {
            let author = service.create_author(Author::new("Alan Moore"))?;
            let mut comic = Comic::new("Watchmen", 1986);
            comic.genres = vec!["superhero".to_string(), "drama".to_string()];
            comic.author_id = Some(author.id);
            service.create_comic(comic)?;
            print_json(&service.list_comics()?)
        }
        _ => Err(format!(
            "comics_cli {}: usage: [comic <id> | author <id> | genre <name> | demo]",
            comics_core::core_version()
        )
        .into()),
    }
}

fn print_json(value: &impl Serialize) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
