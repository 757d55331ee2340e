//! Ordered schema steps for the catalog database.
//!
//! The applied step is mirrored to `PRAGMA user_version`, so a file is
//! either at a registered version or rejected.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// (version, sql) pairs, strictly increasing.
const MIGRATIONS: &[(u32, &str)] = &[(1, include_str!("0001_documents.sql"))];

/// Returns the schema version this build writes.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |(version, _)| *version)
}

/// Brings `conn` up to `latest_version()`, one transaction per step.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }

    for &(version, sql) in MIGRATIONS.iter().filter(|(version, _)| *version > found) {
        let step = |conn: &mut Connection| -> rusqlite::Result<()> {
            let tx = conn.transaction()?;
            tx.execute_batch(sql)?;
            tx.pragma_update(None, "user_version", version)?;
            tx.commit()
        };
        step(&mut *conn).map_err(|source| DbError::Migration { version, source })?;
        info!("event=db_migrate module=db status=ok version={version}");
    }
    Ok(())
}
