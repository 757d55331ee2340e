//! SQLite-backed document collection.
//!
//! # Responsibility
//! - Persist documents as JSON bodies in the shared `documents` table.
//! - Push exact-match predicates and targeted field updates down to SQLite
//!   JSON functions so each runs as a single statement.
//!
//! # Invariants
//! - Every statement is scoped to `collection`.
//! - Bodies never carry the `id` field; it lives in its own column.
//! - `ContainsIgnoreCase` filters in Rust, since SQLite `lower()` only folds
//!   ASCII.

use super::{
    field_matches, validate_field_name, Document, DocumentId, DocumentStore, MatchMode,
    StoreError, StoreResult, ID_FIELD,
};
use crate::db::migrations::latest_version;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, Connection, Row};
use serde_json::{Map, Value};
use uuid::Uuid;

const TOUCH_UPDATED_AT: &str = "updated_at = (strftime('%s', 'now') * 1000)";

/// One named collection over a migrated SQLite connection.
pub struct SqliteDocumentStore<'conn> {
    conn: &'conn Connection,
    collection: String,
}

impl<'conn> SqliteDocumentStore<'conn> {
    /// Constructs a collection view from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version does not match
    ///   this binary.
    pub fn try_new(conn: &'conn Connection, collection: impl Into<String>) -> StoreResult<Self> {
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(StoreError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        Ok(Self {
            conn,
            collection: collection.into(),
        })
    }

    fn exists(&self, id: &str) -> StoreResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM documents WHERE collection = ?1 AND id = ?2
            );",
            params![self.collection, id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn query_documents(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> StoreResult<Vec<Document>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut documents = Vec::new();
        while let Some(row) = rows.next()? {
            documents.push(parse_document_row(row)?);
        }
        Ok(documents)
    }
}

impl DocumentStore for SqliteDocumentStore<'_> {
    fn collection(&self) -> &str {
        &self.collection
    }

    fn find_by_id(&self, id: &str) -> StoreResult<Option<Document>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, body FROM documents
             WHERE collection = ?1 AND id = ?2;",
        )?;
        let mut rows = stmt.query(params![self.collection, id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_document_row(row)?));
        }
        Ok(None)
    }

    fn find_all(&self) -> StoreResult<Vec<Document>> {
        self.query_documents(
            "SELECT id, body FROM documents
             WHERE collection = ?1
             ORDER BY seq ASC;",
            params![self.collection],
        )
    }

    fn find_by_field(
        &self,
        field: &str,
        value: &Value,
        mode: MatchMode,
    ) -> StoreResult<Vec<Document>> {
        validate_field_name(field)?;

        match (mode, sql_scalar(value)) {
            (MatchMode::Exact, Some((bound, json_type))) => self.query_documents(
                "SELECT id, body FROM documents
                 WHERE collection = ?1
                   AND COALESCE(json_type(body, ?2), 'null') NOT IN ('object', 'null')
                   AND EXISTS (
                       SELECT 1 FROM json_each(documents.body, ?2)
                       WHERE json_each.type = ?4
                         AND json_each.value = ?3
                   )
                 ORDER BY seq ASC;",
                params![self.collection, json_path(field), bound, json_type],
            ),
            _ => Ok(self
                .find_all()?
                .into_iter()
                .filter(|document| field_matches(&document.fields, field, value, mode))
                .collect()),
        }
    }

    fn save(&self, document: Document) -> StoreResult<Document> {
        let id = document
            .id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut fields = document.fields;
        fields.remove(ID_FIELD);
        let body = serde_json::to_string(&fields)?;

        self.conn.execute(
            &format!(
                "INSERT INTO documents (collection, id, body)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (collection, id) DO UPDATE SET
                    body = excluded.body,
                    {TOUCH_UPDATED_AT};"
            ),
            params![self.collection, id, body],
        )?;

        Ok(Document::with_id(id, fields))
    }

    fn delete_by_id(&self, id: &str) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2;",
            params![self.collection, id],
        )?;
        Ok(changed > 0)
    }

    fn add_to_set(&self, id: &str, field: &str, value: &Value) -> StoreResult<bool> {
        validate_field_name(field)?;
        let (bound, json_type) = require_sql_scalar(value)?;

        let changed = self.conn.execute(
            &format!(
                "UPDATE documents
                 SET
                    body = json_set(
                        body,
                        ?3,
                        json_insert(
                            CASE WHEN json_type(body, ?3) = 'array'
                                 THEN json_extract(body, ?3)
                                 ELSE '[]' END,
                            '$[#]',
                            ?4
                        )
                    ),
                    {TOUCH_UPDATED_AT}
                 WHERE collection = ?1
                   AND id = ?2
                   AND NOT (
                       COALESCE(json_type(body, ?3) = 'array', 0)
                       AND EXISTS (
                           SELECT 1 FROM json_each(documents.body, ?3)
                           WHERE json_each.type = ?5 AND json_each.value = ?4
                       )
                   );"
            ),
            params![self.collection, id, json_path(field), bound, json_type],
        )?;

        if changed > 0 {
            return Ok(true);
        }
        self.exists(id)
    }

    fn pull(&self, id: &str, field: &str, value: &Value) -> StoreResult<bool> {
        validate_field_name(field)?;
        let (bound, json_type) = require_sql_scalar(value)?;

        let changed = self.conn.execute(
            &format!(
                "UPDATE documents
                 SET
                    body = json_set(
                        body,
                        ?3,
                        json((
                            SELECT json_group_array(json_each.value)
                            FROM json_each(documents.body, ?3)
                            WHERE NOT (json_each.type = ?5 AND json_each.value IS ?4)
                        ))
                    ),
                    {TOUCH_UPDATED_AT}
                 WHERE collection = ?1
                   AND id = ?2
                   AND json_type(body, ?3) = 'array'
                   AND EXISTS (
                       SELECT 1 FROM json_each(documents.body, ?3)
                       WHERE json_each.type = ?5 AND json_each.value = ?4
                   );"
            ),
            params![self.collection, id, json_path(field), bound, json_type],
        )?;

        if changed > 0 {
            return Ok(true);
        }
        self.exists(id)
    }

    fn unset_field(&self, id: &str, field: &str) -> StoreResult<bool> {
        validate_field_name(field)?;

        let changed = self.conn.execute(
            &format!(
                "UPDATE documents
                 SET
                    body = json_remove(body, ?3),
                    {TOUCH_UPDATED_AT}
                 WHERE collection = ?1
                   AND id = ?2
                   AND json_type(body, ?3) IS NOT NULL;"
            ),
            params![self.collection, id, json_path(field)],
        )?;

        if changed > 0 {
            return Ok(true);
        }
        self.exists(id)
    }
}

fn parse_document_row(row: &Row<'_>) -> StoreResult<Document> {
    let id: DocumentId = row.get("id")?;
    let body: String = row.get("body")?;
    let fields: Map<String, Value> = serde_json::from_str(&body).map_err(|err| {
        StoreError::InvalidDocument(format!("body of `{id}` is not a JSON object: {err}"))
    })?;
    Ok(Document::with_id(id, fields))
}

fn json_path(field: &str) -> String {
    format!("$.{field}")
}

/// Maps a JSON scalar onto the SQL value `json_each.value` yields for it.
fn sql_scalar(value: &Value) -> Option<(SqlValue, &'static str)> {
    match value {
        Value::String(text) => Some((SqlValue::Text(text.clone()), "text")),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => Some((SqlValue::Integer(integer), "integer")),
            None => number.as_f64().map(|real| (SqlValue::Real(real), "real")),
        },
        _ => None,
    }
}

fn require_sql_scalar(value: &Value) -> StoreResult<(SqlValue, &'static str)> {
    sql_scalar(value).ok_or_else(|| {
        StoreError::InvalidDocument(format!(
            "targeted updates accept string or number values, got `{value}`"
        ))
    })
}
