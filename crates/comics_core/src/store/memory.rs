//! In-memory document collection.
//!
//! Backs tests and local runs. An availability switch lets callers exercise
//! store-unavailable paths without a real outage.

use super::{
    field_matches, validate_field_name, Document, DocumentId, DocumentStore, MatchMode,
    StoreError, StoreResult, ID_FIELD,
};
use serde_json::{Map, Value};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

#[derive(Debug, Default)]
struct MemoryState {
    /// Insertion-ordered; replacing a body keeps its slot.
    documents: Vec<(DocumentId, Map<String, Value>)>,
    unavailable: bool,
}

impl MemoryState {
    fn position(&self, id: &str) -> Option<usize> {
        self.documents.iter().position(|(doc_id, _)| doc_id == id)
    }

    fn body_mut(&mut self, id: &str) -> Option<&mut Map<String, Value>> {
        self.documents
            .iter_mut()
            .find(|(doc_id, _)| doc_id == id)
            .map(|(_, body)| body)
    }
}

/// `RwLock`-guarded collection held in process memory.
#[derive(Debug)]
pub struct MemoryDocumentStore {
    collection: String,
    state: RwLock<MemoryState>,
}

impl MemoryDocumentStore {
    /// Creates a new empty collection.
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            state: RwLock::new(MemoryState::default()),
        }
    }

    /// Creates a collection with initial documents, keeping their ids.
    ///
    /// Documents without an id get a generated one.
    pub fn with_documents(collection: impl Into<String>, documents: Vec<Document>) -> Self {
        let documents = documents
            .into_iter()
            .map(|document| {
                let id = document
                    .id
                    .unwrap_or_else(|| Uuid::new_v4().to_string());
                let mut fields = document.fields;
                fields.remove(ID_FIELD);
                (id, fields)
            })
            .collect();

        Self {
            collection: collection.into(),
            state: RwLock::new(MemoryState {
                documents,
                unavailable: false,
            }),
        }
    }

    /// Toggles simulated availability. While unavailable every call fails
    /// with `StoreError::Unavailable`.
    pub fn set_available(&self, available: bool) {
        match self.state.write() {
            Ok(mut state) => state.unavailable = !available,
            Err(poisoned) => poisoned.into_inner().unavailable = !available,
        }
    }

    /// Number of stored documents, ignoring availability.
    pub fn len(&self) -> usize {
        match self.state.read() {
            Ok(state) => state.documents.len(),
            Err(poisoned) => poisoned.into_inner().documents.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, MemoryState>> {
        let state = self
            .state
            .read()
            .map_err(|_| StoreError::Unavailable(format!("`{}` lock poisoned", self.collection)))?;
        if state.unavailable {
            return Err(self.unavailable());
        }
        Ok(state)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, MemoryState>> {
        let state = self
            .state
            .write()
            .map_err(|_| StoreError::Unavailable(format!("`{}` lock poisoned", self.collection)))?;
        if state.unavailable {
            return Err(self.unavailable());
        }
        Ok(state)
    }

    fn unavailable(&self) -> StoreError {
        StoreError::Unavailable(format!("collection `{}` is offline", self.collection))
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn collection(&self) -> &str {
        &self.collection
    }

    fn find_by_id(&self, id: &str) -> StoreResult<Option<Document>> {
        let state = self.read()?;
        Ok(state
            .documents
            .iter()
            .find(|(doc_id, _)| doc_id == id)
            .map(|(doc_id, body)| Document::with_id(doc_id.clone(), body.clone())))
    }

    fn find_all(&self) -> StoreResult<Vec<Document>> {
        let state = self.read()?;
        Ok(state
            .documents
            .iter()
            .map(|(doc_id, body)| Document::with_id(doc_id.clone(), body.clone()))
            .collect())
    }

    fn find_by_field(
        &self,
        field: &str,
        value: &Value,
        mode: MatchMode,
    ) -> StoreResult<Vec<Document>> {
        validate_field_name(field)?;
        let state = self.read()?;
        Ok(state
            .documents
            .iter()
            .filter(|(_, body)| field_matches(body, field, value, mode))
            .map(|(doc_id, body)| Document::with_id(doc_id.clone(), body.clone()))
            .collect())
    }

    fn save(&self, document: Document) -> StoreResult<Document> {
        let mut state = self.write()?;
        let id = document
            .id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut fields = document.fields;
        fields.remove(ID_FIELD);

        match state.position(&id) {
            Some(index) => state.documents[index].1 = fields.clone(),
            None => state.documents.push((id.clone(), fields.clone())),
        }

        Ok(Document::with_id(id, fields))
    }

    fn delete_by_id(&self, id: &str) -> StoreResult<bool> {
        let mut state = self.write()?;
        match state.position(id) {
            Some(index) => {
                state.documents.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn add_to_set(&self, id: &str, field: &str, value: &Value) -> StoreResult<bool> {
        validate_field_name(field)?;
        let mut state = self.write()?;
        let Some(body) = state.body_mut(id) else {
            return Ok(false);
        };

        match body.get_mut(field) {
            Some(Value::Array(items)) => {
                if !items.contains(value) {
                    items.push(value.clone());
                }
            }
            _ => {
                body.insert(field.to_string(), Value::Array(vec![value.clone()]));
            }
        }
        Ok(true)
    }

    fn pull(&self, id: &str, field: &str, value: &Value) -> StoreResult<bool> {
        validate_field_name(field)?;
        let mut state = self.write()?;
        let Some(body) = state.body_mut(id) else {
            return Ok(false);
        };

        if let Some(Value::Array(items)) = body.get_mut(field) {
            items.retain(|item| item != value);
        }
        Ok(true)
    }

    fn unset_field(&self, id: &str, field: &str) -> StoreResult<bool> {
        validate_field_name(field)?;
        let mut state = self.write()?;
        let Some(body) = state.body_mut(id) else {
            return Ok(false);
        };

        body.remove(field);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryDocumentStore;
    use crate::store::{Document, DocumentStore, MatchMode, StoreError};
    use serde_json::{json, Map, Value};

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(fields) => fields,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn save_assigns_id_and_replace_keeps_order() {
        let store = MemoryDocumentStore::new("Comics");
        let first = store.save(Document::new(fields(json!({"title": "a"})))).unwrap();
        let second = store.save(Document::new(fields(json!({"title": "b"})))).unwrap();
        let first_id = first.id.clone().unwrap();

        store
            .save(Document::with_id(first_id.clone(), fields(json!({"title": "a2"}))))
            .unwrap();

        let all = store.find_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id.as_deref(), Some(first_id.as_str()));
        assert_eq!(all[0].get("title"), Some(&json!("a2")));
        assert_eq!(all[1].id, second.id);
    }

    #[test]
    fn add_to_set_is_idempotent_and_pull_removes() {
        let store = MemoryDocumentStore::with_documents(
            "Authors",
            vec![Document::with_id("a1", fields(json!({"name": "Alan"})))],
        );

        assert!(store.add_to_set("a1", "comicIds", &json!("c1")).unwrap());
        assert!(store.add_to_set("a1", "comicIds", &json!("c1")).unwrap());
        assert!(store.add_to_set("a1", "comicIds", &json!("c2")).unwrap());
        let author = store.find_by_id("a1").unwrap().unwrap();
        assert_eq!(author.get("comicIds"), Some(&json!(["c1", "c2"])));

        assert!(store.pull("a1", "comicIds", &json!("c1")).unwrap());
        let author = store.find_by_id("a1").unwrap().unwrap();
        assert_eq!(author.get("comicIds"), Some(&json!(["c2"])));

        assert!(!store.add_to_set("missing", "comicIds", &json!("c1")).unwrap());
    }

    #[test]
    fn unavailable_store_fails_every_call() {
        let store = MemoryDocumentStore::new("Comics");
        store.set_available(false);

        let err = store.find_all().unwrap_err();
        assert!(err.is_unavailable());
        assert!(matches!(
            store.find_by_field("genres", &json!("scifi"), MatchMode::Exact),
            Err(StoreError::Unavailable(_))
        ));

        store.set_available(true);
        assert!(store.find_all().unwrap().is_empty());
    }
}
