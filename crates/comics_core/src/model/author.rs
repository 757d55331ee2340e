//! Author document.

use super::{null_as_default, ModelValidationError};
use crate::model::comic::ComicId;
use serde::{Deserialize, Serialize};

/// Store-assigned author identifier.
pub type AuthorId = String;

/// Author record in the `Authors` collection.
///
/// Scalar text fields are opaque; only `name` is required.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AuthorId>,
    pub name: String,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub biography: Option<String>,
    /// Back-reference cache maintained by the catalog service only.
    #[serde(default, deserialize_with = "null_as_default")]
    pub comic_ids: Vec<ComicId>,
}

impl Author {
    /// Creates an unsaved author with only `name` set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.name.trim().is_empty() {
            return Err(ModelValidationError::BlankField("name"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Author;
    use crate::model::ModelValidationError;
    use serde_json::json;

    #[test]
    fn blank_name_is_rejected() {
        let author = Author::new("   ");
        assert_eq!(
            author.validate(),
            Err(ModelValidationError::BlankField("name"))
        );
    }

    #[test]
    fn missing_optional_fields_deserialize_as_empty() {
        let author: Author = serde_json::from_value(json!({"name": "Alan Moore"})).unwrap();
        assert_eq!(author.id, None);
        assert_eq!(author.surname, None);
        assert!(author.comic_ids.is_empty());
    }

    #[test]
    fn null_comic_ids_deserialize_as_empty() {
        let author: Author =
            serde_json::from_value(json!({"name": "Alan Moore", "comicIds": null})).unwrap();
        assert!(author.comic_ids.is_empty());
    }

    #[test]
    fn serializes_with_camel_case_names() {
        let mut author = Author::new("Alan");
        author.birth_date = Some("1953-11-18".to_string());
        let value = serde_json::to_value(&author).unwrap();
        assert_eq!(value["birthDate"], json!("1953-11-18"));
        assert_eq!(value["comicIds"], json!([]));
        assert!(value.get("id").is_none());
    }
}
