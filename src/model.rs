//! The article record and the payloads that flow between routes and stores.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store-assigned identifier of an article, serialized as `_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(Uuid);

impl ArticleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for ArticleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A stored article.
///
/// `title` and `content` are optional because nothing validates writes: a
/// POST without a title stores a record without one, and a PUT overwrite
/// clears whatever its body leaves out. Absent fields are omitted when
/// serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    #[serde(rename = "_id")]
    pub id: ArticleId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Article {
    /// A fresh record holding exactly `fields`.
    pub fn from_fields(fields: ArticleFields) -> Self {
        Self {
            id: ArticleId::new(),
            title: fields.title,
            content: fields.content,
        }
    }

    /// Overwrites both fields with `fields`, absent ones included.
    /// Returns whether anything changed.
    pub fn replace_with(&mut self, fields: ArticleFields) -> bool {
        let changed = self.title != fields.title || self.content != fields.content;
        self.title = fields.title;
        self.content = fields.content;
        changed
    }

    /// Sets only the fields present in `fields`. Returns whether anything
    /// changed.
    pub fn merge(&mut self, fields: ArticleFields) -> bool {
        let mut changed = false;
        if let Some(title) = fields.title {
            changed |= self.title.as_deref() != Some(title.as_str());
            self.title = Some(title);
        }
        if let Some(content) = fields.content {
            changed |= self.content.as_deref() != Some(content.as_str());
            self.content = Some(content);
        }
        changed
    }
}

/// The writable fields of an article as decoded from a request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFields {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl ArticleFields {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
        }
    }

    pub fn content_only(content: impl Into<String>) -> Self {
        Self {
            title: None,
            content: Some(content.into()),
        }
    }
}

/// Outcome of a single-record replace or merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

impl UpdateResult {
    pub fn new(matched_count: u64, modified_count: u64) -> Self {
        Self { acknowledged: true, matched_count, modified_count }
    }
}

/// Outcome of a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteResult {
    pub fn new(deleted_count: u64) -> Self {
        Self { acknowledged: true, deleted_count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_unique_and_parse_back() {
        let id = ArticleId::default();
        assert_ne!(id, ArticleId::default());
        assert_eq!(ArticleId::parse(&id.to_string()).unwrap(), id);
        assert!(ArticleId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn absent_fields_are_not_serialized() {
        let mut article = Article::from_fields(ArticleFields::new("Cats", "Cats are great"));
        article.replace_with(ArticleFields::content_only("only content"));

        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(json["_id"], article.id.to_string());
        assert!(json.get("title").is_none());
        assert_eq!(json["content"], "only content");
    }

    #[test]
    fn merge_keeps_missing_fields() {
        let mut article = Article::from_fields(ArticleFields::new("Cats", "Cats are great"));
        assert!(article.merge(ArticleFields::content_only("Cats are the best")));
        assert_eq!(article.title.as_deref(), Some("Cats"));
        assert_eq!(article.content.as_deref(), Some("Cats are the best"));
        assert!(!article.merge(ArticleFields::default()));
    }

    #[test]
    fn replace_reports_unchanged_records() {
        let mut article = Article::from_fields(ArticleFields::new("Cats", "Cats are great"));
        assert!(!article.replace_with(ArticleFields::new("Cats", "Cats are great")));
    }

    #[test]
    fn delete_result_shape() {
        let json = serde_json::to_string(&DeleteResult::new(3)).unwrap();
        assert_eq!(json, r#"{"acknowledged":true,"deletedCount":3}"#);
    }
}
