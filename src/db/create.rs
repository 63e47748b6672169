//! Input records for `DbActor` writes and queries.

use super::models::PostType;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// New row for the append-only token log.
#[derive(Debug, Clone)]
pub struct TokenCreate {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct PostCreate {
    pub post_type: PostType,
    pub title: String,
    pub zoho_id: Option<String>,
    pub featured_image: Option<String>,
}

/// Title lookup. `fuzzy` matches substrings; otherwise the match is exact, ignoring ASCII case.
#[derive(Debug, Clone)]
pub struct PostQuery {
    pub post_type: PostType,
    pub title: String,
    pub fuzzy: bool,
}

#[derive(Debug, Clone)]
pub struct MetaKey {
    pub post_id: i64,
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct MetaWrite {
    pub post_id: i64,
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Clone, Copy)]
pub struct RelationLink {
    pub rel_id: i64,
    pub parent_id: i64,
    pub child_id: i64,
}

/// Which children an unlink removes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildSelector {
    All,
    Ids(Vec<i64>),
}

#[derive(Debug, Clone)]
pub struct RelationUnlink {
    pub rel_id: i64,
    pub parent_id: i64,
    pub children: ChildSelector,
}
