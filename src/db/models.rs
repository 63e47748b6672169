use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbOAuthToken {
    pub id: i64,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Lifetime in seconds, counted from `created_at`.
    pub expires_in: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbPost {
    pub id: i64,
    pub post_type: String,
    pub title: String,
    pub zoho_id: Option<String>,
    pub featured_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbRelation {
    pub id: i64,
    pub rel_id: i64,
    pub parent_object_id: i64,
    pub child_object_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Local content types mirrored from the CRM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Evento,
    Empresa,
    Ponente,
}

impl PostType {
    pub fn as_str(self) -> &'static str {
        match self {
            PostType::Evento => "evento",
            PostType::Empresa => "empresa",
            PostType::Ponente => "ponente",
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
