//! SQL DDL for initializing the database schema.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema includes:
/// - `oauth_tokens`: append-only Zoho token log; the newest `created_at` row is current
/// - `posts`: local events / companies / speakers
/// - `post_meta`: JSON meta fragments per post (`_asistentes` lives here)
/// - `relations`: typed parent/child links between posts
pub const SQLITE_INIT: &str = r#"
-- ---------------------------------------------------------------------------
-- Zoho OAuth tokens (append-only)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS oauth_tokens (
    id INTEGER PRIMARY KEY NOT NULL,
    access_token TEXT NOT NULL,
    refresh_token TEXT NOT NULL,
    token_type TEXT NOT NULL,
    expires_in INTEGER NOT NULL, -- seconds
    created_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_oauth_tokens_created_at ON oauth_tokens(created_at);

-- ---------------------------------------------------------------------------
-- Posts (evento / empresa / ponente)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS posts (
    id INTEGER PRIMARY KEY NOT NULL,
    post_type TEXT NOT NULL,
    title TEXT NOT NULL,
    zoho_id TEXT NULL,
    featured_image TEXT NULL, -- filesystem path
    created_at TEXT NOT NULL, -- RFC3339
    UNIQUE(post_type, zoho_id)
);

CREATE INDEX IF NOT EXISTS idx_posts_type_title ON posts(post_type, title);

-- ---------------------------------------------------------------------------
-- Post meta (one row per stored fragment, value is JSON)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS post_meta (
    id INTEGER PRIMARY KEY NOT NULL,
    post_id INTEGER NOT NULL REFERENCES posts(id),
    meta_key TEXT NOT NULL,
    meta_value TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_post_meta_post_key ON post_meta(post_id, meta_key);

-- ---------------------------------------------------------------------------
-- Relations (rel_id, parent, child)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS relations (
    id INTEGER PRIMARY KEY NOT NULL,
    rel_id INTEGER NOT NULL,
    parent_object_id INTEGER NOT NULL,
    child_object_id INTEGER NOT NULL,
    created_at TEXT NOT NULL, -- RFC3339
    UNIQUE(rel_id, parent_object_id, child_object_id)
);

CREATE INDEX IF NOT EXISTS idx_relations_parent ON relations(rel_id, parent_object_id);
"#;
