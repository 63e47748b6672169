use crate::db::create::{
    ChildSelector, MetaKey, MetaWrite, PostCreate, PostQuery, RelationLink, RelationUnlink,
    TokenCreate,
};
use crate::db::meta::merge_fragments;
use crate::db::models::{DbOAuthToken, DbPost, DbRelation, PostType};
use crate::db::schema::SQLITE_INIT;
use crate::error::GvError;
use chrono::Utc;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::{str::FromStr, time::Duration};
use tracing::{debug, info};

#[derive(Debug)]
pub enum DbActorMessage {
    /// Append a token row and return its id.
    InsertToken(TokenCreate, RpcReplyPort<Result<i64, GvError>>),

    /// Most recently created token row, if any.
    LatestToken(RpcReplyPort<Result<Option<DbOAuthToken>, GvError>>),

    /// Full token history, oldest first.
    ListTokens(RpcReplyPort<Result<Vec<DbOAuthToken>, GvError>>),

    /// Insert a post and return the stored row.
    CreatePost(PostCreate, RpcReplyPort<Result<DbPost, GvError>>),

    GetPost(i64, RpcReplyPort<Result<Option<DbPost>, GvError>>),

    FindPostByZohoId(
        (PostType, String),
        RpcReplyPort<Result<Option<DbPost>, GvError>>,
    ),

    /// Title lookup; best match first.
    SearchPosts(PostQuery, RpcReplyPort<Result<Vec<DbPost>, GvError>>),

    SetPostZohoId((i64, String), RpcReplyPort<Result<(), GvError>>),

    SetPostFeaturedImage((i64, String), RpcReplyPort<Result<(), GvError>>),

    ListPosts(PostType, RpcReplyPort<Result<Vec<DbPost>, GvError>>),

    /// Merge all fragments of a key, append one record, and store the result as a single row.
    /// Returns the new list length.
    AppendMeta(MetaWrite, RpcReplyPort<Result<usize, GvError>>),

    /// Store one more raw fragment under a key.
    AddMetaFragment(MetaWrite, RpcReplyPort<Result<(), GvError>>),

    /// Merged list value of a key.
    GetMetaList(MetaKey, RpcReplyPort<Result<Vec<Value>, GvError>>),

    /// Insert a relation row; `false` when it already existed.
    Link(RelationLink, RpcReplyPort<Result<bool, GvError>>),

    /// Delete relation rows; returns the number removed.
    Unlink(RelationUnlink, RpcReplyPort<Result<u64, GvError>>),

    ListRelations((i64, i64), RpcReplyPort<Result<Vec<DbRelation>, GvError>>),
}

#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
}

impl DbActorHandle {
    pub async fn insert_token(&self, token: TokenCreate) -> Result<i64, GvError> {
        ractor::call!(self.actor, DbActorMessage::InsertToken, token)
            .map_err(|e| GvError::RactorError(format!("DbActor InsertToken RPC failed: {e}")))?
    }

    pub async fn latest_token(&self) -> Result<Option<DbOAuthToken>, GvError> {
        ractor::call!(self.actor, DbActorMessage::LatestToken)
            .map_err(|e| GvError::RactorError(format!("DbActor LatestToken RPC failed: {e}")))?
    }

    pub async fn list_tokens(&self) -> Result<Vec<DbOAuthToken>, GvError> {
        ractor::call!(self.actor, DbActorMessage::ListTokens)
            .map_err(|e| GvError::RactorError(format!("DbActor ListTokens RPC failed: {e}")))?
    }

    pub async fn create_post(&self, post: PostCreate) -> Result<DbPost, GvError> {
        ractor::call!(self.actor, DbActorMessage::CreatePost, post)
            .map_err(|e| GvError::RactorError(format!("DbActor CreatePost RPC failed: {e}")))?
    }

    pub async fn get_post(&self, id: i64) -> Result<Option<DbPost>, GvError> {
        ractor::call!(self.actor, DbActorMessage::GetPost, id)
            .map_err(|e| GvError::RactorError(format!("DbActor GetPost RPC failed: {e}")))?
    }

    pub async fn find_post_by_zoho_id(
        &self,
        post_type: PostType,
        zoho_id: &str,
    ) -> Result<Option<DbPost>, GvError> {
        ractor::call!(
            self.actor,
            DbActorMessage::FindPostByZohoId,
            (post_type, zoho_id.to_string())
        )
        .map_err(|e| GvError::RactorError(format!("DbActor FindPostByZohoId RPC failed: {e}")))?
    }

    pub async fn search_posts(&self, query: PostQuery) -> Result<Vec<DbPost>, GvError> {
        ractor::call!(self.actor, DbActorMessage::SearchPosts, query)
            .map_err(|e| GvError::RactorError(format!("DbActor SearchPosts RPC failed: {e}")))?
    }

    pub async fn set_post_zoho_id(&self, id: i64, zoho_id: &str) -> Result<(), GvError> {
        ractor::call!(
            self.actor,
            DbActorMessage::SetPostZohoId,
            (id, zoho_id.to_string())
        )
        .map_err(|e| GvError::RactorError(format!("DbActor SetPostZohoId RPC failed: {e}")))?
    }

    pub async fn set_post_featured_image(&self, id: i64, path: &str) -> Result<(), GvError> {
        ractor::call!(
            self.actor,
            DbActorMessage::SetPostFeaturedImage,
            (id, path.to_string())
        )
        .map_err(|e| GvError::RactorError(format!("DbActor SetPostFeaturedImage RPC failed: {e}")))?
    }

    pub async fn list_posts(&self, post_type: PostType) -> Result<Vec<DbPost>, GvError> {
        ractor::call!(self.actor, DbActorMessage::ListPosts, post_type)
            .map_err(|e| GvError::RactorError(format!("DbActor ListPosts RPC failed: {e}")))?
    }

    pub async fn append_meta(&self, write: MetaWrite) -> Result<usize, GvError> {
        ractor::call!(self.actor, DbActorMessage::AppendMeta, write)
            .map_err(|e| GvError::RactorError(format!("DbActor AppendMeta RPC failed: {e}")))?
    }

    pub async fn add_meta_fragment(&self, write: MetaWrite) -> Result<(), GvError> {
        ractor::call!(self.actor, DbActorMessage::AddMetaFragment, write).map_err(|e| {
            GvError::RactorError(format!("DbActor AddMetaFragment RPC failed: {e}"))
        })?
    }

    pub async fn get_meta_list(&self, key: MetaKey) -> Result<Vec<Value>, GvError> {
        ractor::call!(self.actor, DbActorMessage::GetMetaList, key)
            .map_err(|e| GvError::RactorError(format!("DbActor GetMetaList RPC failed: {e}")))?
    }

    pub async fn link(&self, link: RelationLink) -> Result<bool, GvError> {
        ractor::call!(self.actor, DbActorMessage::Link, link)
            .map_err(|e| GvError::RactorError(format!("DbActor Link RPC failed: {e}")))?
    }

    pub async fn unlink(&self, unlink: RelationUnlink) -> Result<u64, GvError> {
        ractor::call!(self.actor, DbActorMessage::Unlink, unlink)
            .map_err(|e| GvError::RactorError(format!("DbActor Unlink RPC failed: {e}")))?
    }

    pub async fn list_relations(
        &self,
        rel_id: i64,
        parent_id: i64,
    ) -> Result<Vec<DbRelation>, GvError> {
        ractor::call!(self.actor, DbActorMessage::ListRelations, (rel_id, parent_id))
            .map_err(|e| GvError::RactorError(format!("DbActor ListRelations RPC failed: {e}")))?
    }
}

struct DbActorState {
    pool: SqlitePool,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = DbActorState;
    type Arguments = String;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        database_url: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = SqliteConnectOptions::from_str(database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_schema(&pool)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!("DbActor initialized");
        Ok(DbActorState { pool })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        let pool = &state.pool;
        match message {
            DbActorMessage::InsertToken(token, reply) => {
                let _ = reply.send(insert_token(pool, token).await);
            }
            DbActorMessage::LatestToken(reply) => {
                let _ = reply.send(latest_token(pool).await);
            }
            DbActorMessage::ListTokens(reply) => {
                let _ = reply.send(list_tokens(pool).await);
            }
            DbActorMessage::CreatePost(post, reply) => {
                let _ = reply.send(create_post(pool, post).await);
            }
            DbActorMessage::GetPost(id, reply) => {
                let _ = reply.send(get_post(pool, id).await);
            }
            DbActorMessage::FindPostByZohoId((post_type, zoho_id), reply) => {
                let _ = reply.send(find_post_by_zoho_id(pool, post_type, &zoho_id).await);
            }
            DbActorMessage::SearchPosts(query, reply) => {
                let _ = reply.send(search_posts(pool, &query).await);
            }
            DbActorMessage::SetPostZohoId((id, zoho_id), reply) => {
                let _ = reply.send(set_post_zoho_id(pool, id, &zoho_id).await);
            }
            DbActorMessage::SetPostFeaturedImage((id, path), reply) => {
                let _ = reply.send(set_post_featured_image(pool, id, &path).await);
            }
            DbActorMessage::ListPosts(post_type, reply) => {
                let _ = reply.send(list_posts(pool, post_type).await);
            }
            DbActorMessage::AppendMeta(write, reply) => {
                let _ = reply.send(append_meta(pool, write).await);
            }
            DbActorMessage::AddMetaFragment(write, reply) => {
                let _ = reply.send(add_meta_fragment(pool, write).await);
            }
            DbActorMessage::GetMetaList(key, reply) => {
                let _ = reply.send(get_meta_list(pool, &key).await);
            }
            DbActorMessage::Link(link, reply) => {
                let _ = reply.send(insert_relation(pool, link).await);
            }
            DbActorMessage::Unlink(unlink, reply) => {
                let _ = reply.send(delete_relations(pool, &unlink).await);
            }
            DbActorMessage::ListRelations((rel_id, parent_id), reply) => {
                let _ = reply.send(list_relations(pool, rel_id, parent_id).await);
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

async fn insert_token(pool: &SqlitePool, token: TokenCreate) -> Result<i64, GvError> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO oauth_tokens (access_token, refresh_token, token_type, expires_in, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(token.access_token)
    .bind(token.refresh_token)
    .bind(token.token_type)
    .bind(token.expires_in)
    .bind(token.created_at)
    .fetch_one(pool)
    .await?;

    debug!(token_id = id, "Token row appended");
    Ok(id)
}

async fn latest_token(pool: &SqlitePool) -> Result<Option<DbOAuthToken>, GvError> {
    let row = sqlx::query_as::<_, DbOAuthToken>(
        r#"
        SELECT id, access_token, refresh_token, token_type, expires_in, created_at
        FROM oauth_tokens
        ORDER BY created_at DESC, id DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

async fn list_tokens(pool: &SqlitePool) -> Result<Vec<DbOAuthToken>, GvError> {
    let rows = sqlx::query_as::<_, DbOAuthToken>(
        r#"
        SELECT id, access_token, refresh_token, token_type, expires_in, created_at
        FROM oauth_tokens
        ORDER BY created_at, id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

async fn create_post(pool: &SqlitePool, post: PostCreate) -> Result<DbPost, GvError> {
    let row = sqlx::query_as::<_, DbPost>(
        r#"
        INSERT INTO posts (post_type, title, zoho_id, featured_image, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, post_type, title, zoho_id, featured_image, created_at
        "#,
    )
    .bind(post.post_type.as_str())
    .bind(post.title)
    .bind(post.zoho_id)
    .bind(post.featured_image)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    info!(post_id = row.id, post_type = %row.post_type, title = %row.title, "Post created");
    Ok(row)
}

async fn get_post(pool: &SqlitePool, id: i64) -> Result<Option<DbPost>, GvError> {
    let row = sqlx::query_as::<_, DbPost>(
        r#"
        SELECT id, post_type, title, zoho_id, featured_image, created_at
        FROM posts
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

async fn find_post_by_zoho_id(
    pool: &SqlitePool,
    post_type: PostType,
    zoho_id: &str,
) -> Result<Option<DbPost>, GvError> {
    let row = sqlx::query_as::<_, DbPost>(
        r#"
        SELECT id, post_type, title, zoho_id, featured_image, created_at
        FROM posts
        WHERE post_type = ? AND zoho_id = ?
        "#,
    )
    .bind(post_type.as_str())
    .bind(zoho_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

async fn search_posts(pool: &SqlitePool, query: &PostQuery) -> Result<Vec<DbPost>, GvError> {
    let rows = if query.fuzzy {
        // Exact (case-insensitive) matches rank first, then the shortest containing title.
        sqlx::query_as::<_, DbPost>(
            r#"
            SELECT id, post_type, title, zoho_id, featured_image, created_at
            FROM posts
            WHERE post_type = ? AND title LIKE ? ESCAPE '\'
            ORDER BY (lower(title) = lower(?)) DESC, length(title), id DESC
            "#,
        )
        .bind(query.post_type.as_str())
        .bind(format!("%{}%", escape_like(&query.title)))
        .bind(&query.title)
        .fetch_all(pool)
        .await?
    } else {
        sqlx::query_as::<_, DbPost>(
            r#"
            SELECT id, post_type, title, zoho_id, featured_image, created_at
            FROM posts
            WHERE post_type = ? AND lower(title) = lower(?)
            ORDER BY id DESC
            "#,
        )
        .bind(query.post_type.as_str())
        .bind(&query.title)
        .fetch_all(pool)
        .await?
    };

    Ok(rows)
}

async fn set_post_zoho_id(pool: &SqlitePool, id: i64, zoho_id: &str) -> Result<(), GvError> {
    let res = sqlx::query("UPDATE posts SET zoho_id = ? WHERE id = ?")
        .bind(zoho_id)
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(GvError::NotFound(format!("post {id} not found")));
    }
    Ok(())
}

async fn set_post_featured_image(pool: &SqlitePool, id: i64, path: &str) -> Result<(), GvError> {
    let res = sqlx::query("UPDATE posts SET featured_image = ? WHERE id = ?")
        .bind(path)
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(GvError::NotFound(format!("post {id} not found")));
    }
    Ok(())
}

async fn list_posts(pool: &SqlitePool, post_type: PostType) -> Result<Vec<DbPost>, GvError> {
    let rows = sqlx::query_as::<_, DbPost>(
        r#"
        SELECT id, post_type, title, zoho_id, featured_image, created_at
        FROM posts
        WHERE post_type = ?
        ORDER BY id
        "#,
    )
    .bind(post_type.as_str())
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Post meta
// ---------------------------------------------------------------------------

async fn append_meta(pool: &SqlitePool, write: MetaWrite) -> Result<usize, GvError> {
    let mut tx = pool.begin().await?;

    let fragments: Vec<String> = sqlx::query_scalar(
        "SELECT meta_value FROM post_meta WHERE post_id = ? AND meta_key = ? ORDER BY id",
    )
    .bind(write.post_id)
    .bind(&write.key)
    .fetch_all(&mut *tx)
    .await?;

    let mut list = merge_fragments(fragments);
    list.push(write.value);
    let len = list.len();
    let encoded = serde_json::to_string(&Value::Array(list))?;

    sqlx::query("DELETE FROM post_meta WHERE post_id = ? AND meta_key = ?")
        .bind(write.post_id)
        .bind(&write.key)
        .execute(&mut *tx)
        .await?;

    sqlx::query("INSERT INTO post_meta (post_id, meta_key, meta_value) VALUES (?, ?, ?)")
        .bind(write.post_id)
        .bind(&write.key)
        .bind(encoded)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    debug!(post_id = write.post_id, key = %write.key, len, "Meta list appended");
    Ok(len)
}

async fn add_meta_fragment(pool: &SqlitePool, write: MetaWrite) -> Result<(), GvError> {
    let encoded = serde_json::to_string(&write.value)?;
    sqlx::query("INSERT INTO post_meta (post_id, meta_key, meta_value) VALUES (?, ?, ?)")
        .bind(write.post_id)
        .bind(&write.key)
        .bind(encoded)
        .execute(pool)
        .await?;
    Ok(())
}

async fn get_meta_list(pool: &SqlitePool, key: &MetaKey) -> Result<Vec<Value>, GvError> {
    let fragments: Vec<String> = sqlx::query_scalar(
        "SELECT meta_value FROM post_meta WHERE post_id = ? AND meta_key = ? ORDER BY id",
    )
    .bind(key.post_id)
    .bind(&key.key)
    .fetch_all(pool)
    .await?;

    Ok(merge_fragments(fragments))
}

// ---------------------------------------------------------------------------
// Relations
// ---------------------------------------------------------------------------

async fn insert_relation(pool: &SqlitePool, link: RelationLink) -> Result<bool, GvError> {
    let res = sqlx::query(
        r#"
        INSERT OR IGNORE INTO relations (rel_id, parent_object_id, child_object_id, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(link.rel_id)
    .bind(link.parent_id)
    .bind(link.child_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(res.rows_affected() == 1)
}

async fn delete_relations(pool: &SqlitePool, unlink: &RelationUnlink) -> Result<u64, GvError> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new("DELETE FROM relations WHERE rel_id = ");
    qb.push_bind(unlink.rel_id);
    qb.push(" AND parent_object_id = ");
    qb.push_bind(unlink.parent_id);

    match &unlink.children {
        ChildSelector::All => {}
        ChildSelector::Ids(ids) if ids.is_empty() => return Ok(0),
        ChildSelector::Ids(ids) => {
            qb.push(" AND child_object_id IN (");
            let mut separated = qb.separated(", ");
            for id in ids {
                separated.push_bind(*id);
            }
            separated.push_unseparated(")");
        }
    }

    let res = qb.build().execute(pool).await?;
    Ok(res.rows_affected())
}

async fn list_relations(
    pool: &SqlitePool,
    rel_id: i64,
    parent_id: i64,
) -> Result<Vec<DbRelation>, GvError> {
    let rows = sqlx::query_as::<_, DbRelation>(
        r#"
        SELECT id, rel_id, parent_object_id, child_object_id, created_at
        FROM relations
        WHERE rel_id = ? AND parent_object_id = ?
        ORDER BY child_object_id
        "#,
    )
    .bind(rel_id)
    .bind(parent_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Spawn the database actor and return a cloneable handle.
pub async fn spawn(database_url: &str) -> DbActorHandle {
    let (actor, _jh) = ractor::Actor::spawn(None, DbActor, database_url.to_string())
        .await
        .expect("failed to spawn DbActor");

    DbActorHandle { actor }
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), GvError> {
    sqlx::raw_sql(SQLITE_INIT).execute(pool).await?;
    Ok(())
}
