//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `create.rs`: inputs for writes and lookups
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `actor.rs`: the single actor that owns the pool

pub mod actor;
pub mod create;
pub mod models;
pub mod schema;

mod meta;
mod token_store;

pub use actor::{DbActorHandle, spawn};
pub use create::{
    ChildSelector, MetaKey, MetaWrite, PostCreate, PostQuery, RelationLink, RelationUnlink,
    TokenCreate,
};
pub use models::{DbOAuthToken, DbPost, DbRelation, PostType};
pub use schema::SQLITE_INIT;
