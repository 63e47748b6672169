use crate::server::router::GvState;
use axum::{Json, Router, routing::post};
use serde::Serialize;

pub mod admin;
pub mod checkin;
pub mod extract;
pub mod oauth;
pub mod registrations;
pub mod relations;

/// `{"success": true, ...fields}` REST envelope.
#[derive(Debug, Serialize)]
pub struct Success<T> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

pub(crate) fn success<T: Serialize>(data: T) -> Json<Success<T>> {
    Json(Success {
        success: true,
        data,
    })
}

/// Key-guarded REST routes under `/gv/v1`.
pub fn api_router() -> Router<GvState> {
    Router::new()
        .route("/gv/v1/zoho-relations", post(relations::link_handler))
        .route(
            "/gv/v1/zoho-relations/unlink",
            post(relations::unlink_handler),
        )
        .route(
            "/gv/v1/relations/sql-unlink",
            post(relations::sql_unlink_handler),
        )
        .route(
            "/gv/v1/registrations",
            post(registrations::registration_handler),
        )
}
