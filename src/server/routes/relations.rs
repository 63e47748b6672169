use super::extract::WebhookPayload;
use super::{Success, success};
use crate::error::GvError;
use crate::server::router::GvState;
use crate::service::{LinkOutcome, UnlinkOutcome};
use axum::{Json, extract::State};
use gv_schema::{RelationLinkPayload, SqlUnlinkPayload};

/// POST /gv/v1/zoho-relations
pub async fn link_handler(
    State(state): State<GvState>,
    WebhookPayload(payload): WebhookPayload<RelationLinkPayload>,
) -> Result<Json<Success<LinkOutcome>>, GvError> {
    let outcome = state.services.relations.link(&payload).await?;
    Ok(success(outcome))
}

/// POST /gv/v1/zoho-relations/unlink
pub async fn unlink_handler(
    State(state): State<GvState>,
    WebhookPayload(payload): WebhookPayload<RelationLinkPayload>,
) -> Result<Json<Success<UnlinkOutcome>>, GvError> {
    let outcome = state.services.relations.unlink(&payload).await?;
    Ok(success(outcome))
}

/// POST /gv/v1/relations/sql-unlink
pub async fn sql_unlink_handler(
    State(state): State<GvState>,
    WebhookPayload(payload): WebhookPayload<SqlUnlinkPayload>,
) -> Result<Json<Success<UnlinkOutcome>>, GvError> {
    let outcome = state.services.relations.sql_unlink(&payload).await?;
    Ok(success(outcome))
}
