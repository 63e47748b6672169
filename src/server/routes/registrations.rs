use super::extract::WebhookPayload;
use super::{Success, success};
use crate::error::GvError;
use crate::server::router::GvState;
use crate::service::TicketReceipt;
use axum::{Json, extract::State};
use gv_schema::RegistrationRequest;

/// POST /gv/v1/registrations
///
/// Form-builder submission hook: renders the ticket and answers with its public path.
pub async fn registration_handler(
    State(state): State<GvState>,
    WebhookPayload(request): WebhookPayload<RegistrationRequest>,
) -> Result<Json<Success<TicketReceipt>>, GvError> {
    let receipt = state.services.tickets.generate(&request).await?;
    Ok(success(receipt))
}
