use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error as ThisError;

use super::oauth::OauthError;

#[derive(Debug, ThisError)]
pub enum GvError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Upstream error with status: {0}")]
    UpstreamStatus(StatusCode),

    #[error("Upstream rejected {operation}: {reason}")]
    UpstreamRejected { operation: String, reason: String },

    #[error("Credential error: {0}")]
    Credential(String),

    #[error(transparent)]
    Oauth(#[from] OauthError),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Ticket rendering error: {0}")]
    Render(String),

    #[error("Ractor error: {0}")]
    RactorError(String),

    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

impl GvError {
    pub fn invalid_payload() -> Self {
        GvError::Validation("invalid payload".to_string())
    }

    pub fn upstream_rejected(operation: &str, reason: impl Into<String>) -> Self {
        GvError::UpstreamRejected {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code used in the REST envelope.
    pub fn code(&self) -> &'static str {
        match self {
            GvError::Transport(_) | GvError::UpstreamStatus(_) | GvError::UpstreamRejected { .. } => {
                "UPSTREAM_ERROR"
            }
            GvError::Credential(_) => "CREDENTIAL_ERROR",
            GvError::Oauth(OauthError::Flow { code, .. }) => *code,
            GvError::Oauth(_) => "OAUTH_ERROR",
            GvError::Validation(_) => "VALIDATION_ERROR",
            GvError::NotFound(_) => "NOT_FOUND",
            GvError::Persistence(_)
            | GvError::RactorError(_)
            | GvError::Io(_)
            | GvError::UnexpectedError(_) => "INTERNAL_ERROR",
            GvError::Json(_) | GvError::Url(_) => "BAD_UPSTREAM_PAYLOAD",
            GvError::Render(_) => "RENDER_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GvError::Persistence(_)
            | GvError::RactorError(_)
            | GvError::Io(_)
            | GvError::Render(_)
            | GvError::UnexpectedError(_)
            | GvError::Oauth(OauthError::Other { .. }) => StatusCode::INTERNAL_SERVER_ERROR,

            GvError::Oauth(OauthError::Flow { .. }) => StatusCode::FORBIDDEN,

            GvError::Transport(_)
            | GvError::UpstreamStatus(_)
            | GvError::UpstreamRejected { .. }
            | GvError::Credential(_)
            | GvError::Oauth(_)
            | GvError::Validation(_)
            | GvError::NotFound(_)
            | GvError::Json(_)
            | GvError::Url(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn public_message(&self) -> String {
        match self {
            GvError::Validation(msg) | GvError::NotFound(msg) => msg.clone(),
            GvError::Oauth(OauthError::Flow { message, .. }) => message.clone(),
            GvError::UpstreamRejected { operation, reason } => {
                format!("Zoho CRM rejected {operation}: {reason}")
            }
            GvError::Transport(_) | GvError::UpstreamStatus(_) => {
                "Zoho CRM request failed.".to_string()
            }
            GvError::Credential(_) => "No valid Zoho credential available.".to_string(),
            GvError::Oauth(_) => "OAuth token exchange failed.".to_string(),
            GvError::Json(_) | GvError::Url(_) => "Failed to parse upstream response.".to_string(),
            GvError::Render(_) => "Ticket generation failed.".to_string(),
            GvError::Persistence(_)
            | GvError::RactorError(_)
            | GvError::Io(_)
            | GvError::UnexpectedError(_) => "An internal server error occurred.".to_string(),
        }
    }
}

impl IntoResponse for GvError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }
        let body = ErrorEnvelope {
            success: false,
            error: self.public_message(),
            code: self.code(),
        };
        (status, Json(body)).into_response()
    }
}

/// Standardized REST failure payload: `{"success": false, "error": "...", "code": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
    pub code: &'static str,
}
