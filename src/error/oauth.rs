use super::gv::GvError;
use crate::utils::logging::body_excerpt;
use oauth2::basic::BasicErrorResponseType;
use oauth2::reqwest::Error as ReqwestClientError;
use oauth2::{HttpClientError, RequestTokenError, StandardErrorResponse};
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum OauthError {
    #[error("OAuth flow error: {message}")]
    Flow { code: &'static str, message: String },

    #[error("OAuth2 request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("OAuth2 server response error: {error}")]
    ServerResponse { error: String },

    #[error("OAuth2 token endpoint parse error: {message}. Body: {body}")]
    Parse { message: String, body: String },

    #[error("OAuth2 unexpected error: {message}")]
    Other { message: String },
}

impl OauthError {
    pub fn flow(code: &'static str, message: impl Into<String>) -> Self {
        OauthError::Flow {
            code,
            message: message.into(),
        }
    }
}

type PkgsRequestTokenError = RequestTokenError<
    HttpClientError<ReqwestClientError>,
    StandardErrorResponse<BasicErrorResponseType>,
>;

impl From<PkgsRequestTokenError> for OauthError {
    fn from(e: PkgsRequestTokenError) -> Self {
        match e {
            RequestTokenError::ServerResponse(err) => OauthError::ServerResponse {
                error: err.error().to_string(),
            },
            RequestTokenError::Request(wrapper) => match wrapper {
                oauth2::HttpClientError::Reqwest(real_err) => OauthError::Request(*real_err),
                other => OauthError::Other {
                    message: format!("HttpClientError: {other:?}"),
                },
            },
            RequestTokenError::Parse(parse_err, body) => {
                // Zoho answers refresh failures with HTTP 200 and `{"error": "..."}`, which lands
                // here because `access_token` is missing.
                OauthError::Parse {
                    message: parse_err.to_string(),
                    body: body_excerpt(&body, 100),
                }
            }
            RequestTokenError::Other(s) => OauthError::Other { message: s },
        }
    }
}

impl From<PkgsRequestTokenError> for GvError {
    fn from(e: PkgsRequestTokenError) -> Self {
        OauthError::from(e).into()
    }
}
