use super::tokens::AccessTokenSource;
use crate::error::GvError;
use crate::utils::logging::{body_excerpt, with_pretty_json_debug};
use gv_schema::{ZohoActionResult, ZohoData};
use reqwest::{Method, StatusCode, header::AUTHORIZATION};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Decoded CRM response. Empty bodies (Zoho answers `204` for searches without hits) become
/// `Value::Null`.
#[derive(Debug, Clone)]
pub struct ZohoResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ZohoResponse {
    pub fn is_empty(&self) -> bool {
        self.body.is_null()
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, GvError> {
        Ok(serde_json::from_value(self.body.clone())?)
    }

    /// Error for a non-success answer, carrying Zoho's own code/message when present.
    pub fn rejection(&self, operation: &str) -> GvError {
        let top = serde_json::from_value::<ZohoActionResult>(self.body.clone())
            .ok()
            .filter(|r| r.code.is_some() || r.message.is_some());
        let nested = || {
            serde_json::from_value::<ZohoData<ZohoActionResult>>(self.body.clone())
                .ok()
                .and_then(|d| d.data.into_iter().next())
        };
        let reason = top
            .or_else(nested)
            .map(|r| r.describe())
            .unwrap_or_else(|| format!("HTTP {}", self.status.as_u16()));
        GvError::upstream_rejected(operation, reason)
    }

    /// First per-record action result of an insert/update call.
    pub fn first_action(&self, operation: &str) -> Result<ZohoActionResult, GvError> {
        if !self.is_success() {
            return Err(self.rejection(operation));
        }
        let body: ZohoData<ZohoActionResult> = self.decode()?;
        body.data
            .into_iter()
            .next()
            .ok_or_else(|| GvError::upstream_rejected(operation, "empty response"))
    }
}

/// Authenticated CRM v2 client.
#[derive(Clone)]
pub struct ZohoApiClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn AccessTokenSource>,
}

impl ZohoApiClient {
    pub fn new(http: reqwest::Client, base_url: Url, tokens: Arc<dyn AccessTokenSource>) -> Self {
        Self {
            http,
            base_url,
            tokens,
        }
    }

    /// Sends one request to `endpoint` (relative to the CRM base, e.g. `Contacts/search`).
    ///
    /// Any HTTP status is returned as data; only transport failures and unreadable error bodies
    /// become errors.
    pub async fn call<B>(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<ZohoResponse, GvError>
    where
        B: Serialize + ?Sized,
    {
        let token = self.tokens.access_token().await?;
        let url = self.base_url.join(endpoint.trim_start_matches('/'))?;

        let mut req = self
            .http
            .request(method.clone(), url)
            .header(AUTHORIZATION, token.authorization_value());
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|e| {
            warn!(method = %method, endpoint, error = %e, "[Zoho] Request failed");
            GvError::Transport(e)
        })?;
        let status = resp.status();
        let bytes = resp.bytes().await?;

        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            match serde_json::from_slice::<Value>(&bytes) {
                Ok(v) => v,
                Err(_) if !status.is_success() => {
                    warn!(
                        method = %method,
                        endpoint,
                        status = status.as_u16(),
                        body = %body_excerpt(&bytes, 200),
                        "[Zoho] Non-JSON error body"
                    );
                    return Err(GvError::UpstreamStatus(status));
                }
                Err(e) => return Err(GvError::Json(e)),
            }
        };

        debug!(
            method = %method,
            endpoint,
            status = status.as_u16(),
            "[Zoho] Response received"
        );
        if !status.is_success() {
            with_pretty_json_debug(&body, |pretty| {
                debug!(endpoint, body = %pretty, "[Zoho] Error body");
            });
        }

        Ok(ZohoResponse { status, body })
    }

    pub async fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<ZohoResponse, GvError> {
        self.call::<Value>(Method::GET, endpoint, query, None).await
    }

    pub async fn post<B>(&self, endpoint: &str, body: &B) -> Result<ZohoResponse, GvError>
    where
        B: Serialize + ?Sized,
    {
        self.call(Method::POST, endpoint, &[], Some(body)).await
    }

    pub async fn put<B>(&self, endpoint: &str, body: &B) -> Result<ZohoResponse, GvError>
    where
        B: Serialize + ?Sized,
    {
        self.call(Method::PUT, endpoint, &[], Some(body)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejection_prefers_zoho_code() {
        let resp = ZohoResponse {
            status: StatusCode::BAD_REQUEST,
            body: json!({ "code": "INVALID_QUERY", "message": "invalid criteria", "status": "error" }),
        };
        let err = resp.rejection("contact search");
        assert_eq!(
            err.to_string(),
            "Upstream rejected contact search: INVALID_QUERY: invalid criteria"
        );
    }

    #[test]
    fn rejection_reads_nested_action_result() {
        let resp = ZohoResponse {
            status: StatusCode::BAD_REQUEST,
            body: json!({ "data": [{ "code": "MANDATORY_NOT_FOUND", "status": "error" }] }),
        };
        assert!(resp.rejection("contact create").to_string().ends_with("MANDATORY_NOT_FOUND"));

        let bare = ZohoResponse {
            status: StatusCode::BAD_GATEWAY,
            body: Value::Null,
        };
        assert!(bare.rejection("event update").to_string().ends_with("HTTP 502"));
    }
}
