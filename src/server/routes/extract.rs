use crate::error::GvError;
use crate::utils::logging::with_pretty_json_debug;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

/// Flat webhook mapping sent as JSON or `application/x-www-form-urlencoded`.
///
/// Form keys ending in `[]` (and repeated keys) collect into arrays. Bodies that are not a
/// non-empty mapping are rejected with `invalid payload`.
pub(crate) struct WebhookPayload<T>(pub(crate) T);

impl<S, T> FromRequest<S> for WebhookPayload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = GvError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
        let path = req.uri().path().to_string();

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|_| GvError::invalid_payload())?;

        let map = if is_form {
            form_to_map(&bytes)
        } else {
            match serde_json::from_slice::<Value>(&bytes) {
                Ok(Value::Object(map)) => map,
                _ => return Err(GvError::invalid_payload()),
            }
        };
        if map.is_empty() {
            return Err(GvError::invalid_payload());
        }

        let value = Value::Object(map);
        with_pretty_json_debug(&value, |pretty| {
            debug!(path = %path, form = is_form, body = %pretty, "Webhook payload received");
        });

        serde_json::from_value(value)
            .map(WebhookPayload)
            .map_err(|e| GvError::Validation(format!("invalid payload: {e}")))
    }
}

fn form_to_map(bytes: &[u8]) -> Map<String, Value> {
    let mut map = Map::new();
    for (key, value) in url::form_urlencoded::parse(bytes) {
        let (key, is_list) = match key.strip_suffix("[]") {
            Some(stripped) => (stripped.to_string(), true),
            None => (key.into_owned(), false),
        };
        let value = Value::String(value.into_owned());

        match map.get_mut(&key) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None if is_list => {
                map.insert(key, Value::Array(vec![value]));
            }
            None => {
                map.insert(key, value);
            }
        }
    }
    map
}
