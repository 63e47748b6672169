//! Zoho CRM integration: OAuth endpoints, token lifecycle and the typed module services.

pub mod client;
pub mod contacts;
pub mod events;
pub mod oauth;
pub mod tokens;

pub use client::{ZohoApiClient, ZohoResponse};
pub use contacts::ContactService;
pub use events::EventService;
pub use oauth::ZohoOauthEndpoints;
pub use tokens::{AccessToken, AccessTokenSource, TokenManager, TokenStore, is_stale};

/// Builds an `equals` search criterion, escaping the characters Zoho treats as syntax.
pub(crate) fn equals_criteria(field: &str, value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '(' | ')' | ',') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    format!("({field}:equals:{escaped})")
}
