use super::oauth::ZohoOauthEndpoints;
use crate::config::ZohoResolvedConfig;
use crate::db::{DbOAuthToken, TokenCreate};
use crate::error::GvError;
use crate::oauth_utils::OauthTokenResponse;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oauth2::TokenResponse;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Zoho omits `expires_in` on some grants; its access tokens live one hour.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Append-only token log.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Most recently inserted token, if any.
    async fn latest(&self) -> Result<Option<DbOAuthToken>, GvError>;

    async fn insert(&self, token: TokenCreate) -> Result<i64, GvError>;
}

/// Credential handed to API calls.
#[derive(Clone)]
pub struct AccessToken {
    pub secret: String,
    pub token_type: String,
}

impl AccessToken {
    /// Value for the `Authorization` header: `Zoho-oauthtoken <token>`.
    ///
    /// Zoho's token endpoint reports `Bearer`, but the CRM only accepts its own scheme.
    pub fn authorization_value(&self) -> String {
        let scheme = match self.token_type.trim() {
            "" => "Zoho",
            t if t.eq_ignore_ascii_case("bearer") => "Zoho",
            t => t,
        };
        format!("{scheme}-oauthtoken {}", self.secret)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .field("token_type", &self.token_type)
            .finish()
    }
}

impl From<&DbOAuthToken> for AccessToken {
    fn from(row: &DbOAuthToken) -> Self {
        Self {
            secret: row.access_token.clone(),
            token_type: row.token_type.clone(),
        }
    }
}

/// Anything able to produce a currently valid access token.
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn access_token(&self) -> Result<AccessToken, GvError>;
}

/// Whether `token` must be refreshed at `now`.
///
/// The token is stale once its age exceeds `expires_in - margin`.
pub fn is_stale(token: &DbOAuthToken, now: DateTime<Utc>, margin: Duration) -> bool {
    let age = now.signed_duration_since(token.created_at).num_seconds();
    let margin = i64::try_from(margin.as_secs()).unwrap_or(i64::MAX);
    age > token.expires_in.saturating_sub(margin)
}

/// Serves the latest stored token and refreshes it through the accounts server once it is stale.
///
/// Concurrent callers may each refresh; every refresh appends a row and the newest row wins.
#[derive(Clone)]
pub struct TokenManager {
    store: Arc<dyn TokenStore>,
    cfg: Arc<ZohoResolvedConfig>,
    http: reqwest::Client,
}

impl TokenManager {
    pub fn new(
        store: Arc<dyn TokenStore>,
        cfg: Arc<ZohoResolvedConfig>,
        http: reqwest::Client,
    ) -> Self {
        Self { store, cfg, http }
    }

    pub async fn get_access_token(&self) -> Result<AccessToken, GvError> {
        self.get_access_token_at(Utc::now()).await
    }

    pub async fn get_access_token_at(&self, now: DateTime<Utc>) -> Result<AccessToken, GvError> {
        let Some(current) = self.store.latest().await? else {
            return Err(GvError::Credential(
                "no Zoho token stored; authorize via /zoho/auth first".to_string(),
            ));
        };

        if !is_stale(&current, now, self.cfg.refresh_margin) {
            debug!(token_id = current.id, "[Zoho] Reusing stored access token");
            return Ok(AccessToken::from(&current));
        }

        info!(
            token_id = current.id,
            created_at = %current.created_at,
            "[Zoho] Access token stale, refreshing"
        );
        self.refresh(&current, now).await
    }

    async fn refresh(
        &self,
        current: &DbOAuthToken,
        now: DateTime<Utc>,
    ) -> Result<AccessToken, GvError> {
        let response = ZohoOauthEndpoints::refresh_access_token(
            &self.cfg,
            &current.refresh_token,
            self.http.clone(),
        )
        .await
        .map_err(|e| {
            warn!(error = %e, "[Zoho] Token refresh failed");
            GvError::Credential(format!("token refresh failed: {e}"))
        })?;

        // Zoho keeps the refresh token stable, so the stored one is carried over.
        let row = token_row(&response, current.refresh_token.clone(), now);
        let access = AccessToken {
            secret: row.access_token.clone(),
            token_type: row.token_type.clone(),
        };
        let id = self.store.insert(row).await?;
        info!(token_id = id, "[Zoho] Stored refreshed access token");
        Ok(access)
    }

    /// Persists the result of an authorization-code exchange.
    pub async fn store_authorization(&self, response: &OauthTokenResponse) -> Result<i64, GvError> {
        let refresh_token = response
            .refresh_token()
            .map(|t| t.secret().to_string())
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                GvError::Credential(
                    "authorization response carried no refresh_token (offline access denied?)"
                        .to_string(),
                )
            })?;

        if let Some(domain) = response.extra_fields().api_domain.as_deref() {
            debug!(api_domain = domain, "[Zoho] Authorization granted");
        }

        let id = self
            .store
            .insert(token_row(response, refresh_token, Utc::now()))
            .await?;
        info!(token_id = id, "[Zoho] Stored authorization token");
        Ok(id)
    }
}

#[async_trait]
impl AccessTokenSource for TokenManager {
    async fn access_token(&self) -> Result<AccessToken, GvError> {
        self.get_access_token().await
    }
}

fn token_row(
    response: &OauthTokenResponse,
    refresh_token: String,
    now: DateTime<Utc>,
) -> TokenCreate {
    let expires_in = response
        .expires_in()
        .and_then(|d| i64::try_from(d.as_secs()).ok())
        .unwrap_or(DEFAULT_EXPIRES_IN_SECS);

    TokenCreate {
        access_token: response.access_token().secret().to_string(),
        refresh_token,
        token_type: response.token_type().as_ref().to_string(),
        expires_in,
        created_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(expires_in: i64, created_at: DateTime<Utc>) -> DbOAuthToken {
        DbOAuthToken {
            id: 1,
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            token_type: "Bearer".to_string(),
            expires_in,
            created_at,
        }
    }

    #[test]
    fn staleness_respects_margin() {
        let created = Utc::now();
        let margin = Duration::from_secs(60);
        let t = token(3600, created);

        assert!(!is_stale(&t, created + chrono::Duration::seconds(3540), margin));
        assert!(is_stale(&t, created + chrono::Duration::seconds(3541), margin));
        assert!(!is_stale(&t, created + chrono::Duration::seconds(3600), Duration::ZERO));
    }

    #[test]
    fn short_lived_token_is_always_stale() {
        let created = Utc::now();
        assert!(is_stale(&token(30, created), created, Duration::from_secs(60)));
    }

    #[test]
    fn authorization_header_uses_zoho_scheme() {
        let bearer = AccessToken {
            secret: "1000.abc".to_string(),
            token_type: "Bearer".to_string(),
        };
        assert_eq!(bearer.authorization_value(), "Zoho-oauthtoken 1000.abc");

        let blank = AccessToken {
            secret: "x".to_string(),
            token_type: String::new(),
        };
        assert_eq!(blank.authorization_value(), "Zoho-oauthtoken x");
        assert!(!format!("{bearer:?}").contains("1000.abc"));
    }
}
