use crate::config::ZohoResolvedConfig;
use crate::error::{GvError, OauthError};
use crate::oauth_utils::{OauthTokenResponse, StandardOauth2Client, build_oauth2_client};
use oauth2::{AuthorizationCode, CsrfToken, RedirectUrl, RefreshToken};
use tracing::info;

/// Zoho accounts-server calls, parameterized by the resolved config.
///
/// The client is rebuilt per call because endpoints depend on the configured data center.
pub struct ZohoOauthEndpoints;

impl ZohoOauthEndpoints {
    fn client(cfg: &ZohoResolvedConfig) -> Result<StandardOauth2Client, GvError> {
        let secret = cfg.oauth_client_secret.trim();
        build_oauth2_client(
            &cfg.oauth_client_id,
            (!secret.is_empty()).then_some(secret),
            cfg.oauth_auth_url.as_str(),
            cfg.oauth_token_url.as_str(),
            RedirectUrl::from_url(cfg.oauth_redirect_url.clone()),
        )
    }

    /// Consent URL. `access_type=offline` plus `prompt=consent` makes Zoho issue a refresh token
    /// even for a client that was authorized before.
    pub fn build_authorize_url(cfg: &ZohoResolvedConfig) -> Result<(url::Url, CsrfToken), GvError> {
        let client = Self::client(cfg)?;
        let mut req = client
            .authorize_url(CsrfToken::new_random)
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent");

        // Zoho separates scopes with commas rather than spaces.
        if !cfg.oauth_scopes.is_empty() {
            req = req.add_extra_param("scope", cfg.oauth_scopes.join(","));
        }

        Ok(req.url())
    }

    pub async fn exchange_authorization_code(
        cfg: &ZohoResolvedConfig,
        code: AuthorizationCode,
        http_client: reqwest::Client,
    ) -> Result<OauthTokenResponse, OauthError> {
        let client = Self::client(cfg).map_err(|e| OauthError::Other {
            message: e.to_string(),
        })?;
        let token_result: OauthTokenResponse = client
            .exchange_code(code)
            .request_async(&http_client)
            .await?;
        info!("Zoho OAuth2 code exchange completed successfully");
        Ok(token_result)
    }

    pub async fn refresh_access_token(
        cfg: &ZohoResolvedConfig,
        refresh_token: &str,
        http_client: reqwest::Client,
    ) -> Result<OauthTokenResponse, OauthError> {
        let client = Self::client(cfg).map_err(|e| OauthError::Other {
            message: e.to_string(),
        })?;
        let token_result: OauthTokenResponse = client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .add_extra_param("redirect_uri", cfg.oauth_redirect_url.as_str())
            .request_async(&http_client)
            .await?;
        Ok(token_result)
    }
}
