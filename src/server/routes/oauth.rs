use crate::error::{GvError, OauthError};
use crate::oauth_utils::OauthTokenResponse;
use crate::server::router::GvState;
use crate::zoho::ZohoOauthEndpoints;
use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use oauth2::AuthorizationCode;
use serde::Deserialize;
use serde_json::json;
use time::Duration;
use tracing::{error, info};

const CSRF_COOKIE: &str = "zoho_oauth_csrf_token";

#[derive(Debug, Deserialize)]
pub struct AuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by Zoho when the user denies consent.
    pub error: Option<String>,
}

/// GET /zoho/auth
///
/// Starts the authorization-code flow and redirects the browser to Zoho's consent page.
pub async fn zoho_oauth_entry(
    State(state): State<GvState>,
    jar: PrivateCookieJar,
) -> Result<impl IntoResponse, GvError> {
    let (auth_url, csrf_token) =
        ZohoOauthEndpoints::build_authorize_url(&state.services.zoho_cfg)?;

    let jar = jar.add(build_cookie(
        CSRF_COOKIE,
        csrf_token.secret().to_string(),
        state.insecure_cookie,
    ));

    info!("Dispatching Zoho OAuth redirect to: {}", auth_url);
    Ok((jar, Redirect::temporary(auth_url.as_ref())).into_response())
}

/// GET /zoho/oauth/callback
pub async fn zoho_oauth_callback(
    State(state): State<GvState>,
    Query(query): Query<AuthCallbackQuery>,
    jar: PrivateCookieJar,
) -> impl IntoResponse {
    let csrf = jar.get(CSRF_COOKIE).map(|c| c.value().to_string());
    let jar = jar.remove(Cookie::from(CSRF_COOKIE));

    let result = async {
        let token_response = process_oauth_exchange(&state, &query, csrf).await?;
        state.services.tokens.store_authorization(&token_response).await
    }
    .await;

    match result {
        Ok(token_id) => {
            info!(token_id, "Zoho OAuth callback accepted");
            (
                jar,
                Json(json!({ "success": true, "token_id": token_id })),
            )
                .into_response()
        }
        Err(err) => {
            error!("Zoho OAuth failure: {:?}", err);
            (jar, err.into_response()).into_response()
        }
    }
}

async fn process_oauth_exchange(
    state: &GvState,
    query: &AuthCallbackQuery,
    csrf: Option<String>,
) -> Result<OauthTokenResponse, GvError> {
    if let Some(denied) = query.error.as_deref() {
        return Err(OauthError::flow("CONSENT_DENIED", format!("Zoho authorization denied: {denied}")).into());
    }
    let csrf_token = csrf.ok_or_else(|| {
        OauthError::flow("OAUTH_SESSION_MISSING", "Missing OAuth session cookie")
    })?;
    let (Some(code), Some(state_param)) = (query.code.as_deref(), query.state.as_deref()) else {
        return Err(OauthError::flow("MISSING_CODE", "Missing code or state parameter").into());
    };

    if state_param != csrf_token {
        return Err(OauthError::flow("CSRF_MISMATCH", "CSRF token mismatch").into());
    }

    let token_response = ZohoOauthEndpoints::exchange_authorization_code(
        &state.services.zoho_cfg,
        AuthorizationCode::new(code.to_string()),
        state.services.oauth_http.clone(),
    )
    .await
    .map_err(|e| {
        OauthError::flow("TOKEN_EXCHANGE_FAILED", format!("Token exchange failed: {e}"))
    })?;

    Ok(token_response)
}

fn build_cookie(name: &'static str, value: String, insecure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(!insecure)
        .same_site(SameSite::Lax)
        .max_age(Duration::minutes(15))
        .build()
}
