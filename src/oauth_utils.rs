use crate::error::GvError;
use oauth2::basic::{
    BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
    BasicTokenType,
};
use oauth2::{
    AuthType, AuthUrl, Client as OAuth2Client, ClientId, ClientSecret, ExtraTokenFields,
    RedirectUrl, StandardRevocableToken, StandardTokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Extra (non-standard) fields of Zoho's token response.
///
/// Zoho reports the API host of the account's data center in `api_domain`; anything else is kept
/// via `flatten`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ZohoTokenFields {
    pub api_domain: Option<String>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl ExtraTokenFields for ZohoTokenFields {}

/// Standard OAuth2 token endpoint response extended with [`ZohoTokenFields`].
pub type OauthTokenResponse = StandardTokenResponse<ZohoTokenFields, BasicTokenType>;

/// A standard OAuth2 client configured to return [`OauthTokenResponse`].
pub(crate) type StandardOauth2Client<
    HasAuthUrl = oauth2::EndpointSet,
    HasDeviceAuthUrl = oauth2::EndpointNotSet,
    HasIntrospectionUrl = oauth2::EndpointNotSet,
    HasRevocationUrl = oauth2::EndpointNotSet,
    HasTokenUrl = oauth2::EndpointSet,
> = OAuth2Client<
    BasicErrorResponse,
    OauthTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    HasAuthUrl,
    HasDeviceAuthUrl,
    HasIntrospectionUrl,
    HasRevocationUrl,
    HasTokenUrl,
>;

/// Build an OAuth2 client for the `authorization_code` + `refresh_token` grants.
///
/// Zoho expects `client_id` / `client_secret` as form fields, not HTTP Basic auth.
pub(crate) fn build_oauth2_client(
    client_id: &str,
    client_secret: Option<&str>,
    auth_url: &str,
    token_url: &str,
    redirect_url: RedirectUrl,
) -> Result<StandardOauth2Client, GvError> {
    let mut client = OAuth2Client::<
        BasicErrorResponse,
        OauthTokenResponse,
        BasicTokenIntrospectionResponse,
        StandardRevocableToken,
        BasicRevocationErrorResponse,
    >::new(ClientId::new(client_id.to_string()))
    .set_auth_type(AuthType::RequestBody);

    if let Some(secret) = client_secret {
        client = client.set_client_secret(ClientSecret::new(secret.to_string()));
    }

    let client = client
        .set_auth_uri(AuthUrl::new(auth_url.to_string())?)
        .set_token_uri(TokenUrl::new(token_url.to_string())?)
        .set_redirect_uri(redirect_url);

    Ok(client)
}
