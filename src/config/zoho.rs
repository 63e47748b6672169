use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Zoho data center. Each one has its own accounts and API hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ZohoRegion {
    #[default]
    Com,
    Eu,
}

impl ZohoRegion {
    pub fn tld(self) -> &'static str {
        match self {
            ZohoRegion::Com => "com",
            ZohoRegion::Eu => "eu",
        }
    }
}

/// Zoho CRM / OAuth configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ZohoConfig {
    /// Data center.
    /// TOML: `zoho.region`. Values: `com` | `eu`. Default: `com`.
    #[serde(default)]
    pub region: ZohoRegion,

    /// OAuth client id of the Zoho self-client / server-based app.
    /// TOML: `zoho.client_id`.
    #[serde(default)]
    pub client_id: String,

    /// OAuth client secret.
    /// TOML: `zoho.client_secret`.
    #[serde(default)]
    pub client_secret: String,

    /// Redirect URI registered for the app; also sent on refresh.
    /// TOML: `zoho.redirect_url`. Default: `http://localhost:8188/zoho/oauth/callback`.
    #[serde(default = "default_redirect_url")]
    pub redirect_url: Url,

    /// Scopes requested during authorization.
    /// TOML: `zoho.scopes`.
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    /// Override for the CRM API base (tests / sandboxes).
    /// TOML: `zoho.api_url`. Default: `https://www.zohoapis.{region}/crm/v2/`.
    #[serde(default)]
    pub api_url: Option<Url>,

    /// Override for the accounts server base (tests / sandboxes).
    /// TOML: `zoho.accounts_url`. Default: `https://accounts.zoho.{region}`.
    #[serde(default)]
    pub accounts_url: Option<Url>,

    /// Optional upstream HTTP proxy. If set, used for reqwest clients.
    /// TOML: `zoho.proxy`. Example: `http://127.0.0.1:1080`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Allow HTTP/2 multiplexing for reqwest clients; disabled forces HTTP/1.
    /// TOML: `zoho.enable_multiplexing`. Default: `false`.
    #[serde(default)]
    pub enable_multiplexing: bool,

    /// A token is treated as expired this many seconds before its nominal expiry.
    /// TOML: `zoho.refresh_margin_secs`. Default: `60`.
    #[serde(default = "default_refresh_margin_secs")]
    pub refresh_margin_secs: u64,

    /// Request timeout for token-endpoint calls.
    /// TOML: `zoho.token_timeout_secs`. Default: `30`.
    #[serde(default = "default_token_timeout_secs")]
    pub token_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct ZohoResolvedConfig {
    pub api_url: Url,
    pub oauth_auth_url: Url,
    pub oauth_token_url: Url,
    pub oauth_redirect_url: Url,
    pub oauth_client_id: String,
    pub oauth_client_secret: String,
    pub oauth_scopes: Vec<String>,
    pub proxy: Option<Url>,
    pub enable_multiplexing: bool,
    pub refresh_margin: Duration,
    pub token_timeout: Duration,
}

impl ZohoConfig {
    pub fn resolve(&self) -> ZohoResolvedConfig {
        let tld = self.region.tld();
        let api_url = self
            .api_url
            .clone()
            .map(with_trailing_slash)
            .unwrap_or_else(|| {
                Url::parse(&format!("https://www.zohoapis.{tld}/crm/v2/"))
                    .expect("zoho api url must be valid")
            });
        let accounts = self.accounts_url.clone().unwrap_or_else(|| {
            Url::parse(&format!("https://accounts.zoho.{tld}"))
                .expect("zoho accounts url must be valid")
        });

        ZohoResolvedConfig {
            api_url,
            oauth_auth_url: accounts
                .join("/oauth/v2/auth")
                .expect("zoho auth url must be valid"),
            oauth_token_url: accounts
                .join("/oauth/v2/token")
                .expect("zoho token url must be valid"),
            oauth_redirect_url: self.redirect_url.clone(),
            oauth_client_id: self.client_id.clone(),
            oauth_client_secret: self.client_secret.clone(),
            oauth_scopes: self.scopes.clone(),
            proxy: self.proxy.clone(),
            enable_multiplexing: self.enable_multiplexing,
            refresh_margin: Duration::from_secs(self.refresh_margin_secs),
            token_timeout: Duration::from_secs(self.token_timeout_secs.max(1)),
        }
    }
}

impl Default for ZohoConfig {
    fn default() -> Self {
        Self {
            region: ZohoRegion::default(),
            client_id: String::new(),
            client_secret: String::new(),
            redirect_url: default_redirect_url(),
            scopes: default_scopes(),
            api_url: None,
            accounts_url: None,
            proxy: None,
            enable_multiplexing: false,
            refresh_margin_secs: default_refresh_margin_secs(),
            token_timeout_secs: default_token_timeout_secs(),
        }
    }
}

/// `Url::join` drops the last path segment unless the base ends with `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn default_redirect_url() -> Url {
    Url::parse("http://localhost:8188/zoho/oauth/callback")
        .expect("default zoho redirect_url must be a valid URL")
}

fn default_scopes() -> Vec<String> {
    vec![
        "ZohoCRM.modules.contacts.ALL".to_string(),
        "ZohoCRM.modules.leads.ALL".to_string(),
        "ZohoCRM.modules.events.ALL".to_string(),
    ]
}

fn default_refresh_margin_secs() -> u64 {
    60
}

fn default_token_timeout_secs() -> u64 {
    30
}
