use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::net::{IpAddr, Ipv4Addr};
use url::Url;

/// Basic (core) configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BasicConfig {
    /// HTTP server listen address (e.g., "0.0.0.0", "127.0.0.1").
    /// TOML: `basic.listen_addr`. Default: `0.0.0.0`.
    #[serde(default = "default_listen_ip")]
    pub listen_addr: IpAddr,

    /// HTTP server listen port.
    /// TOML: `basic.listen_port`. Default: `8188`.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Database URL for SQLite.
    /// TOML: `basic.database_url`. Default: `sqlite://data.db`.
    #[serde(default)]
    pub database_url: String,

    /// Log level for tracing subscriber initialization (e.g., "error", "warn", "info", "debug", "trace").
    /// TOML: `basic.loglevel`. Default: `info`.
    #[serde(default)]
    pub loglevel: String,

    /// Key required on `/gv/v1/*` and `/admin/*` (required, non-empty).
    /// TOML: `basic.gv_key`. Must be provided.
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_string_lax")]
    pub gv_key: String,

    /// Public origin of this service; check-in URLs embedded in tickets are built from it.
    /// TOML: `basic.public_base_url`. Default: `http://localhost:8188`.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: Url,

    /// Drop the `Secure` attribute from OAuth cookies (plain-HTTP local setups only).
    /// TOML: `basic.insecure_cookie`. Default: `false`.
    #[serde(default)]
    pub insecure_cookie: bool,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_ip(),
            listen_port: default_listen_port(),
            database_url: "sqlite://data.db".to_string(),
            loglevel: "info".to_string(),
            // No insecure default. `Config::from_toml()` enforces non-empty.
            gv_key: String::new(),
            public_base_url: default_public_base_url(),
            insecure_cookie: false,
        }
    }
}

fn deserialize_string_lax<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;

    match v {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(serde::de::Error::custom(
            "expected a string or a number for basic.gv_key",
        )),
    }
}

/// Default IP address for the HTTP server listen address.
fn default_listen_ip() -> IpAddr {
    Ipv4Addr::new(0, 0, 0, 0).into()
}

/// Default port for the HTTP server.
fn default_listen_port() -> u16 {
    8188
}

fn default_public_base_url() -> Url {
    Url::parse("http://localhost:8188").expect("default public_base_url must be a valid URL")
}
