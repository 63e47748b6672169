mod basic;
mod tickets;
mod zoho;

pub use basic::BasicConfig;
pub use tickets::{QrContent, TicketsConfig};
pub use zoho::{ZohoConfig, ZohoRegion, ZohoResolvedConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration managed by Figment.
///
/// Built once in `main` and handed to constructors by reference; there is no global instance.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Zoho OAuth and CRM settings (see `zoho` table in config.toml).
    #[serde(default)]
    pub zoho: ZohoConfig,

    /// Ticket rendering settings (see `tickets` table in config.toml).
    #[serde(default)]
    pub tickets: TicketsConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";

impl Config {
    /// Builds a Figment that merges defaults, a config TOML file and `GV_*` environment variables.
    ///
    /// Nested keys use a double underscore: `GV_ZOHO__CLIENT_SECRET` -> `zoho.client_secret`.
    pub fn figment() -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        let figment = if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment.merge(Toml::file(DEFAULT_CONFIG_FILE))
        } else {
            figment
        };
        figment.merge(Env::prefixed("GV_").split("__"))
    }

    /// Loads configuration and validates required fields.
    pub fn from_toml() -> Self {
        let cfg: Self = Self::figment().extract().unwrap_or_else(|err| {
            panic!(
                "failed to extract configuration from {}: {err}",
                DEFAULT_CONFIG_FILE
            )
        });
        if cfg.basic.gv_key.trim().is_empty() {
            panic!("basic.gv_key must be set and non-empty");
        }
        if cfg.zoho.client_id.trim().is_empty() || cfg.zoho.client_secret.trim().is_empty() {
            panic!("zoho.client_id and zoho.client_secret must be set");
        }
        cfg
    }

    pub fn zoho(&self) -> ZohoResolvedConfig {
        self.zoho.resolve()
    }
}
