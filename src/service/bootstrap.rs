use super::attendees::AttendeeLog;
use super::checkin::CheckinHandler;
use super::posts::PostDirectory;
use super::relations::RelationOrchestrator;
use super::tickets::TicketGenerator;
use crate::config::{Config, ZohoResolvedConfig};
use crate::db::DbActorHandle;
use crate::zoho::{ContactService, EventService, TokenManager, ZohoApiClient};
use reqwest::header::{CONNECTION, HeaderMap, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub const GV_USER_AGENT: &str = concat!("gv-checkin/", env!("CARGO_PKG_VERSION"));

/// Every service the HTTP layer talks to, wired once at startup.
#[derive(Clone)]
pub struct Services {
    pub zoho_cfg: Arc<ZohoResolvedConfig>,
    /// Client for the accounts server (token exchange), with a request timeout.
    pub oauth_http: reqwest::Client,
    pub tokens: TokenManager,
    pub contacts: ContactService,
    pub events: EventService,
    pub posts: PostDirectory,
    pub attendees: AttendeeLog,
    pub relations: RelationOrchestrator,
    pub tickets: TicketGenerator,
    pub checkin: CheckinHandler,
}

impl Services {
    pub fn build(db: DbActorHandle, cfg: &Config) -> Self {
        let zoho_cfg = Arc::new(cfg.zoho());

        // Log resolved config here so `main` stays wiring-only.
        info!(
            zoho_api_url = %zoho_cfg.api_url,
            zoho_token_url = %zoho_cfg.oauth_token_url,
            zoho_redirect_url = %zoho_cfg.oauth_redirect_url,
            zoho_proxy = %zoho_cfg.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
            zoho_enable_multiplexing = zoho_cfg.enable_multiplexing,
            zoho_refresh_margin_secs = zoho_cfg.refresh_margin.as_secs(),
            "Zoho config (effective)"
        );
        info!(
            tickets_output_dir = %cfg.tickets.output_dir.display(),
            tickets_qr_content = ?cfg.tickets.qr_content,
            tickets_create_leads = cfg.tickets.create_leads,
            "Tickets config (effective)"
        );

        let api_http = build_client(zoho_cfg.proxy.clone(), zoho_cfg.enable_multiplexing, None);
        let oauth_http = build_client(
            zoho_cfg.proxy.clone(),
            zoho_cfg.enable_multiplexing,
            Some(zoho_cfg.token_timeout),
        );

        let tokens = TokenManager::new(Arc::new(db.clone()), zoho_cfg.clone(), oauth_http.clone());
        let api = ZohoApiClient::new(api_http, zoho_cfg.api_url.clone(), Arc::new(tokens.clone()));
        let contacts = ContactService::new(api.clone());
        let events = EventService::new(api);

        let posts = PostDirectory::new(db.clone());
        let attendees = AttendeeLog::new(db.clone());
        let relations = RelationOrchestrator::new(posts.clone(), contacts.clone(), db);
        let tickets = TicketGenerator::new(
            cfg.tickets.clone(),
            cfg.basic.public_base_url.clone(),
            posts.clone(),
            attendees.clone(),
            contacts.clone(),
        );
        let checkin = CheckinHandler::new(
            posts.clone(),
            attendees.clone(),
            contacts.clone(),
            events.clone(),
        );

        Self {
            zoho_cfg,
            oauth_http,
            tokens,
            contacts,
            events,
            posts,
            attendees,
            relations,
            tickets,
            checkin,
        }
    }
}

/// Builds a reqwest client. Only token-endpoint clients get a request timeout.
fn build_client(
    proxy: Option<url::Url>,
    enable_multiplexing: bool,
    request_timeout: Option<Duration>,
) -> reqwest::Client {
    let mut headers = HeaderMap::new();

    let mut builder = reqwest::Client::builder()
        .user_agent(GV_USER_AGENT)
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(Duration::from_secs(10));

    if let Some(timeout) = request_timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(proxy_url) = proxy {
        let proxy = reqwest::Proxy::all(proxy_url.as_str())
            .expect("invalid proxy url for reqwest client");
        builder = builder.proxy(proxy);
    }

    if !enable_multiplexing {
        headers.insert(CONNECTION, HeaderValue::from_static("close"));

        builder = builder
            .http1_only()
            .pool_max_idle_per_host(0)
            .pool_idle_timeout(Duration::from_secs(0));
    } else {
        builder = builder.http2_adaptive_window(true);
    }

    builder
        .default_headers(headers)
        .build()
        .expect("failed to build reqwest client")
}
