use crate::config::Config;
use crate::server::guards::auth::RequireKeyAuth;
use crate::server::routes::oauth::{zoho_oauth_callback, zoho_oauth_entry};
use crate::server::routes::{self, admin, checkin};
use crate::service::Services;

use axum::{
    Router,
    extract::{FromRef, Request},
    http::{HeaderName, Version, header::USER_AGENT},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use axum_extra::extract::cookie::Key;
use base64::Engine as _;
use rand::RngCore;
use reqwest::header::HeaderValue;
use std::path::PathBuf;
use std::time::Instant;
use std::{sync::Arc, sync::LazyLock};
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

/// Global cookie signing/encryption key for PrivateCookieJar.
static COOKIE_KEY: LazyLock<Key> = LazyLock::new(Key::generate);

const MAX_REQUEST_ID_LEN: usize = 128;
const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

fn generate_request_id() -> String {
    // 96 bits => 16 chars base64url (no padding).
    let mut bytes = [0u8; 12];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn format_http_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2",
        Version::HTTP_3 => "HTTP/3",
        _ => "HTTP/?",
    }
}

#[derive(Clone)]
pub struct GvState {
    pub services: Services,
    pub gv_key: Arc<str>,
    pub insecure_cookie: bool,
    pub tickets_dir: PathBuf,
}

impl GvState {
    pub fn new(services: Services, cfg: &Config) -> Self {
        Self {
            services,
            gv_key: Arc::from(cfg.basic.gv_key.as_str()),
            insecure_cookie: cfg.basic.insecure_cookie,
            tickets_dir: cfg.tickets.output_dir.clone(),
        }
    }
}

impl FromRef<GvState> for Key {
    fn from_ref(state: &GvState) -> Self {
        let _ = state; // state not used to fetch the static key
        COOKIE_KEY.clone()
    }
}

/// One line per request: `| status | request-id | method | protocol | path | latency | UA |`.
///
/// Only the path is logged; check-in query strings carry attendee data.
async fn access_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let protocol = format_http_version(req.version());

    let request_id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(generate_request_id);

    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let start = Instant::now();
    let mut resp = next.run(req).await;

    // Always reflect `x-request-id`, even if the client didn't send one.
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert(X_REQUEST_ID, value);
    }

    let status = resp.status();
    let line = format!(
        "| {:>3} | {} | {:^7} | {:<8} | {} | {}ms | {}",
        status.as_u16(),
        request_id,
        method.as_str(),
        protocol,
        path,
        start.elapsed().as_millis(),
        user_agent
    );
    if status.is_server_error() {
        error!("{line}");
    } else if status.is_client_error() {
        warn!("{line}");
    } else {
        info!("{line}");
    }

    resp
}

pub fn gv_router(state: GvState) -> Router {
    let api = routes::api_router()
        .layer(middleware::from_extractor_with_state::<RequireKeyAuth, _>(
            state.clone(),
        ));

    let admin = Router::new()
        .route("/admin/asistentes", get(admin::attendees_page))
        .layer(middleware::from_extractor_with_state::<RequireKeyAuth, _>(
            state.clone(),
        ));

    let oauth = Router::new()
        .route("/zoho/auth", get(zoho_oauth_entry))
        .route("/zoho/oauth/callback", get(zoho_oauth_callback));

    Router::new()
        .merge(oauth)
        .merge(api)
        .merge(admin)
        .nest_service("/tickets", ServeDir::new(&state.tickets_dir))
        .fallback(checkin::checkin_fallback)
        .with_state(state)
        .layer(middleware::from_fn(access_log))
}
