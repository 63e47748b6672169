//! Shared fixtures: temp SQLite paths, an in-process Zoho double and config builders.
#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use gv_checkin::config::Config;
use gv_checkin::db::{DbActorHandle, TokenCreate};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::net::TcpListener;
use url::Url;

pub const TEST_KEY: &str = "test-gv-key";
pub const KNOWN_EMAIL: &str = "known@example.com";
pub const KNOWN_CONTACT_ID: &str = "3652397000000111001";
pub const KNOWN_EVENT_TITLE: &str = "Foro Fintech";
pub const KNOWN_EVENT_ID: &str = "3652397000000222001";

pub fn unique_path(prefix: &str, ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    std::env::temp_dir().join(format!(
        "gv-{prefix}-{}-{nanos}{ext}",
        std::process::id()
    ))
}

pub fn sqlite_url(prefix: &str) -> String {
    format!("sqlite:{}", unique_path(prefix, ".sqlite").display())
}

pub async fn spawn_db(prefix: &str) -> DbActorHandle {
    gv_checkin::db::spawn(&sqlite_url(prefix)).await
}

pub async fn seed_token(db: &DbActorHandle, access_token: &str, age_secs: i64) -> i64 {
    db.insert_token(TokenCreate {
        access_token: access_token.to_string(),
        refresh_token: "refresh-1".to_string(),
        token_type: "bearer".to_string(),
        expires_in: 3600,
        created_at: Utc::now() - chrono::Duration::seconds(age_secs),
    })
    .await
    .expect("seed token")
}

#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Captured {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("captured body is JSON")
    }

    pub fn form(&self) -> HashMap<String, String> {
        url::form_urlencoded::parse(&self.body).into_owned().collect()
    }
}

/// Behaviour switches for the Zoho double.
#[derive(Debug, Clone, Default)]
pub struct ZohoBehavior {
    /// Token endpoint answers `{"error": "invalid_code"}` with HTTP 200.
    pub refresh_fails: bool,
    /// Contact creation answers with a field error.
    pub contact_create_fails: bool,
    /// Search endpoints answer HTTP 500 with an empty body.
    pub search_unavailable: bool,
}

#[derive(Clone, Default)]
pub struct ZohoDouble {
    pub reqs: Arc<Mutex<Vec<Captured>>>,
    pub behavior: Arc<Mutex<ZohoBehavior>>,
}

impl ZohoDouble {
    pub fn requests(&self) -> Vec<Captured> {
        self.reqs.lock().unwrap().clone()
    }

    pub fn requests_to(&self, method: Method, path: &str) -> Vec<Captured> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    pub fn set_behavior(&self, behavior: ZohoBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }
}

fn action(code: &str, id: &str) -> Value {
    json!({
        "data": [{
            "code": code,
            "status": if code == "SUCCESS" { "success" } else { "error" },
            "message": if code == "SUCCESS" { "record saved" } else { "invalid data" },
            "details": { "id": id }
        }]
    })
}

async fn zoho_handler(
    State(double): State<ZohoDouble>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let query: HashMap<String, String> = uri
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();
    let path = uri.path().to_string();
    double.reqs.lock().unwrap().push(Captured {
        method: method.clone(),
        path: path.clone(),
        query: query.clone(),
        headers,
        body: body.to_vec(),
    });
    let behavior = double.behavior.lock().unwrap().clone();
    let criteria = query.get("criteria").cloned().unwrap_or_default();

    if behavior.search_unavailable && path.ends_with("/search") {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    match (method, path.as_str()) {
        (Method::POST, "/oauth/v2/token") => {
            let form: HashMap<String, String> =
                url::form_urlencoded::parse(&body).into_owned().collect();
            if behavior.refresh_fails {
                return Json(json!({ "error": "invalid_code" })).into_response();
            }
            match form.get("grant_type").map(String::as_str) {
                Some("refresh_token") => Json(json!({
                    "access_token": "access-from-refresh",
                    "token_type": "Bearer",
                    "expires_in": 3600,
                    "api_domain": "https://www.zohoapis.com"
                }))
                .into_response(),
                Some("authorization_code") => Json(json!({
                    "access_token": "access-from-code",
                    "refresh_token": "refresh-from-code",
                    "token_type": "Bearer",
                    "expires_in": 3600,
                    "api_domain": "https://www.zohoapis.com"
                }))
                .into_response(),
                _ => (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "unsupported_grant_type" })),
                )
                    .into_response(),
            }
        }
        (Method::GET, "/crm/v2/Contacts/search") => {
            if criteria == format!("(Email:equals:{KNOWN_EMAIL})") {
                Json(json!({
                    "data": [
                        { "id": "3652397000000999999", "Email": "other@example.com" },
                        { "id": KNOWN_CONTACT_ID, "Email": KNOWN_EMAIL, "Last_Name": "Known" }
                    ],
                    "info": { "count": 2, "more_records": false }
                }))
                .into_response()
            } else {
                StatusCode::NO_CONTENT.into_response()
            }
        }
        (Method::POST, "/crm/v2/Contacts") => {
            if behavior.contact_create_fails {
                (
                    StatusCode::BAD_REQUEST,
                    Json(action("MANDATORY_NOT_FOUND", "")),
                )
                    .into_response()
            } else {
                (
                    StatusCode::CREATED,
                    Json(action("SUCCESS", "3652397000000333001")),
                )
                    .into_response()
            }
        }
        (Method::PUT, p) if p.starts_with("/crm/v2/Contacts/") => {
            let id = p.trim_start_matches("/crm/v2/Contacts/");
            Json(action("SUCCESS", id)).into_response()
        }
        (Method::POST, "/crm/v2/Leads") => (
            StatusCode::CREATED,
            Json(action("SUCCESS", "3652397000000444001")),
        )
            .into_response(),
        (Method::GET, "/crm/v2/Events/search") => {
            if criteria == format!("(Event_Title:equals:{KNOWN_EVENT_TITLE})") {
                Json(json!({
                    "data": [{ "id": KNOWN_EVENT_ID, "Event_Title": KNOWN_EVENT_TITLE }]
                }))
                .into_response()
            } else {
                StatusCode::NO_CONTENT.into_response()
            }
        }
        (Method::PUT, p) if p.starts_with("/crm/v2/Events/") => {
            let id = p.trim_start_matches("/crm/v2/Events/");
            Json(action("SUCCESS", id)).into_response()
        }
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "code": "INVALID_URL_PATTERN", "status": "error" })),
        )
            .into_response(),
    }
}

/// Serves the Zoho double on `127.0.0.1:0`; returns its base URL.
pub async fn spawn_zoho(double: ZohoDouble) -> Url {
    let app = Router::new().fallback(zoho_handler).with_state(double);
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let base = Url::parse(&format!("http://{addr}")).expect("valid base url");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    base
}

/// Config pointing every Zoho URL at `zoho_base`.
pub fn test_config(zoho_base: &Url, tickets_dir: PathBuf) -> Config {
    let mut cfg = Config::default();
    cfg.basic.gv_key = TEST_KEY.to_string();
    cfg.zoho.client_id = "1000.TESTCLIENT".to_string();
    cfg.zoho.client_secret = "test-secret".to_string();
    cfg.zoho.api_url = Some(zoho_base.join("/crm/v2/").expect("api url"));
    cfg.zoho.accounts_url = Some(zoho_base.clone());
    cfg.tickets.output_dir = tickets_dir;
    cfg
}

pub struct TestApp {
    pub router: Router,
    pub db: DbActorHandle,
    pub tickets_dir: PathBuf,
}

/// Full router wired against a fresh database (holding a valid token) and the Zoho double.
pub async fn test_app(double: &ZohoDouble, prefix: &str) -> TestApp {
    let base = spawn_zoho(double.clone()).await;
    let tickets_dir = unique_path(prefix, "-tickets");
    let cfg = test_config(&base, tickets_dir.clone());
    let db = spawn_db(prefix).await;
    seed_token(&db, "valid-access", 0).await;

    let services = gv_checkin::service::Services::build(db.clone(), &cfg);
    let router = gv_checkin::server::gv_router(gv_checkin::server::GvState::new(services, &cfg));
    TestApp {
        router,
        db,
        tickets_dir,
    }
}

pub async fn body_json(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("JSON body")
}

pub async fn body_text(resp: Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("UTF-8 body")
}
