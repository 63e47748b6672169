mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use common::ZohoDouble;
use std::collections::HashMap;
use tower::ServiceExt;
use url::Url;

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn authorization_round_trip_stores_token() {
    let double = ZohoDouble::default();
    let app = common::test_app(&double, "oauth-flow").await;

    let resp = app
        .router
        .clone()
        .oneshot(get("/zoho/auth", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);

    let location = resp.headers()[header::LOCATION].to_str().unwrap();
    let location = Url::parse(location).unwrap();
    assert_eq!(location.path(), "/oauth/v2/auth");
    let params: HashMap<String, String> = location.query_pairs().into_owned().collect();
    assert_eq!(params["access_type"], "offline");
    assert_eq!(params["client_id"], "1000.TESTCLIENT");
    let csrf_state = params["state"].clone();

    let set_cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.contains("HttpOnly"));
    let cookie = set_cookie.split(';').next().unwrap().to_string();

    let resp = app
        .router
        .oneshot(get(
            &format!("/zoho/oauth/callback?code=grant-123&state={csrf_state}"),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = common::body_json(resp).await;
    assert_eq!(body["success"], true);

    let latest = app.db.latest_token().await.unwrap().unwrap();
    assert_eq!(body["token_id"], latest.id);
    assert_eq!(latest.access_token, "access-from-code");
    assert_eq!(latest.refresh_token, "refresh-from-code");

    let exchange = double.requests_to(Method::POST, "/oauth/v2/token");
    assert_eq!(exchange[0].form()["code"], "grant-123");
}

#[tokio::test]
async fn callback_without_session_or_with_bad_state_is_forbidden() {
    let double = ZohoDouble::default();
    let app = common::test_app(&double, "oauth-reject").await;

    let resp = app
        .router
        .clone()
        .oneshot(get("/zoho/oauth/callback?code=x&state=y", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(common::body_json(resp).await["code"], "OAUTH_SESSION_MISSING");

    let resp = app
        .router
        .clone()
        .oneshot(get("/zoho/auth", None))
        .await
        .unwrap();
    let cookie = resp.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let resp = app
        .router
        .clone()
        .oneshot(get("/zoho/oauth/callback?code=x&state=forged", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(common::body_json(resp).await["code"], "CSRF_MISMATCH");

    let resp = app
        .router
        .oneshot(get("/zoho/oauth/callback?error=access_denied", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(common::body_json(resp).await["code"], "CONSENT_DENIED");

    assert!(double.requests_to(Method::POST, "/oauth/v2/token").is_empty());
    assert_eq!(app.db.list_tokens().await.unwrap().len(), 1, "only the seeded token");
}
