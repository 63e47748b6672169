mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use common::{KNOWN_CONTACT_ID, KNOWN_EMAIL, TEST_KEY, ZohoDouble};
use gv_checkin::db::{PostType, RelationLink};
use serde_json::{Value, json};
use tower::ServiceExt;

fn json_post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("x-gv-key", TEST_KEY)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn api_requires_key() {
    let app = common::test_app(&ZohoDouble::default(), "rr-auth").await;

    let missing = Request::builder()
        .method(Method::POST)
        .uri("/gv/v1/zoho-relations")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let resp = app.router.clone().oneshot(missing).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let wrong = Request::builder()
        .method(Method::POST)
        .uri("/gv/v1/zoho-relations")
        .header(header::AUTHORIZATION, "Bearer not-the-key")
        .body(Body::from("{}"))
        .unwrap();
    let resp = app.router.oneshot(wrong).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn empty_or_non_object_body_is_invalid_payload() {
    let app = common::test_app(&ZohoDouble::default(), "rr-invalid").await;

    for body in [json!({}), json!([1, 2]), json!("text")] {
        let resp = app
            .router
            .clone()
            .oneshot(json_post("/gv/v1/zoho-relations", body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = common::body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn link_creates_posts_syncs_contact_and_is_idempotent() {
    let double = ZohoDouble::default();
    let app = common::test_app(&double, "rr-link").await;
    let payload = json!({
        "evento_id": "z-evt-1",
        "evento_nombre": "Foro Fintech",
        "ponente_id": "z-pon-1",
        "ponente_nombre": "Ana Ruiz",
        "ponente_email": KNOWN_EMAIL,
        "ponente_cargo": "CTO"
    });

    let resp = app
        .router
        .clone()
        .oneshot(json_post("/gv/v1/zoho-relations", payload.clone()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = common::body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["relation"], "evento_ponente");
    assert_eq!(body["rel_id"], 1);
    assert_eq!(body["created"], true);
    assert_eq!(body["contact_synced"], true);
    assert_eq!(body["contact_id"], KNOWN_CONTACT_ID);

    let event = app
        .db
        .find_post_by_zoho_id(PostType::Evento, "z-evt-1")
        .await
        .unwrap()
        .expect("event post created");
    assert_eq!(event.title, "Foro Fintech");
    let speaker = app
        .db
        .find_post_by_zoho_id(PostType::Ponente, "z-pon-1")
        .await
        .unwrap()
        .expect("speaker post created");
    let links = app.db.list_relations(1, event.id).await.unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].child_object_id, speaker.id);

    let update_path = format!("/crm/v2/Contacts/{KNOWN_CONTACT_ID}");
    let update = double.requests_to(Method::PUT, &update_path);
    assert_eq!(update.len(), 1);
    assert_eq!(update[0].json()["data"][0]["Title"], "CTO");

    let resp = app
        .router
        .oneshot(json_post("/gv/v1/zoho-relations", payload))
        .await
        .unwrap();
    let body = common::body_json(resp).await;
    assert_eq!(body["created"], false);
    assert_eq!(app.db.list_relations(1, event.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn link_accepts_form_encoded_company_payload() {
    let app = common::test_app(&ZohoDouble::default(), "rr-form").await;

    let req = Request::builder()
        .method(Method::POST)
        .uri(format!("/gv/v1/zoho-relations?key={TEST_KEY}"))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("empresa_nombre=Acme&ponente_nombre=Luis+Gil"))
        .unwrap();
    let resp = app.router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = common::body_json(resp).await;
    assert_eq!(body["relation"], "empresa_ponente");
    assert_eq!(body["rel_id"], 2);
    assert_eq!(body["contact_synced"], false);
}

#[tokio::test]
async fn link_without_speaker_is_rejected() {
    let app = common::test_app(&ZohoDouble::default(), "rr-nospeaker").await;

    let resp = app
        .router
        .oneshot(json_post(
            "/gv/v1/zoho-relations",
            json!({ "evento_nombre": "Foro" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(app.db.list_posts(PostType::Evento).await.unwrap().is_empty());
}

#[tokio::test]
async fn unlink_removes_only_the_named_speaker() {
    let app = common::test_app(&ZohoDouble::default(), "rr-unlink").await;
    for speaker in ["Ana Ruiz", "Luis Gil"] {
        let resp = app
            .router
            .clone()
            .oneshot(json_post(
                "/gv/v1/zoho-relations",
                json!({ "evento_nombre": "Foro", "ponente_nombre": speaker }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = app
        .router
        .clone()
        .oneshot(json_post(
            "/gv/v1/zoho-relations/unlink",
            json!({ "evento_nombre": "Foro", "ponente_nombre": "Ana Ruiz" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = common::body_json(resp).await;
    assert_eq!(body["removed"], 1);

    let event_id = body["parent_id"].as_i64().unwrap();
    assert_eq!(app.db.list_relations(1, event_id).await.unwrap().len(), 1);

    let resp = app
        .router
        .oneshot(json_post(
            "/gv/v1/zoho-relations/unlink",
            json!({ "evento_nombre": "Foro", "ponente_nombre": "Nadie" }),
        ))
        .await
        .unwrap();
    let body = common::body_json(resp).await;
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn sql_unlink_by_ids_and_all_children() {
    let app = common::test_app(&ZohoDouble::default(), "rr-sql").await;
    for child_id in [100, 101, 102] {
        app.db
            .link(RelationLink {
                rel_id: 2,
                parent_id: 7,
                child_id,
            })
            .await
            .unwrap();
    }

    let resp = app
        .router
        .clone()
        .oneshot(json_post(
            "/gv/v1/relations/sql-unlink",
            json!({ "rel_id": "empresa_ponente", "parent_id": "7", "child_ids": "100,101" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(common::body_json(resp).await["removed"], 2);

    let resp = app
        .router
        .clone()
        .oneshot(json_post(
            "/gv/v1/relations/sql-unlink",
            json!({ "rel_id": 2, "parent_id": 7 }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "selector required");

    let resp = app
        .router
        .oneshot(json_post(
            "/gv/v1/relations/sql-unlink",
            json!({ "rel_id": 2, "parent_id": 7, "all_children": true }),
        ))
        .await
        .unwrap();
    assert_eq!(common::body_json(resp).await["removed"], 1);
    assert!(app.db.list_relations(2, 7).await.unwrap().is_empty());
}
