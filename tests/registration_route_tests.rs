mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use common::{TEST_KEY, ZohoDouble};
use gv_checkin::db::{MetaKey, PostCreate, PostType};
use gv_checkin::service::ATTENDEES_META_KEY;
use serde_json::{Value, json};
use tower::ServiceExt;

fn register(body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/gv/v1/registrations")
        .header("x-gv-key", TEST_KEY)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn registration_writes_ticket_files_records_attendee_and_creates_lead() {
    let double = ZohoDouble::default();
    let app = common::test_app(&double, "reg-full").await;
    let event = app
        .db
        .create_post(PostCreate {
            post_type: PostType::Evento,
            title: "Foro Fintech".to_string(),
            zoho_id: None,
            featured_image: None,
        })
        .await
        .unwrap();

    let resp = app
        .router
        .clone()
        .oneshot(register(json!({
            "nombre": "José Núñez",
            "empresa": "Acme",
            "cargo": "CTO",
            "email": "jose@example.com",
            "evento_id": event.id.to_string()
        })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = common::body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["event_id"], event.id);
    assert_eq!(body["lead_id"], "3652397000000444001");

    let ticket = body["ticket"].as_str().unwrap();
    assert!(ticket.starts_with("jose-nunez-"), "slug folds accents: {ticket}");
    assert!(ticket.ends_with(".pdf"));
    assert_eq!(body["url"], format!("/tickets/{ticket}"));

    let pdf = std::fs::read(app.tickets_dir.join(ticket)).expect("pdf written");
    assert!(pdf.starts_with(b"%PDF-"));
    let png = std::fs::read(app.tickets_dir.join(body["qr"].as_str().unwrap())).expect("png");
    assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));

    let list = app
        .db
        .get_meta_list(MetaKey {
            post_id: event.id,
            key: ATTENDEES_META_KEY.to_string(),
        })
        .await
        .unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["name"], "José Núñez");

    let lead = double.requests_to(Method::POST, "/crm/v2/Leads")[0].json();
    assert_eq!(lead["data"][0]["First_Name"], "José");
    assert_eq!(lead["data"][0]["Last_Name"], "Núñez");
    assert_eq!(lead["data"][0]["Lead_Source"], "Registro evento");

    // The generated PDF is served back from the tickets directory.
    let served = Request::builder()
        .uri(format!("/tickets/{ticket}"))
        .body(Body::empty())
        .unwrap();
    let resp = app.router.oneshot(served).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn event_image_from_link_payload_becomes_ticket_banner() {
    let double = ZohoDouble::default();
    let app = common::test_app(&double, "reg-banner").await;
    let banner_path = common::unique_path("reg-banner", ".png");
    image::RgbImage::from_pixel(120, 40, image::Rgb([200, 30, 30]))
        .save(&banner_path)
        .expect("write banner");

    let link = Request::builder()
        .method(Method::POST)
        .uri("/gv/v1/zoho-relations")
        .header("x-gv-key", TEST_KEY)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "evento_nombre": "Foro Fintech",
                "evento_imagen": banner_path.display().to_string(),
                "ponente_nombre": "Ana Ruiz"
            })
            .to_string(),
        ))
        .unwrap();
    let resp = app.router.clone().oneshot(link).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let event_id = common::body_json(resp).await["parent_id"].as_i64().unwrap();

    let event = app.db.get_post(event_id).await.unwrap().expect("event post");
    assert_eq!(
        event.featured_image.as_deref(),
        Some(banner_path.display().to_string().as_str())
    );

    let resp = app
        .router
        .oneshot(register(json!({ "nombre": "Ana", "evento_id": event_id })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = common::body_json(resp).await;
    let pdf = std::fs::read(app.tickets_dir.join(body["ticket"].as_str().unwrap())).unwrap();

    let doc = lopdf::Document::load_mem(&pdf).expect("valid pdf");
    let xobjects = doc
        .objects
        .values()
        .filter_map(|o| o.as_dict().ok())
        .find_map(|d| d.get(b"XObject").and_then(lopdf::Object::as_dict).ok())
        .expect("xobject resources");
    assert!(xobjects.has(b"Banner"));
}

#[tokio::test]
async fn registration_without_event_or_email_still_issues_ticket() {
    let double = ZohoDouble::default();
    let app = common::test_app(&double, "reg-bare").await;

    let resp = app
        .router
        .oneshot(register(json!({ "name": "Luis" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = common::body_json(resp).await;
    assert!(body.get("event_id").is_none());
    assert!(body.get("lead_id").is_none());
    assert!(app.tickets_dir.join(body["ticket"].as_str().unwrap()).is_file());
    assert!(double.requests().is_empty());
}

#[tokio::test]
async fn registration_requires_a_name() {
    let app = common::test_app(&ZohoDouble::default(), "reg-noname").await;

    let resp = app
        .router
        .oneshot(register(json!({ "nombre": "<b></b>", "email": "a@example.com" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(resp).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(!app.tickets_dir.exists());
}
