mod common;

use axum::http::Method;
use common::{KNOWN_CONTACT_ID, KNOWN_EMAIL, KNOWN_EVENT_ID, KNOWN_EVENT_TITLE, ZohoBehavior, ZohoDouble};
use gv_checkin::GvError;
use gv_checkin::service::Services;
use gv_schema::{ContactFields, LeadFields};

async fn services(double: &ZohoDouble, prefix: &str) -> Services {
    let base = common::spawn_zoho(double.clone()).await;
    let cfg = common::test_config(&base, common::unique_path(prefix, ""));
    let db = common::spawn_db(prefix).await;
    common::seed_token(&db, "valid-access", 0).await;
    Services::build(db, &cfg)
}

#[tokio::test]
async fn contact_search_matches_email_and_sends_zoho_auth_header() {
    let double = ZohoDouble::default();
    let svc = services(&double, "zs-search").await;

    let found = svc
        .contacts
        .search_by_email(KNOWN_EMAIL)
        .await
        .unwrap()
        .expect("contact found");
    assert_eq!(found.id, KNOWN_CONTACT_ID);

    let calls = double.requests_to(Method::GET, "/crm/v2/Contacts/search");
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].headers.get("authorization").unwrap(),
        "Zoho-oauthtoken valid-access"
    );
    assert_eq!(
        calls[0].query.get("criteria").map(String::as_str),
        Some("(Email:equals:known@example.com)")
    );
}

#[tokio::test]
async fn contact_search_without_hits_is_none() {
    let double = ZohoDouble::default();
    let svc = services(&double, "zs-miss").await;

    let found = svc
        .contacts
        .search_by_email("nobody@example.com")
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn search_failure_with_empty_body_is_not_a_miss() {
    let double = ZohoDouble::default();
    double.set_behavior(ZohoBehavior {
        search_unavailable: true,
        ..Default::default()
    });
    let svc = services(&double, "zs-down").await;

    let err = svc
        .contacts
        .search_by_email(KNOWN_EMAIL)
        .await
        .unwrap_err();
    assert!(matches!(err, GvError::UpstreamRejected { .. }), "got {err:?}");
    assert!(err.to_string().ends_with("HTTP 500"));

    let err = svc
        .events
        .search_by_title(KNOWN_EVENT_TITLE)
        .await
        .unwrap_err();
    assert!(matches!(err, GvError::UpstreamRejected { .. }), "got {err:?}");
}

#[tokio::test]
async fn contact_create_returns_record_id() {
    let double = ZohoDouble::default();
    let svc = services(&double, "zs-create").await;

    let fields = ContactFields {
        email: Some("new@example.com".to_string()),
        ..Default::default()
    }
    .with_full_name("Ana María Ruiz");
    let id = svc.contacts.create(&fields).await.unwrap();
    assert_eq!(id, "3652397000000333001");

    let body = double.requests_to(Method::POST, "/crm/v2/Contacts")[0].json();
    let record = &body["data"][0];
    assert_eq!(record["Email"], "new@example.com");
    assert_eq!(record["First_Name"], "Ana");
    assert_eq!(record["Last_Name"], "María Ruiz");
}

#[tokio::test]
async fn contact_create_requires_email_before_calling_zoho() {
    let double = ZohoDouble::default();
    let svc = services(&double, "zs-noemail").await;

    let err = svc
        .contacts
        .create(&ContactFields::default().with_full_name("Sin Correo"))
        .await
        .unwrap_err();
    assert!(matches!(err, GvError::Validation(_)), "got {err:?}");
    assert!(double.requests().is_empty());
}

#[tokio::test]
async fn contact_create_rejection_carries_zoho_code() {
    let double = ZohoDouble::default();
    double.set_behavior(ZohoBehavior {
        contact_create_fails: true,
        ..Default::default()
    });
    let svc = services(&double, "zs-reject").await;

    let fields = ContactFields {
        email: Some("new@example.com".to_string()),
        ..Default::default()
    };
    let err = svc.contacts.create(&fields).await.unwrap_err();
    assert!(matches!(err, GvError::UpstreamRejected { .. }), "got {err:?}");
    assert!(err.to_string().contains("MANDATORY_NOT_FOUND"));
}

#[tokio::test]
async fn upsert_updates_existing_contact() {
    let double = ZohoDouble::default();
    let svc = services(&double, "zs-upsert").await;

    let fields = ContactFields {
        email: Some(KNOWN_EMAIL.to_string()),
        title: Some("CTO".to_string()),
        ..Default::default()
    };
    let id = svc.contacts.upsert_by_email(&fields).await.unwrap();
    assert_eq!(id, KNOWN_CONTACT_ID);

    let path = format!("/crm/v2/Contacts/{KNOWN_CONTACT_ID}");
    assert_eq!(double.requests_to(Method::PUT, &path).len(), 1);
    assert!(double.requests_to(Method::POST, "/crm/v2/Contacts").is_empty());
}

#[tokio::test]
async fn lead_creation_posts_to_leads() {
    let double = ZohoDouble::default();
    let svc = services(&double, "zs-lead").await;

    let fields = LeadFields {
        email: Some("lead@example.com".to_string()),
        company: Some("Acme".to_string()),
        ..Default::default()
    }
    .with_full_name("Ruiz");
    let id = svc.contacts.create_lead(&fields).await.unwrap();
    assert_eq!(id, "3652397000000444001");

    let body = double.requests_to(Method::POST, "/crm/v2/Leads")[0].json();
    assert_eq!(body["data"][0]["Last_Name"], "Ruiz");
    assert_eq!(body["data"][0]["Company"], "Acme");
}

#[tokio::test]
async fn attendance_is_marked_on_the_event_participants() {
    let double = ZohoDouble::default();
    let svc = services(&double, "zs-attend").await;

    let event = svc
        .events
        .search_by_title(KNOWN_EVENT_TITLE)
        .await
        .unwrap()
        .expect("event found");
    assert_eq!(event.id, KNOWN_EVENT_ID);
    assert!(svc.events.search_by_title("Otro").await.unwrap().is_none());

    svc.events
        .mark_attendance(KNOWN_CONTACT_ID, KNOWN_EVENT_ID)
        .await
        .unwrap();

    let path = format!("/crm/v2/Events/{KNOWN_EVENT_ID}");
    let body = double.requests_to(Method::PUT, &path)[0].json();
    let participant = &body["data"][0]["Participants"][0];
    assert_eq!(participant["participant"], KNOWN_CONTACT_ID);
    assert_eq!(participant["type"], "contact");
    assert_eq!(participant["Asiste"], true);
}
