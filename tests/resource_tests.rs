//! Integration tests for single resources.
//!
//! These tests run loads, metadata probes, saves and deletes against a
//! mock platform and check which requests are (and are not) sent.

use std::sync::Arc;

use passaporte_web::rest::{LoadOptions, RemoteEntity, Resource, ResourceError, ResourceKind};
use passaporte_web::{HttpClient, Notification, PassaporteWeb, Profile, ServiceAccount};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> Arc<HttpClient> {
    let app = PassaporteWeb::new(&server.uri(), "qxRSNcIdeA", "1f0AVCZPJbRndF9FNSGMOWMfH9KMUDaX")
        .unwrap();
    Arc::clone(app.client())
}

#[tokio::test]
async fn test_save_without_fields_in_probe_sends_no_write() {
    let server = MockServer::start().await;
    let url = format!("{}/profile/api/info/u-1/", server.uri());

    Mock::given(method("GET"))
        .and(path("/profile/api/info/u-1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nickname": "bob",
            "url": url
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("OPTIONS"))
        .and(path("/profile/api/info/u-1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Profile",
            "renders": ["application/json"]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut profile = Profile::load(&url, client(&server)).await.unwrap();
    profile.set("nickname", "alice");

    let error = profile.save().await.unwrap_err();
    assert!(matches!(error, ResourceError::FieldsNotLoaded { resource: "Profile" }));
    assert!(error.is_precondition_error());
}

#[tokio::test]
async fn test_save_sends_only_mutable_fields_with_dates_truncated() {
    let server = MockServer::start().await;
    let url = format!("{}/organizations/api/accounts/a-1/", server.uri());

    Mock::given(method("GET"))
        .and(path("/organizations/api/accounts/a-1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Conta Teste",
            "uuid": "a-1",
            "url": url,
            "plan_slug": "basic",
            "expiration": "2013-07-25 23:59:59",
            "roles": ["owner"]
        })))
        .mount(&server)
        .await;
    Mock::given(method("OPTIONS"))
        .and(path("/organizations/api/accounts/a-1/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Allow", "GET, PUT, OPTIONS")
                .set_body_json(json!({
                    "fields": {"plan_slug": {"type": "string"}, "expiration": {"type": "date"}}
                })),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/organizations/api/accounts/a-1/"))
        .and(body_json(json!({"plan_slug": "unittest", "expiration": "2014-01-31"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Conta Teste",
            "uuid": "a-1",
            "url": url,
            "plan_slug": "unittest",
            "expiration": "2014-01-31 00:00:00"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut account = ServiceAccount::load(&url, client(&server)).await.unwrap();
    assert_eq!(
        account.resource().fields(),
        Some(&["plan_slug".to_string(), "expiration".to_string()][..])
    );

    account.set("plan_slug", "unittest");
    account.set("expiration", "2014-01-31 10:20:30");
    account.set("name", "Not sent");

    let updated = account.save().await.unwrap();
    assert_eq!(updated.plan_slug(), Some("unittest"));
    assert!(updated.resource().meta().is_none());
}

#[tokio::test]
async fn test_delete_requires_delete_in_allow_header() {
    let server = MockServer::start().await;
    let url = format!("{}/notifications/api/n-1/", server.uri());

    Mock::given(method("GET"))
        .and(path("/notifications/api/n-1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "body": "Notification de teste",
            "url": url
        })))
        .mount(&server)
        .await;
    Mock::given(method("OPTIONS"))
        .and(path("/notifications/api/n-1/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Allow", "GET, DELETE, HEAD, OPTIONS")
                .set_body_json(json!({"name": "Notification"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/notifications/api/n-1/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let notification = Notification::load(&url, client(&server)).await.unwrap();
    notification.delete().await.unwrap();
}

#[tokio::test]
async fn test_delete_without_probe_is_rejected_locally() {
    let server = MockServer::start().await;
    let url = format!("{}/notifications/api/n-1/", server.uri());

    Mock::given(method("GET"))
        .and(path("/notifications/api/n-1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"body": "oi"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let notification = Notification::load_with(&url, client(&server), LoadOptions::read_only())
        .await
        .unwrap();
    assert_eq!(notification.url(), Some(url.as_str()));

    let error = notification.delete().await.unwrap_err();
    assert!(error.is_usage_error());
}

#[tokio::test]
async fn test_remote_errors_keep_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/api/identities/missing/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/accounts/api/identities/missing/", server.uri());
    let error = Resource::load(&url, client(&server), ResourceKind::Identity)
        .await
        .unwrap_err();

    assert!(error.is_remote());
    assert_eq!(error.status_code(), Some(404));
    assert_eq!(error.response_body(), Some(&json!({"detail": "Not found."})));
    assert_eq!(error.field_errors()["detail"], vec!["Not found."]);
}

#[tokio::test]
async fn test_rejected_save_reports_field_errors() {
    let server = MockServer::start().await;
    let url = format!("{}/profile/api/info/u-1/", server.uri());

    Mock::given(method("GET"))
        .and(path("/profile/api/info/u-1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cpf": "111"})))
        .mount(&server)
        .await;
    Mock::given(method("OPTIONS"))
        .and(path("/profile/api/info/u-1/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"fields": {"cpf": {}}})),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/profile/api/info/u-1/"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"cpf": ["Este número de CPF não é válido."]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let profile = Profile::load(&url, client(&server)).await.unwrap();
    let error = profile.save().await.unwrap_err();

    assert_eq!(error.status_code(), Some(400));
    assert_eq!(
        error.field_errors()["cpf"],
        vec!["Este número de CPF não é válido."]
    );
}
