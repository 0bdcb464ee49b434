#![allow(clippy::unwrap_used)]
// Integration tests for `PangolinClient` using wiremock.

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use roll_pangolin_api::{
    Error, NewResource, NewTarget, PangolinClient, RemoteId, TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, PangolinClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/api/v1/", server.uri())).unwrap();
    let client = PangolinClient::with_client(reqwest::Client::new(), base_url, "acme".into())
        .unwrap();
    (server, client)
}

async fn setup_with_session() -> (MockServer, PangolinClient) {
    let (server, mut client) = setup().await;
    client
        .use_session(&SecretString::from("p_session=tok123".to_string()))
        .unwrap();
    (server, client)
}

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "data": data,
        "success": true,
        "error": false,
        "message": "ok",
        "status": 200
    }))
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_stores_session_cookie() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_json(json!({ "email": "ops@example.com", "password": "hunter2" })))
        .respond_with(
            ok(json!(null)).insert_header("set-cookie", "p_session=abc; Path=/; HttpOnly"),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/org/acme/domains"))
        .and(header("cookie", "p_session=abc"))
        .respond_with(ok(json!({ "domains": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let secret = SecretString::from("hunter2".to_string());
    client.login("ops@example.com", &secret).await.unwrap();
    assert!(client.has_session());

    let domains = client.list_domains().await.unwrap();
    assert!(domains.is_empty());
}

#[tokio::test]
async fn test_login_rejected() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "data": null,
            "success": false,
            "error": true,
            "message": "Username or password is incorrect",
            "status": 401
        })))
        .mount(&server)
        .await;

    let secret = SecretString::from("wrong".to_string());
    let result = client.login("ops@example.com", &secret).await;

    match result {
        Err(Error::Authentication { ref message }) => {
            assert!(message.contains("incorrect"), "unexpected message: {message}");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
    assert!(!client.has_session());
}

#[tokio::test]
async fn test_login_requiring_second_factor() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ok(json!({ "codeRequested": true })))
        .mount(&server)
        .await;

    let secret = SecretString::from("hunter2".to_string());
    let result = client.login("ops@example.com", &secret).await;

    assert!(
        matches!(result, Err(Error::TwoFactorRequired)),
        "expected TwoFactorRequired, got: {result:?}"
    );
}

#[tokio::test]
async fn test_login_without_cookie_fails() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ok(json!(null)))
        .mount(&server)
        .await;

    let secret = SecretString::from("hunter2".to_string());
    let result = client.login("ops@example.com", &secret).await;

    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

// ── Listing tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_list_resources() {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/api/v1/", server.uri())).unwrap();

    // Built through the transport config so the default CSRF header is set.
    let transport = TransportConfig::default();
    let mut client = PangolinClient::new(base_url, "acme".into(), &transport).unwrap();
    client
        .use_session(&SecretString::from("p_session=tok123".to_string()))
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/org/acme/resources"))
        .and(header("x-csrf-token", "x-csrf-protection"))
        .and(header("cookie", "p_session=tok123"))
        .respond_with(ok(json!({
            "resources": [
                { "resourceId": 11, "name": "app", "fullDomain": "app.example.com", "siteId": 2 },
                { "resourceId": 12, "name": "raw", "fullDomain": null }
            ],
            "pagination": { "total": 2 }
        })))
        .mount(&server)
        .await;

    let resources = client.list_resources().await.unwrap();

    assert_eq!(resources.len(), 2);
    assert_eq!(resources[0].resource_id, RemoteId::Number(11));
    assert_eq!(resources[0].full_domain.as_deref(), Some("app.example.com"));
    assert_eq!(resources[1].full_domain, None);
}

#[tokio::test]
async fn test_list_domains() {
    let (server, client) = setup_with_session().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/org/acme/domains"))
        .respond_with(ok(json!({
            "domains": [
                { "domainId": "dom_abc", "baseDomain": "example.com" },
                { "domainId": "dom_def", "baseDomain": "example.org" }
            ]
        })))
        .mount(&server)
        .await;

    let domains = client.list_domains().await.unwrap();

    assert_eq!(domains.len(), 2);
    assert_eq!(domains[0].domain_id, RemoteId::from("dom_abc"));
    assert_eq!(domains[1].base_domain, "example.org");
}

#[tokio::test]
async fn test_get_site_encodes_name() {
    let (server, client) = setup_with_session().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/org/acme/site/home%20lab"))
        .respond_with(ok(json!({ "siteId": 4, "niceId": "home-lab", "name": "home lab" })))
        .mount(&server)
        .await;

    let site = client.get_site("home lab").await.unwrap();
    assert_eq!(site.site_id, RemoteId::Number(4));
}

#[tokio::test]
async fn test_get_site_not_found() {
    let (server, client) = setup_with_session().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/org/acme/site/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "data": null,
            "success": false,
            "error": true,
            "message": "Site with niceId missing not found",
            "status": 404
        })))
        .mount(&server)
        .await;

    let err = client.get_site("missing").await.unwrap_err();
    assert!(err.is_not_found(), "expected not-found, got: {err:?}");
    assert!(err.to_string().contains("not found"));
}

// ── Mutation tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_create_resource_and_target() {
    let (server, client) = setup_with_session().await;

    let resource = NewResource {
        name: "svc".into(),
        subdomain: Some("app.sub".into()),
        http: true,
        protocol: "tcp".into(),
        domain_id: Some(RemoteId::from("dom_abc")),
        site_id: Some(RemoteId::Number(7)),
    };

    Mock::given(method("PUT"))
        .and(path("/api/v1/org/acme/site/7/resource/"))
        .and(header("cookie", "p_session=tok123"))
        .and(body_json(json!({
            "name": "svc",
            "subdomain": "app.sub",
            "http": true,
            "protocol": "tcp",
            "domainId": "dom_abc",
            "siteId": 7
        })))
        .respond_with(ok(json!({ "resourceId": 42, "fullDomain": "app.sub.example.com" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/resource/42/target"))
        .and(body_json(json!({
            "ip": "10.0.0.5",
            "port": 8080,
            "method": "tcp",
            "enabled": true
        })))
        .respond_with(ok(json!({ "targetId": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let site = RemoteId::Number(7);
    let created = client.create_resource(Some(&site), &resource).await.unwrap();
    assert_eq!(created.resource_id, RemoteId::Number(42));

    let target = NewTarget {
        ip: "10.0.0.5".into(),
        port: 8080,
        method: "tcp".into(),
        enabled: true,
    };
    client.set_target(&created.resource_id, &target).await.unwrap();
}

#[tokio::test]
async fn test_create_resource_with_unresolved_site() {
    let (server, client) = setup_with_session().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/org/acme/site/null/resource/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "data": null,
            "success": false,
            "error": true,
            "message": "Invalid site id",
            "status": 400
        })))
        .mount(&server)
        .await;

    let resource = NewResource {
        name: "svc".into(),
        subdomain: None,
        http: true,
        protocol: "tcp".into(),
        domain_id: None,
        site_id: None,
    };

    let err = client.create_resource(None, &resource).await.unwrap_err();
    match err {
        Error::Api { status, ref message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid site id");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_create_resource_without_id_is_an_error() {
    let (server, client) = setup_with_session().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/org/acme/site/7/resource/"))
        .respond_with(ok(json!(null)))
        .mount(&server)
        .await;

    let resource = NewResource {
        name: "svc".into(),
        subdomain: None,
        http: true,
        protocol: "tcp".into(),
        domain_id: None,
        site_id: Some(RemoteId::Number(7)),
    };

    let result = client
        .create_resource(Some(&RemoteId::Number(7)), &resource)
        .await;
    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_access_control_calls() {
    let (server, client) = setup_with_session().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/resource/42/password"))
        .and(body_json(json!({ "password": "s3cret" })))
        .respond_with(ok(json!(null)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/resource/42/pincode"))
        .and(body_json(json!({ "pincode": "123456" })))
        .respond_with(ok(json!(null)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/resource/42"))
        .and(body_json(json!({ "sso": false })))
        .respond_with(ok(json!({ "resourceId": 42, "sso": false })))
        .expect(1)
        .mount(&server)
        .await;

    let id = RemoteId::Number(42);
    client
        .set_password(&id, &SecretString::from("s3cret".to_string()))
        .await
        .unwrap();
    client
        .set_pincode(&id, &SecretString::from("123456".to_string()))
        .await
        .unwrap();
    client.disable_sso(&id).await.unwrap();
}

#[tokio::test]
async fn test_delete_resource() {
    let (server, client) = setup_with_session().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/resource/11"))
        .respond_with(ok(json!(null)))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_resource(&RemoteId::Number(11)).await.unwrap();
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_session_expired() {
    let (server, client) = setup_with_session().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let result = client.list_resources().await;

    match result {
        Err(Error::Authentication { ref message }) => {
            assert_eq!(message, "Unauthorized");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_unsuccessful_envelope() {
    let (server, client) = setup_with_session().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/org/acme/resources"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "success": false,
            "error": true,
            "message": "Organization not found",
            "status": 200
        })))
        .mount(&server)
        .await;

    let result = client.list_resources().await;

    match result {
        Err(Error::Api { ref message, .. }) => {
            assert!(message.contains("Organization"), "got: {message}");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body() {
    let (server, client) = setup_with_session().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/org/acme/domains"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let result = client.list_domains().await;
    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}
