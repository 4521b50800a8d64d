/// Integration tests for the Launchpad API
///
/// These tests drive the full router end-to-end against a real PostgreSQL:
/// - Registration and login
/// - The application lifecycle (submit, fetch own, update)
/// - Ownership and editability guards
/// - Public stats
///
/// These tests require a running PostgreSQL database.
/// Run with: cargo test --test integration_test -- --test-threads=1

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::TestContext;
use serde_json::json;
use tower::Service as _;

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::response_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_register_and_login_roundtrip() {
    let ctx = TestContext::new().await.unwrap();

    let email = format!("register-{}@example.com", uuid::Uuid::new_v4());
    let register = common::json_request(
        "POST",
        "/v1/auth/register",
        None,
        &json!({
            "email": email,
            "password": "SecureP4ssword",
            "name": "New Founder"
        }),
    );

    let response = ctx.app.clone().call(register).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::response_json(response).await;
    assert!(body["access_token"].is_string());
    assert!(body["refresh_token"].is_string());

    // Registered credentials log in
    let login = common::json_request(
        "POST",
        "/v1/auth/login",
        None,
        &json!({ "email": email, "password": "SecureP4ssword" }),
    );
    let response = ctx.app.clone().call(login).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::response_json(response).await;
    let access_token = body["access_token"].as_str().unwrap().to_string();

    // And the issued token authenticates portal calls
    let me = Request::builder()
        .method("GET")
        .uri("/v1/applications/me")
        .header("authorization", format!("Bearer {}", access_token))
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().call(me).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::response_json(response).await;
    assert!(body["application"].is_null());

    // Wrong password is rejected
    let login = common::json_request(
        "POST",
        "/v1/auth/login",
        None,
        &json!({ "email": email, "password": "WrongP4ssword" }),
    );
    let response = ctx.app.clone().call(login).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(&email)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_get_my_application_without_credentials_is_empty() {
    let ctx = TestContext::new().await.unwrap();

    // No Authorization header: 200 with a null application, never 401
    let request = Request::builder()
        .method("GET")
        .uri("/v1/applications/me")
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::response_json(response).await;
    assert!(body["application"].is_null());

    // Garbage token behaves like no token
    let request = Request::builder()
        .method("GET")
        .uri("/v1/applications/me")
        .header("authorization", "Bearer not.a.token")
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::response_json(response).await;
    assert!(body["application"].is_null());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_submit_requires_authentication() {
    let ctx = TestContext::new().await.unwrap();

    let request = common::json_request("POST", "/v1/applications", None, &common::acme_payload());
    let response = ctx.app.clone().call(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::response_json(response).await;
    assert_eq!(body["error"], "unauthorized");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_submit_creates_pending_application() {
    let ctx = TestContext::new().await.unwrap();

    let request = common::json_request(
        "POST",
        "/v1/applications",
        Some(&ctx.auth_header()),
        &common::acme_payload(),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::response_json(response).await;
    assert!(body["id"].is_string());

    // The dashboard view shows the new application
    let me = Request::builder()
        .method("GET")
        .uri("/v1/applications/me")
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().call(me).await.unwrap();
    let me_body = common::response_json(response).await;
    let application = &me_body["application"];

    assert_eq!(application["id"], body["id"]);
    assert_eq!(application["company_name"], "Acme");
    assert_eq!(application["status"], "pending");
    assert!(application["website"].is_null());
    assert!(application["funding"].is_null());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_second_submit_conflicts() {
    let ctx = TestContext::new().await.unwrap();

    let request = common::json_request(
        "POST",
        "/v1/applications",
        Some(&ctx.auth_header()),
        &common::acme_payload(),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = common::json_request(
        "POST",
        "/v1/applications",
        Some(&ctx.auth_header()),
        &common::acme_payload(),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = common::response_json(response).await;
    assert_eq!(body["error"], "conflict");
    assert_eq!(body["message"], "You already have an application submitted");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_submit_validates_fields() {
    let ctx = TestContext::new().await.unwrap();

    let mut payload = common::acme_payload();
    payload["company_name"] = json!("");
    payload["founder_email"] = json!("not-an-email");

    let request =
        common::json_request("POST", "/v1/applications", Some(&ctx.auth_header()), &payload);
    let response = ctx.app.clone().call(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = common::response_json(response).await;
    assert_eq!(body["error"], "validation_error");
    assert!(body["details"].is_array());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_update_overwrites_fields_and_preserves_lifecycle() {
    let ctx = TestContext::new().await.unwrap();

    let request = common::json_request(
        "POST",
        "/v1/applications",
        Some(&ctx.auth_header()),
        &common::acme_payload(),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    let id = common::response_json(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let me = Request::builder()
        .method("GET")
        .uri("/v1/applications/me")
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();
    let before = common::response_json(ctx.app.clone().call(me).await.unwrap()).await;

    let mut payload = common::acme_payload();
    payload["company_name"] = json!("Acme Robotics");
    payload["website"] = json!("https://acme.dev");

    let request = common::json_request(
        "PUT",
        &format!("/v1/applications/{}", id),
        Some(&ctx.auth_header()),
        &payload,
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let me = Request::builder()
        .method("GET")
        .uri("/v1/applications/me")
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();
    let after = common::response_json(ctx.app.clone().call(me).await.unwrap()).await;

    assert_eq!(after["application"]["company_name"], "Acme Robotics");
    assert_eq!(after["application"]["website"], "https://acme.dev");

    // Identity and lifecycle fields are untouched
    assert_eq!(after["application"]["id"], before["application"]["id"]);
    assert_eq!(
        after["application"]["user_id"],
        before["application"]["user_id"]
    );
    assert_eq!(after["application"]["status"], "pending");
    assert_eq!(
        after["application"]["created_at"],
        before["application"]["created_at"]
    );

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_update_by_non_owner_is_not_found() {
    let ctx = TestContext::new().await.unwrap();

    let request = common::json_request(
        "POST",
        "/v1/applications",
        Some(&ctx.auth_header()),
        &common::acme_payload(),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    let id = common::response_json(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    // A different user gets the same 404 as for an id that doesn't exist
    let stranger = common::create_test_user(&ctx.db).await.unwrap();
    let stranger_auth = format!("Bearer {}", common::token_for(stranger.id));

    let request = common::json_request(
        "PUT",
        &format!("/v1/applications/{}", id),
        Some(&stranger_auth),
        &common::acme_payload(),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let stolen = common::response_json(response).await;

    let request = common::json_request(
        "PUT",
        &format!("/v1/applications/{}", uuid::Uuid::new_v4()),
        Some(&stranger_auth),
        &common::acme_payload(),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let missing = common::response_json(response).await;

    assert_eq!(stolen["message"], missing["message"]);

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(stranger.id)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_update_rejected_once_under_review() {
    let ctx = TestContext::new().await.unwrap();

    let request = common::json_request(
        "POST",
        "/v1/applications",
        Some(&ctx.auth_header()),
        &common::acme_payload(),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    let id = common::response_json(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    // The review team picks it up, directly in the store
    sqlx::query("UPDATE applications SET status = 'reviewing' WHERE id = $1::uuid")
        .bind(&id)
        .execute(&ctx.db)
        .await
        .unwrap();

    let request = common::json_request(
        "PUT",
        &format!("/v1/applications/{}", id),
        Some(&ctx.auth_header()),
        &common::acme_payload(),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = common::response_json(response).await;
    assert_eq!(
        body["message"],
        "Cannot edit application that is being reviewed"
    );

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_stats_shape_and_consistency() {
    let ctx = TestContext::new().await.unwrap();

    let request = common::json_request(
        "POST",
        "/v1/applications",
        Some(&ctx.auth_header()),
        &common::acme_payload(),
    );
    ctx.app.clone().call(request).await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/v1/stats")
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let stats = common::response_json(response).await;

    // The aggregate breaks out pending/reviewing/accepted but never rejected
    assert!(stats["total"].is_number());
    assert!(stats["pending"].is_number());
    assert!(stats["reviewing"].is_number());
    assert!(stats["accepted"].is_number());
    assert!(stats.get("rejected").is_none());

    let (rejected,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM applications WHERE status = 'rejected'")
            .fetch_one(&ctx.db)
            .await
            .unwrap();

    assert_eq!(
        stats["total"].as_i64().unwrap(),
        stats["pending"].as_i64().unwrap()
            + stats["reviewing"].as_i64().unwrap()
            + stats["accepted"].as_i64().unwrap()
            + rejected
    );
    assert!(stats["total"].as_i64().unwrap() >= 1);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_change_feed_endpoint_streams() {
    let ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/v1/applications/events")
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(content_type.starts_with("text/event-stream"));

    ctx.cleanup().await.unwrap();
}
