//! Sign-up, sign-in and session resolution.

use actix_web::test;
use serde_json::json;

use video_feedback_lib::config::SESSION_COOKIE;

use super::helpers::*;

fn sign_up_body(email: &str, role: &str) -> serde_json::Value {
    json!({
        "name": "Noor Haddad",
        "email": email,
        "password": "correct horse battery",
        "role": role,
        "studentId": "S-1001",
        "class": "10B"
    })
}

#[actix_rt::test]
async fn test_sign_up_then_me_with_bearer_token() {
    let ctx = TestContext::new();
    let app = ctx.app().await;

    let (status, body) = post(&app, "/api/v1/auth/sign-up", None, sign_up_body("noor@example.com", "student")).await;
    assert_eq!(status, 201, "{}", body);
    assert_eq!(body["user"]["role"], "student");
    assert_eq!(body["user"]["email"], "noor@example.com");

    let token = body["token"].as_str().unwrap().to_string();
    let (status, me) = get(&app, "/api/v1/auth/me", Some(&token)).await;
    assert_eq!(status, 200);
    assert_eq!(me["user"]["name"], "Noor Haddad");
}

#[actix_rt::test]
async fn test_me_is_null_when_anonymous_or_token_is_bad() {
    let ctx = TestContext::new();
    let app = ctx.app().await;

    let (status, me) = get(&app, "/api/v1/auth/me", None).await;
    assert_eq!(status, 200);
    assert!(me["user"].is_null());

    let (status, me) = get(&app, "/api/v1/auth/me", Some("not-a-jwt")).await;
    assert_eq!(status, 200);
    assert!(me["user"].is_null());
}

#[actix_rt::test]
async fn test_admin_cannot_be_self_assigned() {
    let ctx = TestContext::new();
    let app = ctx.app().await;

    let (status, body) = post(&app, "/api/v1/auth/sign-up", None, sign_up_body("eve@example.com", "admin")).await;
    assert_error(status, &body, 400, "VALIDATION_ERROR");
}

#[actix_rt::test]
async fn test_duplicate_email_is_conflict() {
    let ctx = TestContext::new();
    let app = ctx.app().await;

    let (status, _) = post(&app, "/api/v1/auth/sign-up", None, sign_up_body("dup@example.com", "student")).await;
    assert_eq!(status, 201);
    let (status, body) = post(&app, "/api/v1/auth/sign-up", None, sign_up_body("DUP@example.com", "supervisor")).await;
    assert_error(status, &body, 409, "CONFLICT");
}

#[actix_rt::test]
async fn test_sign_in_sets_cookie_that_resolves() {
    let ctx = TestContext::new();
    let app = ctx.app().await;

    post(&app, "/api/v1/auth/sign-up", None, sign_up_body("kim@example.com", "supervisor")).await;

    let (status, body) = post(
        &app,
        "/api/v1/auth/sign-in",
        None,
        json!({ "email": "kim@example.com", "password": "wrong password" }),
    )
    .await;
    assert_error(status, &body, 401, "UNAUTHORIZED");

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/sign-in")
        .set_json(json!({ "email": "kim@example.com", "password": "correct horse battery" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .expect("session cookie set")
        .into_owned();
    assert_eq!(cookie.http_only(), Some(true));

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .cookie(cookie)
        .to_request();
    let me: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(me["user"]["role"], "supervisor");
}

#[actix_rt::test]
async fn test_sign_out_clears_cookie() {
    let ctx = TestContext::new();
    let app = ctx.app().await;

    let req = test::TestRequest::post().uri("/api/v1/auth/sign-out").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .expect("removal cookie set")
        .into_owned();
    assert_eq!(cookie.value(), "");
}

#[actix_rt::test]
async fn test_health_and_openapi() {
    let ctx = TestContext::new();
    let app = ctx.app().await;

    let (status, body) = get(&app, "/api/v1/health", None).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");

    let (status, body) = get(&app, "/api/v1/ready", None).await;
    assert_eq!(status, 200);
    assert_eq!(body["database"], "connected");

    let (status, doc) = get(&app, "/api/v1/openapi.json", None).await;
    assert_eq!(status, 200);
    assert!(doc["paths"]["/api/v1/challenges/submissions"].is_object());
}
