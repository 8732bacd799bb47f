//! Every action denied to a role answers 401 or 403, never an empty 200.

use actix_web::http::Method;
use serde_json::{Value, json};
use uuid::Uuid;

use video_feedback_lib::models::Role;

use super::helpers::*;

struct Case {
    method: Method,
    uri: String,
    body: Option<Value>,
    allowed: &'static [Role],
}

fn cases() -> Vec<Case> {
    let id = Uuid::new_v4();
    vec![
        Case {
            method: Method::POST,
            uri: "/api/v1/challenges".into(),
            body: Some(json!({ "title": "x" })),
            allowed: &[Role::Admin],
        },
        Case {
            method: Method::PUT,
            uri: format!("/api/v1/challenges/{}", id),
            body: Some(json!({})),
            allowed: &[Role::Admin],
        },
        Case {
            method: Method::DELETE,
            uri: format!("/api/v1/challenges/{}", id),
            body: None,
            allowed: &[Role::Admin],
        },
        Case {
            method: Method::POST,
            uri: "/api/v1/challenges/submissions".into(),
            body: Some(json!({})),
            allowed: &[Role::Student],
        },
        Case {
            method: Method::PUT,
            uri: format!("/api/v1/submissions/{}/feedback", id),
            body: Some(json!({})),
            allowed: &[Role::Admin, Role::Supervisor],
        },
        Case {
            method: Method::POST,
            uri: format!("/api/v1/videos/{}/notes", id),
            body: Some(json!({ "content": "x" })),
            allowed: &[Role::Admin, Role::Supervisor],
        },
        Case {
            method: Method::GET,
            uri: "/api/v1/videos/review".into(),
            body: None,
            allowed: &[Role::Supervisor],
        },
        Case {
            method: Method::GET,
            uri: "/api/v1/videos".into(),
            body: None,
            allowed: &[Role::Student],
        },
        Case {
            method: Method::GET,
            uri: format!("/api/v1/videos/{}", id),
            body: None,
            allowed: &[Role::Student],
        },
        Case {
            method: Method::POST,
            uri: "/api/v1/videos".into(),
            body: Some(json!({
                "title": "t", "objectKey": "videos/a.mp4", "fileSize": 1, "contentType": "video/mp4"
            })),
            allowed: &[Role::Student],
        },
        Case {
            method: Method::POST,
            uri: "/api/v1/uploads".into(),
            body: Some(json!({ "fileName": "a.mp4", "contentType": "video/mp4", "size": 1 })),
            allowed: &[Role::Student],
        },
        Case {
            method: Method::GET,
            uri: "/api/v1/users".into(),
            body: None,
            allowed: &[Role::Admin],
        },
        Case {
            method: Method::GET,
            uri: format!("/api/v1/users/{}", id),
            body: None,
            allowed: &[Role::Admin],
        },
        Case {
            method: Method::PATCH,
            uri: format!("/api/v1/users/{}", id),
            body: Some(json!({ "role": "admin" })),
            allowed: &[Role::Admin],
        },
        Case {
            method: Method::POST,
            uri: "/api/v1/chat/connect".into(),
            body: Some(json!({})),
            allowed: &[Role::Admin, Role::Supervisor, Role::Student],
        },
        Case {
            method: Method::GET,
            uri: "/api/v1/chat/users".into(),
            body: None,
            allowed: &[Role::Admin, Role::Supervisor, Role::Student],
        },
    ]
}

#[actix_rt::test]
async fn test_anonymous_callers_get_401() {
    let ctx = TestContext::new();
    let app = ctx.app().await;

    for case in cases() {
        let (status, body) = send(&app, request(case.method.clone(), &case.uri, None, case.body)).await;
        assert_eq!(status, 401, "{} {} -> {}", case.method, case.uri, body);
        assert_eq!(body["error"], "UNAUTHORIZED");
        assert_eq!(body["message"], "Authentication required.");
    }
}

#[actix_rt::test]
async fn test_wrong_role_gets_403_naming_allowed_roles() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let admin = ctx.user("Ada Admin", Role::Admin).await;
    let supervisor = ctx.user("Sam Supervisor", Role::Supervisor).await;
    let student = ctx.user("Stu Student", Role::Student).await;

    for case in cases() {
        for user in [&admin, &supervisor, &student] {
            if case.allowed.contains(&user.identity.role) {
                continue;
            }
            let (status, body) = send(
                &app,
                request(case.method.clone(), &case.uri, Some(&user.token), case.body.clone()),
            )
            .await;
            assert_eq!(
                status, 403,
                "{} {} as {} -> {}",
                case.method, case.uri, user.identity.role, body
            );
            assert_eq!(body["error"], "FORBIDDEN");
            let message = body["message"].as_str().unwrap();
            assert!(message.starts_with("Access denied. Requires one of the following roles: "));
            for role in case.allowed {
                assert!(message.contains(role.as_str()), "{}", message);
            }
        }
    }
}

#[actix_rt::test]
async fn test_allowed_roles_pass_the_gate() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let admin = ctx.user("Ada Admin", Role::Admin).await;
    let supervisor = ctx.user("Sam Supervisor", Role::Supervisor).await;
    let student = ctx.user("Stu Student", Role::Student).await;

    for case in cases() {
        for user in [&admin, &supervisor, &student] {
            if !case.allowed.contains(&user.identity.role) {
                continue;
            }
            let (status, body) = send(
                &app,
                request(case.method.clone(), &case.uri, Some(&user.token), case.body.clone()),
            )
            .await;
            assert!(
                status != 401 && status != 403,
                "{} {} as {} -> {} {}",
                case.method,
                case.uri,
                user.identity.role,
                status,
                body
            );
        }
    }
}

/// Requests whose body or path would not parse. Authorization still decides.
fn malformed_cases() -> Vec<Case> {
    let id = Uuid::new_v4();
    vec![
        Case {
            method: Method::POST,
            uri: "/api/v1/uploads".into(),
            body: Some(json!({})),
            allowed: &[Role::Student],
        },
        Case {
            method: Method::POST,
            uri: "/api/v1/videos".into(),
            body: Some(json!({ "fileSize": "big" })),
            allowed: &[Role::Student],
        },
        Case {
            method: Method::POST,
            uri: "/api/v1/challenges".into(),
            body: Some(json!({})),
            allowed: &[Role::Admin],
        },
        Case {
            method: Method::PUT,
            uri: "/api/v1/challenges/not-a-uuid".into(),
            body: Some(json!({ "isActive": "yes" })),
            allowed: &[Role::Admin],
        },
        Case {
            method: Method::DELETE,
            uri: "/api/v1/challenges/not-a-uuid".into(),
            body: None,
            allowed: &[Role::Admin],
        },
        Case {
            method: Method::POST,
            uri: "/api/v1/challenges/submissions".into(),
            body: Some(json!({ "videoId": "nope" })),
            allowed: &[Role::Student],
        },
        Case {
            method: Method::PUT,
            uri: "/api/v1/submissions/not-a-uuid/feedback".into(),
            body: Some(json!([1, 2])),
            allowed: &[Role::Admin, Role::Supervisor],
        },
        Case {
            method: Method::POST,
            uri: format!("/api/v1/videos/{}/notes", id),
            body: Some(json!({ "content": 7 })),
            allowed: &[Role::Admin, Role::Supervisor],
        },
        Case {
            method: Method::GET,
            uri: "/api/v1/videos/not-a-uuid".into(),
            body: None,
            allowed: &[Role::Student],
        },
        Case {
            method: Method::PATCH,
            uri: format!("/api/v1/users/{}", id),
            body: Some(json!({ "role": 5 })),
            allowed: &[Role::Admin],
        },
        Case {
            method: Method::GET,
            uri: "/api/v1/users/not-a-uuid".into(),
            body: None,
            allowed: &[Role::Admin],
        },
        Case {
            method: Method::POST,
            uri: "/api/v1/chat/channels/direct".into(),
            body: Some(json!({ "targetUserId": 5 })),
            allowed: &[Role::Admin, Role::Supervisor, Role::Student],
        },
    ]
}

#[actix_rt::test]
async fn test_malformed_requests_are_gated_before_parsing() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let admin = ctx.user("Ada Admin", Role::Admin).await;
    let supervisor = ctx.user("Sam Supervisor", Role::Supervisor).await;
    let student = ctx.user("Stu Student", Role::Student).await;

    for case in malformed_cases() {
        let (status, body) =
            send(&app, request(case.method.clone(), &case.uri, None, case.body.clone())).await;
        assert_error(status, &body, 401, "UNAUTHORIZED");

        for user in [&admin, &supervisor, &student] {
            let (status, body) = send(
                &app,
                request(case.method.clone(), &case.uri, Some(&user.token), case.body.clone()),
            )
            .await;
            if case.allowed.contains(&user.identity.role) {
                assert_error(status, &body, 400, "VALIDATION_ERROR");
            } else {
                assert_error(status, &body, 403, "FORBIDDEN");
            }
        }
    }
}

#[actix_rt::test]
async fn test_non_json_body_is_gated_before_parsing() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let student = ctx.user("Stu Student", Role::Student).await;
    let admin = ctx.user("Ada Admin", Role::Admin).await;

    let raw = |token: Option<&str>| {
        let mut req = actix_web::test::TestRequest::post()
            .uri("/api/v1/challenges")
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{not json");
        if let Some(token) = token {
            req = req.insert_header(("Authorization", format!("Bearer {}", token)));
        }
        req.to_request()
    };

    let (status, body) = send(&app, raw(None)).await;
    assert_error(status, &body, 401, "UNAUTHORIZED");
    let (status, body) = send(&app, raw(Some(&student.token))).await;
    assert_error(status, &body, 403, "FORBIDDEN");
    let (status, body) = send(&app, raw(Some(&admin.token))).await;
    assert_error(status, &body, 400, "VALIDATION_ERROR");
}
