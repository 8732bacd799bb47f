//! Upload slots and upload finalization.

use chrono::{DateTime, Utc};
use serde_json::json;

use video_feedback_lib::models::Role;

use super::helpers::*;

#[actix_rt::test]
async fn test_upload_slot_shape_and_expiry() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let student = ctx.user("Stu Student", Role::Student).await;

    let before = Utc::now();
    let (status, body) = post(
        &app,
        "/api/v1/uploads",
        Some(&student.token),
        json!({ "fileName": "my first serve.mp4", "contentType": "video/mp4", "size": 2048 }),
    )
    .await;
    assert_eq!(status, 200, "{}", body);

    let key = body["objectKey"].as_str().unwrap();
    assert!(key.starts_with("videos/"));
    assert!(key.ends_with("-my_first_serve.mp4"));
    assert!(body["uploadUrl"].as_str().unwrap().contains("X-Amz-Expires=1800"));

    let expires_at: DateTime<Utc> = body["expiresAt"].as_str().unwrap().parse().unwrap();
    let ttl = expires_at - before;
    assert!(ttl >= chrono::Duration::minutes(30) && ttl < chrono::Duration::minutes(31));
    assert_eq!(ctx.store.calls(), 1);
}

#[actix_rt::test]
async fn test_invalid_slot_request_is_rejected_before_presigning() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let student = ctx.user("Stu Student", Role::Student).await;

    for body in [
        json!({ "fileName": "", "contentType": "video/mp4", "size": 1 }),
        json!({ "fileName": "a.mp4", "contentType": "", "size": 1 }),
        json!({ "fileName": "a.mp4", "contentType": "video/mp4", "size": 0 }),
        json!({ "fileName": "a.mp4", "contentType": "video/mp4" }),
    ] {
        let (status, resp) = post(&app, "/api/v1/uploads", Some(&student.token), body).await;
        assert_error(status, &resp, 400, "VALIDATION_ERROR");
    }
    assert_eq!(ctx.store.calls(), 0);
}

#[actix_rt::test]
async fn test_finalize_records_video_without_touching_store() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let student = ctx.user("Stu Student", Role::Student).await;

    let (status, body) = post(
        &app,
        "/api/v1/videos",
        Some(&student.token),
        json!({
            "title": "Serve",
            "objectKey": "videos/0b7e-serve.mp4",
            "fileSize": 4096,
            "contentType": "video/mp4"
        }),
    )
    .await;
    assert_eq!(status, 201, "{}", body);
    assert!(body["videoId"].is_string());
    assert_eq!(ctx.store.calls(), 0);

    let (_, list) = get(&app, "/api/v1/videos", Some(&student.token)).await;
    assert_eq!(list[0]["objectKey"], "videos/0b7e-serve.mp4");
    assert_eq!(list[0]["fileSize"], 4096);
}

#[actix_rt::test]
async fn test_finalize_rejects_bad_metadata() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let student = ctx.user("Stu Student", Role::Student).await;

    for body in [
        json!({ "title": "t", "objectKey": "elsewhere/a.mp4", "fileSize": 1, "contentType": "video/mp4" }),
        json!({ "title": "t", "objectKey": "videos/../a.mp4", "fileSize": 1, "contentType": "video/mp4" }),
        json!({ "title": "t", "objectKey": "videos/a.mp4", "fileSize": 0, "contentType": "video/mp4" }),
        json!({ "title": "", "objectKey": "videos/a.mp4", "fileSize": 1, "contentType": "video/mp4" }),
        json!({ "title": "t", "objectKey": "videos/a.mp4", "fileSize": 1, "contentType": "" }),
    ] {
        let (status, resp) = post(&app, "/api/v1/videos", Some(&student.token), body).await;
        assert_error(status, &resp, 400, "VALIDATION_ERROR");
    }
}
