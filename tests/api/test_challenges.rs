//! Challenge lifecycle, visibility and submission admission.

use chrono::{Duration, Utc};
use serde_json::json;

use video_feedback_lib::models::Role;

use super::helpers::*;

#[actix_rt::test]
async fn test_create_requires_title_and_dates() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let admin = ctx.user("Ada Admin", Role::Admin).await;

    let (status, body) = post(
        &app,
        "/api/v1/challenges",
        Some(&admin.token),
        json!({ "title": "No end", "startDate": Utc::now() }),
    )
    .await;
    assert_error(status, &body, 400, "VALIDATION_ERROR");

    let (status, body) = post(
        &app,
        "/api/v1/challenges",
        Some(&admin.token),
        json!({ "title": "", "startDate": Utc::now(), "endDate": Utc::now() }),
    )
    .await;
    assert_error(status, &body, 400, "VALIDATION_ERROR");

    // End before start is accepted as-is.
    let start = Utc::now() + Duration::days(2);
    let (status, body) = post(
        &app,
        "/api/v1/challenges",
        Some(&admin.token),
        json!({ "title": "Backwards", "startDate": start, "endDate": start - Duration::days(1) }),
    )
    .await;
    assert_eq!(status, 201, "{}", body);
    assert_eq!(body["isActive"], true);
    assert_eq!(body["state"], "scheduled");
}

#[actix_rt::test]
async fn test_submission_lifecycle() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let admin = ctx.user("Ada Admin", Role::Admin).await;
    let student = ctx.user("Stu Student", Role::Student).await;

    let now = Utc::now();
    let (status, created) = post(
        &app,
        "/api/v1/challenges",
        Some(&admin.token),
        json!({
            "title": "Opening Serve",
            "description": "Film your serve",
            "startDate": now - Duration::hours(1),
            "endDate": now + Duration::days(7)
        }),
    )
    .await;
    assert_eq!(status, 201, "{}", created);
    assert_eq!(created["state"], "open");
    let challenge_id = created["id"].as_str().unwrap().to_string();

    let video_id = ctx.video(&student, "serve").await;
    let submit = json!({ "videoId": video_id, "challengeId": challenge_id });

    let (status, body) = post(&app, "/api/v1/challenges/submissions", Some(&student.token), submit.clone()).await;
    assert_eq!(status, 201, "{}", body);
    assert!(body["message"].as_str().unwrap().contains("Opening Serve"));
    assert!(body["submissionId"].is_string());

    let (status, body) = post(&app, "/api/v1/challenges/submissions", Some(&student.token), submit).await;
    assert_error(status, &body, 409, "CONFLICT");
    assert_eq!(
        body["message"],
        "This video has already been submitted to this challenge."
    );

    // Staff see the submission, students do not.
    let uri = format!("/api/v1/challenges/{}", challenge_id);
    let (status, detail) = get(&app, &uri, Some(&admin.token)).await;
    assert_eq!(status, 200);
    assert_eq!(detail["submissions"].as_array().unwrap().len(), 1);
    assert_eq!(detail["submissions"][0]["uploader"]["name"], "Stu Student");
    assert!(detail["submissions"][0]["feedback"].is_null());

    let (status, public) = get(&app, &uri, Some(&student.token)).await;
    assert_eq!(status, 200);
    assert!(public.get("submissions").is_none());

    let (status, list) = get(&app, "/api/v1/challenges", Some(&admin.token)).await;
    assert_eq!(status, 200);
    assert_eq!(list[0]["submissionCount"], 1);
    assert_eq!(list[0]["creator"]["name"], "Ada Admin");

    // Delete cascades to submissions.
    let (status, _) = delete(&app, &uri, Some(&admin.token)).await;
    assert_eq!(status, 200);
    let (status, body) = get(&app, &uri, Some(&admin.token)).await;
    assert_error(status, &body, 404, "NOT_FOUND");
    let (status, body) = delete(&app, &uri, Some(&admin.token)).await;
    assert_error(status, &body, 404, "NOT_FOUND");
}

#[actix_rt::test]
async fn test_submission_outside_window_is_forbidden() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let admin = ctx.user("Ada Admin", Role::Admin).await;
    let student = ctx.user("Stu Student", Role::Student).await;
    let video_id = ctx.video(&student, "clip").await;

    let now = Utc::now();
    let scheduled = ctx
        .challenge(&admin, "Later", now + Duration::days(1), now + Duration::days(8), true)
        .await;
    let ended = ctx
        .challenge(&admin, "Done", now - Duration::days(8), now - Duration::days(1), true)
        .await;
    let inactive = ctx
        .challenge(&admin, "Paused", now - Duration::days(1), now + Duration::days(1), false)
        .await;

    for challenge_id in [scheduled, ended, inactive] {
        let (status, body) = post(
            &app,
            "/api/v1/challenges/submissions",
            Some(&student.token),
            json!({ "videoId": video_id, "challengeId": challenge_id }),
        )
        .await;
        assert_error(status, &body, 403, "FORBIDDEN");
        assert_eq!(
            body["message"],
            "This challenge is not currently open for submissions."
        );
    }
}

#[actix_rt::test]
async fn test_submitting_someone_elses_video_is_forbidden() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let admin = ctx.user("Ada Admin", Role::Admin).await;
    let student = ctx.user("Stu Student", Role::Student).await;
    let other = ctx.user("Oli Other", Role::Student).await;

    let now = Utc::now();
    let challenge_id = ctx
        .challenge(&admin, "Open", now - Duration::hours(1), now + Duration::days(1), true)
        .await;
    let theirs = ctx.video(&other, "theirs").await;

    let (status, body) = post(
        &app,
        "/api/v1/challenges/submissions",
        Some(&student.token),
        json!({ "videoId": theirs, "challengeId": challenge_id }),
    )
    .await;
    assert_error(status, &body, 403, "FORBIDDEN");

    let (status, body) = post(
        &app,
        "/api/v1/challenges/submissions",
        Some(&student.token),
        json!({ "videoId": theirs }),
    )
    .await;
    assert_error(status, &body, 400, "VALIDATION_ERROR");

    let (status, body) = post(
        &app,
        "/api/v1/challenges/submissions",
        Some(&student.token),
        json!({ "videoId": theirs, "challengeId": uuid::Uuid::new_v4() }),
    )
    .await;
    assert_error(status, &body, 404, "NOT_FOUND");
}

#[actix_rt::test]
async fn test_public_listing_hides_inactive_and_ended() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let admin = ctx.user("Ada Admin", Role::Admin).await;
    let supervisor = ctx.user("Sam Supervisor", Role::Supervisor).await;

    let now = Utc::now();
    let soon = ctx
        .challenge(&admin, "Soon", now + Duration::days(3), now + Duration::days(9), true)
        .await;
    let open = ctx
        .challenge(&admin, "Open", now - Duration::days(1), now + Duration::days(1), true)
        .await;
    let hidden = ctx
        .challenge(&admin, "Hidden", now - Duration::days(1), now + Duration::days(1), false)
        .await;
    let ended = ctx
        .challenge(&admin, "Ended", now - Duration::days(9), now - Duration::days(2), true)
        .await;

    let (status, list) = get(&app, "/api/v1/challenges", None).await;
    assert_eq!(status, 200);
    let ids: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![open.to_string(), soon.to_string()]);

    let (status, body) = get(&app, &format!("/api/v1/challenges/{}", hidden), None).await;
    assert_error(status, &body, 404, "NOT_FOUND");

    let (status, body) = get(&app, &format!("/api/v1/challenges/{}", ended), None).await;
    assert_error(status, &body, 404, "NOT_FOUND");

    let (status, body) =
        get(&app, &format!("/api/v1/challenges/{}", ended), Some(&supervisor.token)).await;
    assert_eq!(status, 200);
    assert_eq!(body["state"], "closed");

    let (status, list) = get(&app, "/api/v1/challenges", Some(&supervisor.token)).await;
    assert_eq!(status, 200);
    assert_eq!(list.as_array().unwrap().len(), 4);
    assert_eq!(list[0]["title"], "Ended");
    assert_eq!(list[0]["state"], "closed");
    assert_eq!(list[1]["title"], "Hidden");
    assert_eq!(list[1]["state"], "closed");
}

#[actix_rt::test]
async fn test_partial_update_distinguishes_absent_from_null() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let admin = ctx.user("Ada Admin", Role::Admin).await;

    let now = Utc::now();
    let (_, created) = post(
        &app,
        "/api/v1/challenges",
        Some(&admin.token),
        json!({
            "title": "Keep",
            "description": "Original",
            "startDate": now,
            "endDate": now + Duration::days(1)
        }),
    )
    .await;
    let uri = format!("/api/v1/challenges/{}", created["id"].as_str().unwrap());

    let (status, updated) = put(&app, &uri, Some(&admin.token), json!({ "title": "Renamed" })).await;
    assert_eq!(status, 200, "{}", updated);
    assert_eq!(updated["title"], "Renamed");
    assert_eq!(updated["description"], "Original");

    let (status, updated) = put(&app, &uri, Some(&admin.token), json!({ "description": null })).await;
    assert_eq!(status, 200);
    assert!(updated["description"].is_null());
    assert_eq!(updated["title"], "Renamed");

    let missing = format!("/api/v1/challenges/{}", uuid::Uuid::new_v4());
    let (status, body) = put(&app, &missing, Some(&admin.token), json!({ "title": "x" })).await;
    assert_error(status, &body, 404, "NOT_FOUND");
}
