//! One feedback record per video, last writer wins.

use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use video_feedback_lib::db::{NoteStore, SubmissionStore};
use video_feedback_lib::models::Role;

use super::helpers::*;

async fn submitted(ctx: &TestContext) -> (TestUser, Uuid, Uuid, Uuid) {
    let admin = ctx.user("Ada Admin", Role::Admin).await;
    let student = ctx.user("Stu Student", Role::Student).await;
    let now = Utc::now();
    let challenge_id = ctx
        .challenge(&admin, "Open", now - Duration::hours(1), now + Duration::days(1), true)
        .await;
    let video_id = ctx.video(&student, "clip").await;
    let submission = ctx
        .repo
        .insert_submission(challenge_id, video_id)
        .await
        .unwrap();
    (admin, challenge_id, video_id, submission.id)
}

#[actix_rt::test]
async fn test_second_feedback_overwrites_first() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let (admin, challenge_id, video_id, submission_id) = submitted(&ctx).await;
    let supervisor = ctx.user("Sam Supervisor", Role::Supervisor).await;
    let uri = format!("/api/v1/submissions/{}/feedback", submission_id);

    let (status, body) = put(&app, &uri, Some(&supervisor.token), json!({ "score": 85, "note": "Good" })).await;
    assert_eq!(status, 200, "{}", body);
    assert_eq!(body["feedback"]["score"], 85);

    let (status, body) = put(&app, &uri, Some(&admin.token), json!({ "score": 90, "note": "Better" })).await;
    assert_eq!(status, 200, "{}", body);

    let stored = ctx.repo.find_feedback(video_id).await.unwrap().unwrap();
    assert_eq!(stored.score, Some(90));
    assert_eq!(stored.content, "Better");
    assert_eq!(stored.supervisor_id, admin.id());

    let (_, detail) = get(&app, &format!("/api/v1/challenges/{}", challenge_id), Some(&admin.token)).await;
    let feedback = &detail["submissions"][0]["feedback"];
    assert_eq!(feedback["score"], 90);
    assert_eq!(feedback["supervisorName"], "Ada Admin");
}

#[actix_rt::test]
async fn test_feedback_is_shared_across_challenges() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let (admin, _, video_id, first) = submitted(&ctx).await;
    let now = Utc::now();
    let other_challenge = ctx
        .challenge(&admin, "Second", now - Duration::hours(1), now + Duration::days(1), true)
        .await;
    let second = ctx
        .repo
        .insert_submission(other_challenge, video_id)
        .await
        .unwrap();

    put(&app, &format!("/api/v1/submissions/{}/feedback", first), Some(&admin.token), json!({ "score": 40, "note": "A" })).await;
    put(&app, &format!("/api/v1/submissions/{}/feedback", second.id), Some(&admin.token), json!({ "score": 60, "note": "B" })).await;

    let stored = ctx.repo.find_feedback(video_id).await.unwrap().unwrap();
    assert_eq!(stored.score, Some(60));
}

#[actix_rt::test]
async fn test_feedback_validation_precedes_lookup() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let supervisor = ctx.user("Sam Supervisor", Role::Supervisor).await;
    let uri = format!("/api/v1/submissions/{}/feedback", Uuid::new_v4());

    for body in [
        json!({ "score": 101, "note": "x" }),
        json!({ "score": -1, "note": "x" }),
        json!({ "score": 85.5, "note": "x" }),
        json!({ "note": "x" }),
        json!({ "score": 50 }),
    ] {
        let (status, resp) = put(&app, &uri, Some(&supervisor.token), body).await;
        assert_error(status, &resp, 400, "VALIDATION_ERROR");
    }

    let (status, resp) = put(&app, &uri, Some(&supervisor.token), json!({ "score": 50, "note": "x" })).await;
    assert_error(status, &resp, 404, "NOT_FOUND");
}

#[actix_rt::test]
async fn test_annotations_do_not_count_as_feedback() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let (admin, _, video_id, _) = submitted(&ctx).await;
    let uri = format!("/api/v1/videos/{}/notes", video_id);

    for at in [0, 1500] {
        let (status, body) = post(&app, &uri, Some(&admin.token), json!({ "content": "Elbow up", "timestampMs": at })).await;
        assert_eq!(status, 201, "{}", body);
        assert!(body["score"].is_null());
    }
    assert!(ctx.repo.find_feedback(video_id).await.unwrap().is_none());

    let (status, body) = post(&app, &uri, Some(&admin.token), json!({ "content": "x", "timestampMs": -5 })).await;
    assert_error(status, &body, 400, "VALIDATION_ERROR");

    let missing = format!("/api/v1/videos/{}/notes", Uuid::new_v4());
    let (status, body) = post(&app, &missing, Some(&admin.token), json!({ "content": "x" })).await;
    assert_error(status, &body, 404, "NOT_FOUND");
}
