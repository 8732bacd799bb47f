//! Ownership scoping of student videos and the supervisor review list.

use serde_json::json;

use video_feedback_lib::models::Role;

use super::helpers::*;

#[actix_rt::test]
async fn test_students_only_see_their_own_videos() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let alice = ctx.user("Alice Student", Role::Student).await;
    let bob = ctx.user("Bob Student", Role::Student).await;

    let first = ctx.video(&alice, "first").await;
    let second = ctx.video(&alice, "second").await;
    let bobs = ctx.video(&bob, "bobs").await;

    let (status, list) = get(&app, "/api/v1/videos", Some(&alice.token)).await;
    assert_eq!(status, 200);
    let ids: Vec<String> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec![second.to_string(), first.to_string()]);

    let (status, body) = get(&app, &format!("/api/v1/videos/{}", bobs), Some(&alice.token)).await;
    assert_error(status, &body, 404, "NOT_FOUND");

    let (status, body) = get(&app, &format!("/api/v1/videos/{}", first), Some(&alice.token)).await;
    assert_eq!(status, 200);
    assert_eq!(body["title"], "first");

    let (status, body) = get(&app, "/api/v1/videos/not-a-uuid", Some(&alice.token)).await;
    assert_error(status, &body, 400, "VALIDATION_ERROR");
}

#[actix_rt::test]
async fn test_notes_are_listed_oldest_first_for_the_owner() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let student = ctx.user("Stu Student", Role::Student).await;
    let supervisor = ctx.user("Sam Supervisor", Role::Supervisor).await;
    let video_id = ctx.video(&student, "clip").await;

    let uri = format!("/api/v1/videos/{}/notes", video_id);
    post(&app, &uri, Some(&supervisor.token), json!({ "content": "one" })).await;
    post(&app, &uri, Some(&supervisor.token), json!({ "content": "two", "timestampMs": 4200 })).await;

    let (_, video) = get(&app, &format!("/api/v1/videos/{}", video_id), Some(&student.token)).await;
    let notes = video["notes"].as_array().unwrap();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0]["content"], "one");
    assert_eq!(notes[1]["timestampMs"], 4200);
    assert_eq!(notes[1]["supervisorName"], "Sam Supervisor");
}

#[actix_rt::test]
async fn test_review_list_includes_uploader() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let alice = ctx.user("Alice Student", Role::Student).await;
    let bob = ctx.user("Bob Student", Role::Student).await;
    let supervisor = ctx.user("Sam Supervisor", Role::Supervisor).await;

    ctx.video(&alice, "a").await;
    ctx.video(&bob, "b").await;

    let (status, list) = get(&app, "/api/v1/videos/review", Some(&supervisor.token)).await;
    assert_eq!(status, 200);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["uploader"]["name"], "Bob Student");
    assert_eq!(list[1]["uploader"]["email"], "alice.student@example.com");
    assert!(list[0]["notes"].as_array().unwrap().is_empty());
}
