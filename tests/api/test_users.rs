//! User administration.

use serde_json::json;
use uuid::Uuid;

use video_feedback_lib::models::Role;

use super::helpers::*;

#[actix_rt::test]
async fn test_list_includes_counts_newest_first() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let admin = ctx.user("Ada Admin", Role::Admin).await;
    let student = ctx.user("Stu Student", Role::Student).await;
    ctx.video(&student, "one").await;
    ctx.video(&student, "two").await;

    let (status, users) = get(&app, "/api/v1/users", Some(&admin.token)).await;
    assert_eq!(status, 200);
    assert_eq!(users[0]["id"], student.id().to_string());
    assert_eq!(users[0]["videoCount"], 2);
    assert_eq!(users[0]["noteCount"], 0);
    assert!(users[0].get("passwordHash").is_none());
    assert_eq!(users[1]["role"], "admin");
}

#[actix_rt::test]
async fn test_detail_lists_videos_and_authored_notes() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let admin = ctx.user("Ada Admin", Role::Admin).await;
    let student = ctx.user("Stu Student", Role::Student).await;
    let supervisor = ctx.user("Sam Supervisor", Role::Supervisor).await;
    let video_id = ctx.video(&student, "rally").await;

    post(
        &app,
        &format!("/api/v1/videos/{}/notes", video_id),
        Some(&supervisor.token),
        json!({ "content": "Follow through" }),
    )
    .await;

    let (status, detail) = get(&app, &format!("/api/v1/users/{}", student.id()), Some(&admin.token)).await;
    assert_eq!(status, 200);
    assert_eq!(detail["uploadedVideos"][0]["title"], "rally");

    let (_, detail) = get(&app, &format!("/api/v1/users/{}", supervisor.id()), Some(&admin.token)).await;
    assert_eq!(detail["createdNotes"][0]["videoTitle"], "rally");
    assert_eq!(detail["createdNotes"][0]["content"], "Follow through");

    let (status, body) = get(&app, &format!("/api/v1/users/{}", Uuid::new_v4()), Some(&admin.token)).await;
    assert_error(status, &body, 404, "NOT_FOUND");
}

#[actix_rt::test]
async fn test_role_change() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let admin = ctx.user("Ada Admin", Role::Admin).await;
    let student = ctx.user("Stu Student", Role::Student).await;
    let uri = format!("/api/v1/users/{}", student.id());

    let (status, body) = patch(&app, &uri, Some(&admin.token), json!({ "role": "professional" })).await;
    assert_error(status, &body, 400, "VALIDATION_ERROR");
    assert_eq!(
        body["message"],
        "Invalid role. Must be one of: student, supervisor, admin."
    );

    // Role is validated before the user is looked up.
    let missing = format!("/api/v1/users/{}", Uuid::new_v4());
    let (status, _) = patch(&app, &missing, Some(&admin.token), json!({ "role": "owner" })).await;
    assert_eq!(status, 400);
    let (status, body) = patch(&app, &missing, Some(&admin.token), json!({ "role": "admin" })).await;
    assert_error(status, &body, 404, "NOT_FOUND");

    let (status, body) = patch(&app, &uri, Some(&admin.token), json!({ "role": "supervisor" })).await;
    assert_eq!(status, 200, "{}", body);
    assert_eq!(body["role"], "supervisor");
}

#[actix_rt::test]
async fn test_demoted_admin_loses_rights_with_existing_token() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let root = ctx.user("Root Admin", Role::Admin).await;
    let dee = ctx.user("Dee Admin", Role::Admin).await;

    let (status, _) = get(&app, "/api/v1/users", Some(&dee.token)).await;
    assert_eq!(status, 200);

    let (status, body) = patch(
        &app,
        &format!("/api/v1/users/{}", dee.id()),
        Some(&root.token),
        json!({ "role": "student" }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["role"], "student");

    let (status, body) = get(&app, "/api/v1/users", Some(&dee.token)).await;
    assert_error(status, &body, 403, "FORBIDDEN");

    let (status, body) = patch(
        &app,
        &format!("/api/v1/users/{}", root.id()),
        Some(&dee.token),
        json!({ "role": "student" }),
    )
    .await;
    assert_error(status, &body, 403, "FORBIDDEN");

    let (_, me) = get(&app, "/api/v1/auth/me", Some(&dee.token)).await;
    assert_eq!(me["user"]["role"], "student");

    let (_, root_me) = get(&app, "/api/v1/auth/me", Some(&root.token)).await;
    assert_eq!(root_me["user"]["role"], "admin");
}

#[actix_rt::test]
async fn test_promotion_applies_to_existing_token() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let root = ctx.user("Root Admin", Role::Admin).await;
    let sam = ctx.user("Sam Supervisor", Role::Supervisor).await;

    let (status, _) = get(&app, "/api/v1/users", Some(&sam.token)).await;
    assert_eq!(status, 403);

    patch(
        &app,
        &format!("/api/v1/users/{}", sam.id()),
        Some(&root.token),
        json!({ "role": "admin" }),
    )
    .await;

    let (status, _) = get(&app, "/api/v1/users", Some(&sam.token)).await;
    assert_eq!(status, 200);
}

#[actix_rt::test]
async fn test_token_for_unknown_user_is_anonymous() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let ghost = video_feedback_lib::models::Identity {
        id: Uuid::new_v4(),
        name: "Ghost".into(),
        email: "ghost@example.com".into(),
        role: Role::Admin,
    };
    let token = ctx.keys.issue(&ghost).unwrap();

    let (status, body) = get(&app, "/api/v1/users", Some(&token)).await;
    assert_error(status, &body, 401, "UNAUTHORIZED");

    let (status, me) = get(&app, "/api/v1/auth/me", Some(&token)).await;
    assert_eq!(status, 200);
    assert!(me["user"].is_null());
}
