//! Chat bridge endpoints.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use video_feedback_lib::models::Role;
use video_feedback_lib::services::chat::{UnconfiguredChat, short_id};

use super::helpers::*;

#[actix_rt::test]
async fn test_connect_syncs_caller_and_mints_token() {
    let mut ctx = TestContext::new();
    let support = ctx.user("Sam Supervisor", Role::Supervisor).await;
    ctx.config.chat.support_member_ids = vec![support.id().to_string(), "not-a-uuid".to_string()];
    let app = ctx.app().await;
    let student = ctx.user("Stu Student", Role::Student).await;

    let (status, body) = post(&app, "/api/v1/chat/connect", Some(&student.token), json!({})).await;
    assert_eq!(status, 200, "{}", body);
    assert_eq!(body["apiKey"], "test-chat-key");
    assert_eq!(body["userId"], student.id().to_string());
    assert_eq!(body["userName"], "Stu Student");
    assert_eq!(body["userToken"], format!("chat-token-{}", student.id()));

    let upserted = ctx.chat.upserted.lock().unwrap().clone();
    assert_eq!(upserted, vec![student.id().to_string(), support.id().to_string()]);
}

#[actix_rt::test]
async fn test_directory_syncs_everyone() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let admin = ctx.user("Ada Admin", Role::Admin).await;
    ctx.user("Stu Student", Role::Student).await;

    let (status, users) = get(&app, "/api/v1/chat/users", Some(&admin.token)).await;
    assert_eq!(status, 200);
    assert_eq!(users.as_array().unwrap().len(), 2);
    assert_eq!(users[1]["role"], "student");
    assert_eq!(ctx.chat.upserted.lock().unwrap().len(), 2);
}

#[actix_rt::test]
async fn test_direct_channel() {
    let ctx = TestContext::new();
    let app = ctx.app().await;
    let alice = ctx.user("Alice Student", Role::Student).await;
    let sam = ctx.user("Sam Supervisor", Role::Supervisor).await;

    let (status, channel) = post(
        &app,
        "/api/v1/chat/channels/direct",
        Some(&alice.token),
        json!({ "targetUserId": sam.id() }),
    )
    .await;
    assert_eq!(status, 200, "{}", channel);
    assert_eq!(channel["type"], "messaging");
    assert_eq!(channel["name"], "Alice Student & Sam Supervisor");

    let mut members = vec![alice.id().to_string(), sam.id().to_string()];
    members.sort();
    assert_eq!(channel["id"], short_id(&members.join("-")));

    let (_, reverse) = post(
        &app,
        "/api/v1/chat/channels/direct",
        Some(&sam.token),
        json!({ "targetUserId": alice.id() }),
    )
    .await;
    assert_eq!(reverse["id"], channel["id"]);

    let (status, body) = post(
        &app,
        "/api/v1/chat/channels/direct",
        Some(&alice.token),
        json!({ "targetUserId": alice.id() }),
    )
    .await;
    assert_error(status, &body, 400, "VALIDATION_ERROR");

    let (status, body) = post(
        &app,
        "/api/v1/chat/channels/direct",
        Some(&alice.token),
        json!({ "targetUserId": Uuid::new_v4() }),
    )
    .await;
    assert_error(status, &body, 404, "NOT_FOUND");
}

#[actix_rt::test]
async fn test_missing_chat_credentials_are_reported() {
    let ctx = TestContext::new();
    let app = ctx.app_with_chat(Arc::new(UnconfiguredChat)).await;
    let student = ctx.user("Stu Student", Role::Student).await;

    let (status, body) = post(&app, "/api/v1/chat/connect", Some(&student.token), json!({})).await;
    assert_error(status, &body, 500, "SERVER_MISCONFIGURED");
}
