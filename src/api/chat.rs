//! Chat bridge endpoints.

use actix_web::{HttpResponse, get, post, web};
use uuid::Uuid;

use crate::api::json_body;
use crate::auth::{Action, MaybeSession};
use crate::config::Config;
use crate::db::Repository;
use crate::error::{AppError, AppResult};
use crate::models::chat::DirectChannelRequest;
use crate::models::{ChatConnectResponse, ChatUser, DirectChannel, Identity};
use crate::services::chat::{self, ChatProvider};

/// Configure chat routes.
pub fn configure_chat_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(connect).service(list_chat_users).service(direct);
}

/// The caller plus every configured support member that exists locally.
async fn connect_roster(
    repo: &dyn Repository,
    me: &Identity,
    support_ids: &[String],
) -> AppResult<Vec<ChatUser>> {
    let mut roster = vec![ChatUser::from(me)];
    for raw in support_ids {
        let Ok(id) = Uuid::parse_str(raw) else {
            tracing::warn!(member = %raw, "Ignoring malformed support member id");
            continue;
        };
        if id == me.id {
            continue;
        }
        match repo.find_user(id).await? {
            Some(user) => roster.push(ChatUser::from(&user.identity())),
            None => tracing::warn!(member = %id, "Support member not found"),
        }
    }
    Ok(roster)
}

/// Sync the caller to the chat provider and mint a chat token.
#[utoipa::path(
    post,
    path = "/api/v1/chat/connect",
    tag = "Chat",
    responses(
        (status = 200, description = "Chat credentials", body = ChatConnectResponse),
        (status = 401, description = "Authentication required"),
        (status = 500, description = "Chat provider unavailable or not configured")
    )
)]
#[post("/chat/connect")]
pub async fn connect(
    session: MaybeSession,
    repo: web::Data<dyn Repository>,
    provider: web::Data<dyn ChatProvider>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    let me = session.authorize(Action::UseChat)?;
    let api_key = provider.api_key()?.to_string();

    let roster = connect_roster(repo.get_ref(), me, &config.chat.support_member_ids).await?;
    provider.upsert_users(&roster).await?;

    let user_id = me.id.to_string();
    let user_token = provider.create_user_token(&user_id)?;

    Ok(HttpResponse::Ok().json(ChatConnectResponse {
        api_key,
        user_token,
        user_id,
        user_name: me.name.clone(),
    }))
}

/// Chat directory. Every listed user is synced to the provider first.
#[utoipa::path(
    get,
    path = "/api/v1/chat/users",
    tag = "Chat",
    responses(
        (status = 200, description = "Chat directory", body = [ChatUser]),
        (status = 401, description = "Authentication required")
    )
)]
#[get("/chat/users")]
pub async fn list_chat_users(
    session: MaybeSession,
    repo: web::Data<dyn Repository>,
    provider: web::Data<dyn ChatProvider>,
) -> AppResult<HttpResponse> {
    session.authorize(Action::UseChat)?;
    let users: Vec<ChatUser> = repo
        .list_users()
        .await?
        .iter()
        .map(|u| ChatUser::from(&u.identity()))
        .collect();

    provider.upsert_users(&users).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// Descriptor of the caller's direct channel with another user.
#[utoipa::path(
    post,
    path = "/api/v1/chat/channels/direct",
    tag = "Chat",
    request_body = DirectChannelRequest,
    responses(
        (status = 200, description = "Direct channel", body = DirectChannel),
        (status = 400, description = "Missing target or chatting with oneself"),
        (status = 404, description = "Target user not found")
    )
)]
#[post("/chat/channels/direct")]
pub async fn direct(
    session: MaybeSession,
    body: web::Bytes,
    repo: web::Data<dyn Repository>,
) -> AppResult<HttpResponse> {
    let me = session.authorize(Action::UseChat)?;
    let req: DirectChannelRequest = json_body(&body)?;
    let target_id = req
        .target_user_id
        .ok_or_else(|| AppError::invalid_field("targetUserId", "Target user is required."))?;
    if target_id == me.id {
        return Err(AppError::invalid("You cannot start a chat with yourself."));
    }

    let target = repo
        .find_user(target_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    let channel = chat::direct_channel(&ChatUser::from(me), &ChatUser::from(&target.identity()))?;
    Ok(HttpResponse::Ok().json(channel))
}
