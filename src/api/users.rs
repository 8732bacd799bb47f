//! User administration endpoints (admin only).

use actix_web::{HttpResponse, get, patch, web};

use crate::api::{json_body, path_id};
use crate::auth::{Action, MaybeSession};
use crate::db::Repository;
use crate::error::{AppError, AppResult};
use crate::models::user::{UpdateUserRoleRequest, UserResponse};
use crate::models::{UserDetail, UserWithCounts};
use crate::services::accounts;

/// Configure user routes.
pub fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_users)
        .service(get_user)
        .service(update_user_role);
}

/// List users, newest first, with video and note counts.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    responses(
        (status = 200, description = "Users", body = [UserWithCounts]),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin role required")
    )
)]
#[get("/users")]
pub async fn list_users(
    session: MaybeSession,
    repo: web::Data<dyn Repository>,
) -> AppResult<HttpResponse> {
    session.authorize(Action::ManageUsers)?;
    let users = repo.list_users_with_counts().await?;
    Ok(HttpResponse::Ok().json(users))
}

/// User detail with uploaded videos and authored notes.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = uuid::Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User detail", body = UserDetail),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found")
    )
)]
#[get("/users/{id}")]
pub async fn get_user(
    session: MaybeSession,
    path: web::Path<String>,
    repo: web::Data<dyn Repository>,
) -> AppResult<HttpResponse> {
    session.authorize(Action::ManageUsers)?;
    let detail = repo
        .find_user_detail(path_id(&path)?)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;
    Ok(HttpResponse::Ok().json(detail))
}

/// Change a user's role.
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = uuid::Uuid, Path, description = "User id")),
    request_body = UpdateUserRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = UserResponse),
        (status = 400, description = "Invalid role"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found")
    )
)]
#[patch("/users/{id}")]
pub async fn update_user_role(
    session: MaybeSession,
    path: web::Path<String>,
    body: web::Bytes,
    repo: web::Data<dyn Repository>,
) -> AppResult<HttpResponse> {
    session.authorize(Action::ManageUsers)?;
    let id = path_id(&path)?;
    let req: UpdateUserRoleRequest = json_body(&body)?;
    let user = accounts::change_role(repo.get_ref(), id, req.role.as_deref()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}
