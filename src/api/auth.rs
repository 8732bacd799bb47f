//! Session lifecycle endpoints.
//!
//! - POST /auth/sign-up: create a student or supervisor account
//! - POST /auth/sign-in: exchange email and password for a session
//! - POST /auth/sign-out: clear the session cookie
//! - GET /auth/me: current identity, or `null`

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{HttpResponse, get, post, web};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::{MaybeSession, SessionKeys};
use crate::config::{Config, SESSION_COOKIE};
use crate::db::Repository;
use crate::error::AppResult;
use crate::models::user::{SessionResponse, SignInRequest, SignUpRequest};
use crate::models::{Identity, User};
use crate::services::accounts;

/// Configure auth routes.
pub fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(sign_up)
        .service(sign_in)
        .service(sign_out)
        .service(me);
}

#[derive(Serialize, ToSchema)]
pub struct MeResponse {
    pub user: Option<Identity>,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

fn session_cookie(value: String, max_age: CookieDuration, config: &Config) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(config.environment.is_production());
    cookie.set_max_age(max_age);
    cookie
}

fn start_session(
    user: &User,
    keys: &SessionKeys,
    config: &Config,
) -> AppResult<(Cookie<'static>, SessionResponse)> {
    let identity = user.identity();
    let token = keys.issue(&identity)?;
    let cookie = session_cookie(
        token.clone(),
        CookieDuration::seconds(keys.ttl_secs() as i64),
        config,
    );
    Ok((
        cookie,
        SessionResponse {
            token,
            user: identity,
        },
    ))
}

/// Create an account and start a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-up",
    tag = "Auth",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created", body = SessionResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    )
)]
#[post("/auth/sign-up")]
pub async fn sign_up(
    body: web::Json<SignUpRequest>,
    repo: web::Data<dyn Repository>,
    keys: web::Data<SessionKeys>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    let user = accounts::sign_up(repo.get_ref(), body.into_inner()).await?;
    let (cookie, session) = start_session(&user, &keys, &config)?;
    Ok(HttpResponse::Created().cookie(cookie).json(session))
}

/// Sign in with email and password.
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-in",
    tag = "Auth",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionResponse),
        (status = 401, description = "Invalid email or password")
    )
)]
#[post("/auth/sign-in")]
pub async fn sign_in(
    body: web::Json<SignInRequest>,
    repo: web::Data<dyn Repository>,
    keys: web::Data<SessionKeys>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    body.validate()?;
    let user = accounts::sign_in(repo.get_ref(), &body.email, &body.password).await?;
    let (cookie, session) = start_session(&user, &keys, &config)?;
    tracing::info!(user_id = %user.id, "User signed in");
    Ok(HttpResponse::Ok().cookie(cookie).json(session))
}

/// Clear the session cookie. Tokens already issued stay valid until expiry.
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-out",
    tag = "Auth",
    responses(
        (status = 200, description = "Signed out", body = MessageResponse)
    )
)]
#[post("/auth/sign-out")]
pub async fn sign_out(config: web::Data<Config>) -> HttpResponse {
    let clear = session_cookie(String::new(), CookieDuration::ZERO, &config);
    HttpResponse::Ok().cookie(clear).json(MessageResponse {
        message: "Signed out.".to_string(),
    })
}

/// Current identity. Anonymous callers get `{"user": null}`.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current identity", body = MeResponse)
    )
)]
#[get("/auth/me")]
pub async fn me(session: MaybeSession) -> HttpResponse {
    HttpResponse::Ok().json(MeResponse { user: session.0 })
}
