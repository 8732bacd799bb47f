//! Actix-web extractors resolving the session of a request.
//!
//! The token is read from the `Authorization: Bearer` header first, then
//! from the session cookie. A verified token only names the user; name,
//! email and role are reloaded from the repository on every request, so a
//! role change or removal takes effect on the next call.

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::LocalBoxFuture;

use super::policy::{Action, authorize};
use super::token::SessionKeys;
use crate::config::SESSION_COOKIE;
use crate::db::Repository;
use crate::error::{AppError, AppResult};
use crate::models::Identity;

fn session_token(req: &HttpRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    bearer.or_else(|| req.cookie(SESSION_COOKIE).map(|c| c.value().to_string()))
}

/// Verify the token, then load the current state of the user it names.
/// Unknown users and lookup failures resolve to anonymous.
async fn resolve(req: &HttpRequest) -> Option<Identity> {
    let keys = req.app_data::<web::Data<SessionKeys>>()?;
    let claimed = keys.resolve(&session_token(req)?)?;
    let repo = req.app_data::<web::Data<dyn Repository>>()?;

    match repo.find_user(claimed.id).await {
        Ok(Some(user)) => Some(user.identity()),
        Ok(None) => {
            tracing::debug!(user_id = %claimed.id, "Session names an unknown user");
            None
        }
        Err(e) => {
            tracing::error!(user_id = %claimed.id, "Session user lookup failed: {}", e);
            None
        }
    }
}

fn missing_state(req: &HttpRequest) -> Option<AppError> {
    if req.app_data::<web::Data<SessionKeys>>().is_none() {
        return Some(AppError::Misconfigured(
            "session keys are not registered".to_string(),
        ));
    }
    if req.app_data::<web::Data<dyn Repository>>().is_none() {
        return Some(AppError::Misconfigured(
            "repository is not registered".to_string(),
        ));
    }
    None
}

/// Optional session. Never fails; anonymous callers carry `None`.
///
/// ```ignore
/// async fn handler(session: MaybeSession) -> AppResult<HttpResponse> {
///     let me = session.authorize(Action::ScoreVideo)?;
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<Identity>);

impl MaybeSession {
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }

    pub fn authorize(&self, action: Action) -> AppResult<&Identity> {
        authorize(self.identity(), action)
    }
}

impl FromRequest for MaybeSession {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { Ok(MaybeSession(resolve(&req).await)) })
    }
}

/// Required session. Anonymous callers are rejected with 401.
#[derive(Debug, Clone)]
pub struct Session {
    pub identity: Identity,
}

impl Session {
    pub fn authorize(&self, action: Action) -> AppResult<&Identity> {
        authorize(Some(&self.identity), action)
    }
}

impl FromRequest for Session {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            if let Some(err) = missing_state(&req) {
                return Err(err);
            }
            resolve(&req)
                .await
                .map(|identity| Session { identity })
                .ok_or(AppError::Unauthenticated)
        })
    }
}
