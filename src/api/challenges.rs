//! Challenge endpoints.
//!
//! Listing and detail are open to everyone, but only staff see inactive or
//! ended challenges and submissions. Mutations are admin only; submitting
//! is student only.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::Utc;
use uuid::Uuid;

use crate::api::auth::MessageResponse;
use crate::api::{json_body, path_id};
use crate::auth::{Action, MaybeSession};
use crate::db::Repository;
use crate::error::AppResult;
use crate::models::ChallengeResponse;
use crate::models::challenge::{
    CreateChallengeRequest, SubmitVideoRequest, SubmitVideoResponse, UpdateChallengeRequest,
};
use crate::services::challenges;

/// Configure challenge routes. `/challenges/submissions` is registered
/// ahead of `/challenges/{id}`.
pub fn configure_challenge_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_challenges)
        .service(create_challenge)
        .service(submit_video)
        .service(get_challenge)
        .service(update_challenge)
        .service(delete_challenge);
}

/// List challenges visible to the caller.
#[utoipa::path(
    get,
    path = "/api/v1/challenges",
    tag = "Challenges",
    responses(
        (status = 200, description = "Challenges", body = [ChallengeResponse])
    )
)]
#[get("/challenges")]
pub async fn list_challenges(
    session: MaybeSession,
    repo: web::Data<dyn Repository>,
) -> AppResult<HttpResponse> {
    let list = challenges::list_visible(repo.get_ref(), session.identity(), Utc::now()).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// Create a challenge.
#[utoipa::path(
    post,
    path = "/api/v1/challenges",
    tag = "Challenges",
    request_body = CreateChallengeRequest,
    responses(
        (status = 201, description = "Challenge created", body = ChallengeResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin role required")
    )
)]
#[post("/challenges")]
pub async fn create_challenge(
    session: MaybeSession,
    body: web::Bytes,
    repo: web::Data<dyn Repository>,
) -> AppResult<HttpResponse> {
    let me = session.authorize(Action::ManageChallenges)?;
    let req: CreateChallengeRequest = json_body(&body)?;
    let challenge = challenges::create(repo.get_ref(), me, req).await?;
    Ok(HttpResponse::Created().json(ChallengeResponse::new(challenge, Utc::now())))
}

/// Submit one of the caller's videos to an open challenge.
#[utoipa::path(
    post,
    path = "/api/v1/challenges/submissions",
    tag = "Challenges",
    request_body = SubmitVideoRequest,
    responses(
        (status = 201, description = "Video submitted", body = SubmitVideoResponse),
        (status = 400, description = "Missing ids"),
        (status = 403, description = "Not open, not the caller's video, or not a student"),
        (status = 404, description = "Challenge not found"),
        (status = 409, description = "Already submitted")
    )
)]
#[post("/challenges/submissions")]
pub async fn submit_video(
    session: MaybeSession,
    body: web::Bytes,
    repo: web::Data<dyn Repository>,
) -> AppResult<HttpResponse> {
    let me = session.authorize(Action::SubmitToChallenge)?;
    let req: SubmitVideoRequest = json_body(&body)?;
    let (submission, challenge) = challenges::submit_video(
        repo.get_ref(),
        me,
        req.video_id,
        req.challenge_id,
        Utc::now(),
    )
    .await?;

    Ok(HttpResponse::Created().json(SubmitVideoResponse {
        message: format!(
            "Video submitted successfully to \"{}\" challenge.",
            challenge.title
        ),
        submission_id: submission.id,
    }))
}

/// Challenge detail. Staff also get the submissions.
#[utoipa::path(
    get,
    path = "/api/v1/challenges/{id}",
    tag = "Challenges",
    params(("id" = Uuid, Path, description = "Challenge id")),
    responses(
        (status = 200, description = "Challenge", body = ChallengeResponse),
        (status = 404, description = "Challenge not found or not visible")
    )
)]
#[get("/challenges/{id}")]
pub async fn get_challenge(
    session: MaybeSession,
    path: web::Path<Uuid>,
    repo: web::Data<dyn Repository>,
) -> AppResult<HttpResponse> {
    let challenge = challenges::get_visible(
        repo.get_ref(),
        session.identity(),
        path.into_inner(),
        Utc::now(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(challenge))
}

/// Partially update a challenge.
#[utoipa::path(
    put,
    path = "/api/v1/challenges/{id}",
    tag = "Challenges",
    params(("id" = Uuid, Path, description = "Challenge id")),
    request_body = UpdateChallengeRequest,
    responses(
        (status = 200, description = "Challenge updated", body = ChallengeResponse),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Challenge not found")
    )
)]
#[put("/challenges/{id}")]
pub async fn update_challenge(
    session: MaybeSession,
    path: web::Path<String>,
    body: web::Bytes,
    repo: web::Data<dyn Repository>,
) -> AppResult<HttpResponse> {
    session.authorize(Action::ManageChallenges)?;
    let id = path_id(&path)?;
    let req: UpdateChallengeRequest = json_body(&body)?;
    let challenge = challenges::update(repo.get_ref(), id, req).await?;
    Ok(HttpResponse::Ok().json(ChallengeResponse::new(challenge, Utc::now())))
}

/// Delete a challenge and its submissions.
#[utoipa::path(
    delete,
    path = "/api/v1/challenges/{id}",
    tag = "Challenges",
    params(("id" = Uuid, Path, description = "Challenge id")),
    responses(
        (status = 200, description = "Challenge deleted", body = MessageResponse),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Challenge not found")
    )
)]
#[delete("/challenges/{id}")]
pub async fn delete_challenge(
    session: MaybeSession,
    path: web::Path<String>,
    repo: web::Data<dyn Repository>,
) -> AppResult<HttpResponse> {
    session.authorize(Action::ManageChallenges)?;
    challenges::delete(repo.get_ref(), path_id(&path)?).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Challenge deleted successfully.".to_string(),
    }))
}
