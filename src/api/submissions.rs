//! Submission feedback endpoint.

use actix_web::{HttpResponse, put, web};

use crate::api::{json_body, path_id};
use crate::auth::{Action, MaybeSession};
use crate::db::Repository;
use crate::error::AppResult;
use crate::models::video::{FeedbackRequest, FeedbackResponse};
use crate::services::feedback;

/// Configure submission routes.
pub fn configure_submission_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(save_feedback);
}

/// Create or replace the feedback of the submitted video.
///
/// Feedback belongs to the video: submitting the same video to two
/// challenges shares one feedback record.
#[utoipa::path(
    put,
    path = "/api/v1/submissions/{id}/feedback",
    tag = "Challenges",
    params(("id" = uuid::Uuid, Path, description = "Submission id")),
    request_body = FeedbackRequest,
    responses(
        (status = 200, description = "Feedback saved", body = FeedbackResponse),
        (status = 400, description = "Invalid score or note"),
        (status = 403, description = "Supervisor or admin role required"),
        (status = 404, description = "Submission not found")
    )
)]
#[put("/submissions/{id}/feedback")]
pub async fn save_feedback(
    session: MaybeSession,
    path: web::Path<String>,
    body: web::Bytes,
    repo: web::Data<dyn Repository>,
) -> AppResult<HttpResponse> {
    let me = session.authorize(Action::ScoreVideo)?;
    let submission_id = path_id(&path)?;
    let values = feedback::validate(json_body::<FeedbackRequest>(&body)?)?;
    let note = feedback::save(repo.get_ref(), me, submission_id, values).await?;

    Ok(HttpResponse::Ok().json(FeedbackResponse {
        message: "Feedback saved successfully.".to_string(),
        feedback: note,
    }))
}
