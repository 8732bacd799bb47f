//! Video endpoints.
//!
//! Students see only their own videos; supervisors review every video;
//! staff annotate.

use actix_web::{HttpResponse, get, post, web};
use validator::Validate;

use crate::api::{json_body, path_id};
use crate::auth::{Action, MaybeSession};
use crate::config::Config;
use crate::db::Repository;
use crate::error::{AppError, AppResult};
use crate::models::video::{CreateNoteRequest, CreateVideoRequest, CreateVideoResponse};
use crate::models::{NewVideo, ReviewVideo, VideoNote, VideoWithNotes};
use crate::services::{feedback, storage};

/// Configure video routes. `/videos/review` is registered ahead of
/// `/videos/{id}`.
pub fn configure_video_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_own_videos)
        .service(create_video)
        .service(list_review_videos)
        .service(get_own_video)
        .service(add_note);
}

/// The caller's videos, newest first, with notes.
#[utoipa::path(
    get,
    path = "/api/v1/videos",
    tag = "Videos",
    responses(
        (status = 200, description = "Own videos", body = [VideoWithNotes]),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Student role required")
    )
)]
#[get("/videos")]
pub async fn list_own_videos(
    session: MaybeSession,
    repo: web::Data<dyn Repository>,
) -> AppResult<HttpResponse> {
    let me = session.authorize(Action::ListOwnVideos)?;
    let videos = repo.list_videos_by_owner(me.id).await?;
    Ok(HttpResponse::Ok().json(videos))
}

/// Record an uploaded video. The object itself is not checked.
#[utoipa::path(
    post,
    path = "/api/v1/videos",
    tag = "Videos",
    request_body = CreateVideoRequest,
    responses(
        (status = 201, description = "Video recorded", body = CreateVideoResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Student role required")
    )
)]
#[post("/videos")]
pub async fn create_video(
    session: MaybeSession,
    body: web::Bytes,
    repo: web::Data<dyn Repository>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    let me = session.authorize(Action::UploadVideo)?;
    let req: CreateVideoRequest = json_body(&body)?;
    req.validate()?;
    storage::validate_object_key(&config.storage.upload_prefix, &req.object_key)?;

    let video = repo
        .insert_video(NewVideo {
            title: req.title,
            description: req.description,
            object_key: req.object_key,
            file_size: req.file_size,
            content_type: req.content_type,
            user_id: me.id,
        })
        .await?;

    tracing::info!(video_id = %video.id, user_id = %me.id, "Video recorded");
    Ok(HttpResponse::Created().json(CreateVideoResponse {
        message: "Video uploaded successfully.".to_string(),
        video_id: video.id,
    }))
}

/// Every video with its uploader and notes, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/videos/review",
    tag = "Videos",
    responses(
        (status = 200, description = "Videos to review", body = [ReviewVideo]),
        (status = 403, description = "Supervisor role required")
    )
)]
#[get("/videos/review")]
pub async fn list_review_videos(
    session: MaybeSession,
    repo: web::Data<dyn Repository>,
) -> AppResult<HttpResponse> {
    session.authorize(Action::ReviewAllVideos)?;
    let videos = repo.list_videos_for_review().await?;
    Ok(HttpResponse::Ok().json(videos))
}

/// One of the caller's videos. Other users' videos are reported as missing.
#[utoipa::path(
    get,
    path = "/api/v1/videos/{id}",
    tag = "Videos",
    params(("id" = uuid::Uuid, Path, description = "Video id")),
    responses(
        (status = 200, description = "Video with notes", body = VideoWithNotes),
        (status = 403, description = "Student role required"),
        (status = 404, description = "Video not found")
    )
)]
#[get("/videos/{id}")]
pub async fn get_own_video(
    session: MaybeSession,
    path: web::Path<String>,
    repo: web::Data<dyn Repository>,
) -> AppResult<HttpResponse> {
    let me = session.authorize(Action::ListOwnVideos)?;
    let video = repo
        .find_owned_video(path_id(&path)?, me.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Video".to_string()))?;
    Ok(HttpResponse::Ok().json(video))
}

/// Add an annotation to a video.
#[utoipa::path(
    post,
    path = "/api/v1/videos/{id}/notes",
    tag = "Videos",
    params(("id" = uuid::Uuid, Path, description = "Video id")),
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note added", body = VideoNote),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Supervisor or admin role required"),
        (status = 404, description = "Video not found")
    )
)]
#[post("/videos/{id}/notes")]
pub async fn add_note(
    session: MaybeSession,
    path: web::Path<String>,
    body: web::Bytes,
    repo: web::Data<dyn Repository>,
) -> AppResult<HttpResponse> {
    let me = session.authorize(Action::AnnotateVideo)?;
    let video_id = path_id(&path)?;
    let req: CreateNoteRequest = json_body(&body)?;
    req.validate()?;
    if req.content.trim().is_empty() {
        return Err(AppError::invalid_field("content", "Note content is required."));
    }

    let note = feedback::annotate(
        repo.get_ref(),
        me,
        video_id,
        req.content,
        req.timestamp_ms,
    )
    .await?;
    Ok(HttpResponse::Created().json(note))
}
