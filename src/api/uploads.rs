//! Upload slot endpoint.

use actix_web::{HttpResponse, post, web};

use crate::api::json_body;
use crate::auth::{Action, MaybeSession};
use crate::config::Config;
use crate::error::AppResult;
use crate::models::UploadSlot;
use crate::models::upload::UploadSlotRequest;
use crate::services::storage::{self, ObjectStore};

/// Configure upload routes.
pub fn configure_upload_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(request_upload);
}

/// Issue a pre-signed URL the client uses to `PUT` the video.
#[utoipa::path(
    post,
    path = "/api/v1/uploads",
    tag = "Videos",
    request_body = UploadSlotRequest,
    responses(
        (status = 200, description = "Upload credential", body = UploadSlot),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Student role required"),
        (status = 500, description = "Object store unavailable")
    )
)]
#[post("/uploads")]
pub async fn request_upload(
    session: MaybeSession,
    body: web::Bytes,
    store: web::Data<dyn ObjectStore>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    let me = session.authorize(Action::UploadVideo)?;
    let req: UploadSlotRequest = json_body(&body)?;
    let slot =
        storage::request_upload_slot(store.get_ref(), &config.storage.upload_prefix, &req).await?;

    tracing::info!(user_id = %me.id, object_key = %slot.object_key, "Upload slot issued");
    Ok(HttpResponse::Ok().json(slot))
}
