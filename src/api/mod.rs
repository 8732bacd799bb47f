//! API endpoint modules.

pub mod auth;
pub mod challenges;
pub mod chat;
pub mod health;
pub mod openapi;
pub mod submissions;
pub mod uploads;
pub mod users;
pub mod videos;

use actix_web::web;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::{
    AppError, AppResult, json_error_handler, path_error_handler, query_error_handler,
};

pub use auth::configure_auth_routes;
pub use challenges::configure_challenge_routes;
pub use chat::configure_chat_routes;
pub use health::configure_health_routes;
pub use openapi::{ApiDoc, configure_openapi_routes};
pub use submissions::configure_submission_routes;
pub use uploads::configure_upload_routes;
pub use users::configure_user_routes;
pub use videos::configure_video_routes;

/// Mount every route group under `/api/v1`, with extractor errors mapped
/// into the common error envelope.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .configure(configure_health_routes)
            .configure(configure_openapi_routes)
            .configure(configure_auth_routes)
            .configure(configure_user_routes)
            .configure(configure_video_routes)
            .configure(configure_upload_routes)
            .configure(configure_challenge_routes)
            .configure(configure_submission_routes)
            .configure(configure_chat_routes),
    );
}

/// Decode a JSON request body.
///
/// Guarded handlers take the body as `web::Bytes` and decode it after
/// `authorize`, so a denied caller gets 401/403 whatever the body holds.
pub(crate) fn json_body<T: DeserializeOwned>(body: &web::Bytes) -> AppResult<T> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::invalid(format!("Invalid request body: {}", e)))
}

/// Parse an `{id}` path segment, after authorization like [`json_body`].
pub(crate) fn path_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::invalid_field("id", format!("Invalid id: {}", raw)))
}
