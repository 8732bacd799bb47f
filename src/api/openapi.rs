//! OpenAPI documentation configuration.

use actix_web::{HttpResponse, get, web};
use utoipa::OpenApi;

use crate::config::SESSION_COOKIE;
use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Video Feedback Server",
        version = "0.1.0",
        description = "Video mentorship API: student uploads, supervisor feedback, challenges and chat"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Auth endpoints
        api::auth::sign_up,
        api::auth::sign_in,
        api::auth::sign_out,
        api::auth::me,
        // User endpoints
        api::users::list_users,
        api::users::get_user,
        api::users::update_user_role,
        // Video endpoints
        api::videos::list_own_videos,
        api::videos::create_video,
        api::videos::list_review_videos,
        api::videos::get_own_video,
        api::videos::add_note,
        api::uploads::request_upload,
        // Challenge endpoints
        api::challenges::list_challenges,
        api::challenges::create_challenge,
        api::challenges::submit_video,
        api::challenges::get_challenge,
        api::challenges::update_challenge,
        api::challenges::delete_challenge,
        api::submissions::save_feedback,
        // Chat endpoints
        api::chat::connect,
        api::chat::list_chat_users,
        api::chat::direct,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            api::auth::MessageResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Auth and users
            models::Role,
            models::Identity,
            models::User,
            models::UserWithCounts,
            models::UserDetail,
            models::user::UserVideoItem,
            models::user::UserNoteItem,
            models::user::SignUpRequest,
            models::user::SignInRequest,
            models::user::SessionResponse,
            models::user::UpdateUserRoleRequest,
            models::user::UserResponse,
            api::auth::MeResponse,
            // Videos
            models::Video,
            models::VideoNote,
            models::NoteView,
            models::VideoWithNotes,
            models::PersonRef,
            models::ReviewVideo,
            models::video::CreateVideoRequest,
            models::video::CreateVideoResponse,
            models::video::CreateNoteRequest,
            models::video::FeedbackRequest,
            models::video::FeedbackResponse,
            models::UploadSlot,
            models::upload::UploadSlotRequest,
            // Challenges
            models::ChallengeState,
            models::Challenge,
            models::CreatorRef,
            models::Submission,
            models::FeedbackView,
            models::SubmissionDetail,
            models::ChallengeResponse,
            models::challenge::CreateChallengeRequest,
            models::challenge::UpdateChallengeRequest,
            models::challenge::SubmitVideoRequest,
            models::challenge::SubmitVideoResponse,
            // Chat
            models::ChatUser,
            models::ChatConnectResponse,
            models::DirectChannel,
            models::chat::DirectChannelRequest,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Sign-up, sign-in and session"),
        (name = "Users", description = "User administration"),
        (name = "Videos", description = "Uploads, own videos, review and annotations"),
        (name = "Challenges", description = "Challenges, submissions and feedback"),
        (name = "Chat", description = "Chat provider bridge")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add session security schemes.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder};
        use utoipa::openapi::security::SecurityScheme;

        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
            );
        }
    }
}

/// Serve the generated OpenAPI document.
#[get("/openapi.json")]
pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Configure the OpenAPI route.
pub fn configure_openapi_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(openapi_json);
}
