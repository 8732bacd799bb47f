//! Video and note models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Video stored in database.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub object_key: String,
    pub file_size: i64,
    pub content_type: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a finalized upload.
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub title: String,
    pub description: Option<String>,
    pub object_key: String,
    pub file_size: i64,
    pub content_type: String,
    pub user_id: Uuid,
}

/// Supervisor note attached to a video. A note with a score is the
/// video's feedback record.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoNote {
    pub id: Uuid,
    pub content: String,
    pub timestamp_ms: Option<i64>,
    pub supervisor_id: Uuid,
    pub video_id: Uuid,
    pub score: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for an annotation.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub content: String,
    pub timestamp_ms: Option<i64>,
    pub supervisor_id: Uuid,
    pub video_id: Uuid,
}

/// Note with the authoring supervisor's name.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteView {
    #[serde(flatten)]
    pub note: VideoNote,
    pub supervisor_name: String,
}

/// Video with its notes in chronological order.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoWithNotes {
    #[serde(flatten)]
    pub video: Video,
    pub notes: Vec<NoteView>,
}

/// Uploader reference.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PersonRef {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Video as listed for supervisor review.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewVideo {
    #[serde(flatten)]
    pub video: Video,
    pub uploader: PersonRef,
    /// Newest first.
    pub notes: Vec<NoteView>,
}

/// Finalize an upload by recording the video metadata.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVideoRequest {
    #[validate(length(min = 1, message = "Title is required."))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Object key is required."))]
    pub object_key: String,
    #[validate(range(min = 1, message = "File size must be a positive integer."))]
    pub file_size: i64,
    #[validate(length(min = 1, message = "Content type is required."))]
    pub content_type: String,
}

/// Response after a video is recorded.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVideoResponse {
    pub message: String,
    pub video_id: Uuid,
}

/// Annotation request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    #[validate(length(min = 1, message = "Note content is required."))]
    pub content: String,
    #[validate(range(min = 0, message = "Timestamp must not be negative."))]
    pub timestamp_ms: Option<i64>,
}

/// Feedback request: both fields are required.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FeedbackRequest {
    #[schema(value_type = Option<i32>)]
    pub score: Option<serde_json::Number>,
    pub note: Option<String>,
}

/// Validated feedback values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub score: i32,
    pub note: String,
}

/// Response after feedback is saved.
#[derive(Debug, Serialize, ToSchema)]
pub struct FeedbackResponse {
    pub message: String,
    pub feedback: VideoNote,
}
