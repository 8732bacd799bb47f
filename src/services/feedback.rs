//! Feedback workflow: one scored note per video, last writer wins.

use uuid::Uuid;

use crate::db::Repository;
use crate::error::{AppError, AppResult};
use crate::models::video::{Feedback, FeedbackRequest};
use crate::models::{Identity, NewNote, VideoNote};

/// Validate the request body before anything is looked up.
pub fn validate(req: FeedbackRequest) -> AppResult<Feedback> {
    let (Some(score), Some(note)) = (req.score, req.note) else {
        return Err(AppError::invalid("Score and note are required."));
    };

    let score = score
        .as_i64()
        .filter(|s| (0..=100).contains(s))
        .ok_or_else(|| {
            AppError::invalid_field("score", "Score must be an integer between 0 and 100.")
        })?;

    if note.trim().is_empty() {
        return Err(AppError::invalid_field("note", "Note must not be empty."));
    }

    Ok(Feedback {
        score: score as i32,
        note,
    })
}

/// Record feedback for the video behind `submission_id`.
pub async fn save(
    repo: &dyn Repository,
    supervisor: &Identity,
    submission_id: Uuid,
    feedback: Feedback,
) -> AppResult<VideoNote> {
    let submission = repo
        .find_submission(submission_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Submission".to_string()))?;

    let note = repo
        .upsert_feedback(
            submission.video_id,
            supervisor.id,
            feedback.score,
            feedback.note,
        )
        .await?;

    tracing::info!(
        video_id = %submission.video_id,
        supervisor = %supervisor.id,
        score = feedback.score,
        "Feedback saved"
    );
    Ok(note)
}

/// Add an un-scored annotation to a video.
pub async fn annotate(
    repo: &dyn Repository,
    supervisor: &Identity,
    video_id: Uuid,
    content: String,
    timestamp_ms: Option<i64>,
) -> AppResult<VideoNote> {
    if repo.find_video(video_id).await?.is_none() {
        return Err(AppError::NotFound("Video".to_string()));
    }

    repo.insert_note(NewNote {
        content,
        timestamp_ms,
        supervisor_id: supervisor.id,
        video_id,
    })
    .await
}
