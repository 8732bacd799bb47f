//! Challenge workflow: visibility by role, creation rules and submission
//! admission.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::auth::Action;
use crate::db::Repository;
use crate::error::{AppError, AppResult};
use crate::models::challenge::{CreateChallengeRequest, UpdateChallengeRequest};
use crate::models::{
    Challenge, ChallengePatch, ChallengeResponse, Identity, NewChallenge, Submission,
};

pub const NOT_OPEN: &str = "This challenge is not currently open for submissions.";
pub const NOT_YOUR_VIDEO: &str = "You can only submit your own videos.";

fn is_staff(identity: Option<&Identity>) -> bool {
    identity.is_some_and(|i| i.role.can(Action::ReviewChallenges))
}

/// Staff see every challenge with creator and submission count; everyone
/// else sees active, not yet ended challenges.
pub async fn list_visible(
    repo: &dyn Repository,
    identity: Option<&Identity>,
    now: DateTime<Utc>,
) -> AppResult<Vec<ChallengeResponse>> {
    if is_staff(identity) {
        let summaries = repo.list_challenges().await?;
        return Ok(summaries
            .into_iter()
            .map(|s| ChallengeResponse::from_summary(s, now))
            .collect());
    }

    let active = repo.list_active_challenges(now).await?;
    Ok(active
        .into_iter()
        .map(|c| ChallengeResponse::new(c, now))
        .collect())
}

/// Detail view. Hidden challenges are `NotFound` for non-staff.
pub async fn get_visible(
    repo: &dyn Repository,
    identity: Option<&Identity>,
    id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<ChallengeResponse> {
    let challenge = repo
        .find_challenge(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Challenge".to_string()))?;

    if !is_staff(identity) {
        if !challenge.is_publicly_listed(now) {
            return Err(AppError::NotFound("Challenge".to_string()));
        }
        return Ok(ChallengeResponse::new(challenge, now));
    }

    let submissions = repo.list_challenge_submissions(id).await?;
    let mut response = ChallengeResponse::new(challenge, now);
    response.submission_count = Some(submissions.len() as i64);
    response.submissions = Some(submissions);
    Ok(response)
}

/// Create a challenge. Title, start and end are required; end is not
/// required to follow start.
pub async fn create(
    repo: &dyn Repository,
    creator: &Identity,
    req: CreateChallengeRequest,
) -> AppResult<Challenge> {
    req.validate()?;
    let start_date = req
        .start_date
        .ok_or_else(|| AppError::invalid_field("startDate", "Start date is required."))?;
    let end_date = req
        .end_date
        .ok_or_else(|| AppError::invalid_field("endDate", "End date is required."))?;

    let challenge = repo
        .insert_challenge(NewChallenge {
            title: req.title,
            description: req.description,
            start_date,
            end_date,
            is_active: req.is_active.unwrap_or(true),
            creator_id: creator.id,
        })
        .await?;

    tracing::info!(challenge_id = %challenge.id, creator = %creator.id, "Challenge created");
    Ok(challenge)
}

/// Partial update. A present title must not be blank.
pub async fn update(
    repo: &dyn Repository,
    id: Uuid,
    req: UpdateChallengeRequest,
) -> AppResult<Challenge> {
    if req.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(AppError::invalid_field("title", "Title must not be empty."));
    }

    let challenge = repo.update_challenge(id, ChallengePatch::from(req)).await?;
    tracing::info!(challenge_id = %id, "Challenge updated");
    Ok(challenge)
}

/// Delete a challenge together with its submissions.
pub async fn delete(repo: &dyn Repository, id: Uuid) -> AppResult<()> {
    repo.delete_challenge(id).await
}

/// Admit a student's video into a challenge.
///
/// Checks run in order: ids present, challenge exists, challenge open,
/// video owned by the caller, pair not yet submitted.
pub async fn submit_video(
    repo: &dyn Repository,
    student: &Identity,
    video_id: Option<Uuid>,
    challenge_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> AppResult<(Submission, Challenge)> {
    let (Some(video_id), Some(challenge_id)) = (video_id, challenge_id) else {
        return Err(AppError::invalid(
            "Video ID and Challenge ID are required.",
        ));
    };

    let challenge = repo
        .find_challenge(challenge_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Challenge".to_string()))?;

    if !challenge.state_at(now).accepts_submissions() {
        return Err(AppError::Forbidden(NOT_OPEN.to_string()));
    }

    match repo.find_video(video_id).await? {
        Some(video) if video.user_id == student.id => {}
        _ => return Err(AppError::Forbidden(NOT_YOUR_VIDEO.to_string())),
    }

    let submission = repo.insert_submission(challenge_id, video_id).await?;
    tracing::info!(
        submission_id = %submission.id,
        challenge_id = %challenge_id,
        video_id = %video_id,
        "Video submitted to challenge"
    );
    Ok((submission, challenge))
}
