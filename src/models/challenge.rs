//! Challenge and submission models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::video::{PersonRef, Video, VideoNote};

/// Lifecycle state of a challenge, derived from its flags and the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeState {
    /// Inactive and not yet started.
    Draft,
    /// Active, start date in the future.
    Scheduled,
    /// Active and inside `[start, end)`. Only state accepting submissions.
    Open,
    /// Past its end date, or deactivated after it started.
    Closed,
}

impl ChallengeState {
    pub fn derive(
        is_active: bool,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        match (is_active, now < start, now < end) {
            (false, true, _) => Self::Draft,
            (false, false, _) => Self::Closed,
            (true, true, _) => Self::Scheduled,
            (true, false, true) => Self::Open,
            (true, false, false) => Self::Closed,
        }
    }

    pub fn accepts_submissions(&self) -> bool {
        matches!(self, Self::Open)
    }
}

/// Challenge stored in database.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Challenge {
    pub fn state_at(&self, now: DateTime<Utc>) -> ChallengeState {
        ChallengeState::derive(self.is_active, self.start_date, self.end_date, now)
    }

    /// Visible to callers without `ReviewChallenges`.
    pub fn is_publicly_listed(&self, now: DateTime<Utc>) -> bool {
        self.is_active && now < self.end_date
    }
}

/// Insert payload for a challenge.
#[derive(Debug, Clone)]
pub struct NewChallenge {
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub creator_id: Uuid,
}

/// Partial update. `None` leaves a field untouched; `description` uses
/// `Some(None)` to clear.
#[derive(Debug, Clone, Default)]
pub struct ChallengePatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

impl ChallengePatch {
    pub fn apply(self, challenge: &mut Challenge) {
        if let Some(title) = self.title {
            challenge.title = title;
        }
        if let Some(description) = self.description {
            challenge.description = description;
        }
        if let Some(start) = self.start_date {
            challenge.start_date = start;
        }
        if let Some(end) = self.end_date {
            challenge.end_date = end;
        }
        if let Some(active) = self.is_active {
            challenge.is_active = active;
        }
    }
}

/// Creator reference in staff listings.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatorRef {
    pub id: Uuid,
    pub name: String,
}

/// Challenge with creator and submission count.
#[derive(Debug, Clone)]
pub struct ChallengeSummary {
    pub challenge: Challenge,
    pub creator: Option<CreatorRef>,
    pub submission_count: i64,
}

/// Submission stored in database.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: Uuid,
    pub challenge_id: Uuid,
    pub video_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Feedback record with the scoring supervisor's name.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackView {
    #[serde(flatten)]
    pub note: VideoNote,
    pub supervisor_name: String,
}

/// Submission as shown to staff on the challenge detail.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDetail {
    #[serde(flatten)]
    pub submission: Submission,
    pub video: Video,
    pub uploader: PersonRef,
    pub feedback: Option<FeedbackView>,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Create request (admin).
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateChallengeRequest {
    #[validate(length(min = 1, message = "Title is required."))]
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

/// Update request (admin). Omitted fields are left untouched.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChallengeRequest {
    pub title: Option<String>,
    /// `null` clears the description; omit to leave it unchanged.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

impl From<UpdateChallengeRequest> for ChallengePatch {
    fn from(req: UpdateChallengeRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            start_date: req.start_date,
            end_date: req.end_date,
            is_active: req.is_active,
        }
    }
}

/// Challenge as returned over HTTP, with its derived state.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    #[serde(flatten)]
    pub challenge: Challenge,
    pub state: ChallengeState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<CreatorRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_count: Option<i64>,
    /// Present only on the staff detail view.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submissions: Option<Vec<SubmissionDetail>>,
}

impl ChallengeResponse {
    pub fn new(challenge: Challenge, now: DateTime<Utc>) -> Self {
        let state = challenge.state_at(now);
        Self {
            challenge,
            state,
            creator: None,
            submission_count: None,
            submissions: None,
        }
    }

    pub fn from_summary(summary: ChallengeSummary, now: DateTime<Utc>) -> Self {
        Self {
            creator: summary.creator,
            submission_count: Some(summary.submission_count),
            ..Self::new(summary.challenge, now)
        }
    }
}

/// Submit a video to a challenge (student).
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVideoRequest {
    pub video_id: Option<Uuid>,
    pub challenge_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVideoResponse {
    pub message: String,
    pub submission_id: Uuid,
}
