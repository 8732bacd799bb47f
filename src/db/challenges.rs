//! Database operations for challenges and their submissions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbBackend, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, Set, Statement, TransactionTrait,
};
use uuid::Uuid;

use crate::entity::challenge::{self, ActiveModel, Entity as ChallengeEntity};
use crate::entity::video_submission::{self, Entity as SubmissionEntity};
use crate::error::{AppError, AppResult};
use crate::models::{
    Challenge, ChallengePatch, ChallengeSummary, CreatorRef, FeedbackView, NewChallenge,
    PersonRef, Submission, SubmissionDetail, Video,
};

use super::videos::NoteFilter;
use super::{ChallengeStore, DUPLICATE_SUBMISSION, DbPool, SubmissionStore, unique_or_db};

#[derive(Debug, FromQueryResult)]
struct ChallengeSummaryRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    is_active: bool,
    creator_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    creator_name: Option<String>,
    submission_count: i64,
}

#[derive(Debug, FromQueryResult)]
struct SubmissionRow {
    id: Uuid,
    challenge_id: Uuid,
    video_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    video_title: String,
    video_description: Option<String>,
    object_key: String,
    file_size: i64,
    content_type: String,
    user_id: Uuid,
    video_created_at: DateTime<Utc>,
    video_updated_at: DateTime<Utc>,
    uploader_name: String,
    uploader_email: String,
}

#[async_trait]
impl ChallengeStore for DbPool {
    async fn insert_challenge(&self, new: NewChallenge) -> AppResult<Challenge> {
        let now = Utc::now();
        let model = ActiveModel {
            id: Set(Uuid::now_v7()),
            title: Set(new.title),
            description: Set(new.description),
            start_date: Set(new.start_date),
            end_date: Set(new.end_date),
            is_active: Set(new.is_active),
            creator_id: Set(new.creator_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert challenge: {}", e)))?;

        Ok(model_to_challenge(inserted))
    }

    async fn find_challenge(&self, id: Uuid) -> AppResult<Option<Challenge>> {
        let result = ChallengeEntity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get challenge: {}", e)))?;

        Ok(result.map(model_to_challenge))
    }

    async fn update_challenge(&self, id: Uuid, patch: ChallengePatch) -> AppResult<Challenge> {
        let existing = ChallengeEntity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get challenge: {}", e)))?
            .ok_or_else(|| AppError::NotFound("Challenge".to_string()))?;

        let mut active: ActiveModel = existing.into();
        if let Some(title) = patch.title {
            active.title = Set(title);
        }
        if let Some(description) = patch.description {
            active.description = Set(description);
        }
        if let Some(start) = patch.start_date {
            active.start_date = Set(start);
        }
        if let Some(end) = patch.end_date {
            active.end_date = Set(end);
        }
        if let Some(is_active) = patch.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        let updated = active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update challenge: {}", e)))?;

        Ok(model_to_challenge(updated))
    }

    async fn delete_challenge(&self, id: Uuid) -> AppResult<()> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let removed = SubmissionEntity::delete_many()
            .filter(video_submission::Column::ChallengeId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete submissions: {}", e)))?;

        let result = ChallengeEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete challenge: {}", e)))?;

        if result.rows_affected == 0 {
            // Dropping the transaction rolls it back.
            return Err(AppError::NotFound("Challenge".to_string()));
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit delete: {}", e)))?;

        tracing::info!(
            challenge_id = %id,
            submissions = removed.rows_affected,
            "Deleted challenge"
        );
        Ok(())
    }

    async fn list_challenges(&self) -> AppResult<Vec<ChallengeSummary>> {
        let rows = ChallengeSummaryRow::find_by_statement(Statement::from_string(
            DbBackend::Postgres,
            r#"
            SELECT c.*,
                u.name AS creator_name,
                (SELECT COUNT(*) FROM video_submissions s WHERE s.challenge_id = c.id) AS submission_count
            FROM challenges c
            LEFT JOIN users u ON u.id = c.creator_id
            ORDER BY c.created_at DESC
            "#,
        ))
        .all(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to list challenges: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|r| ChallengeSummary {
                creator: r.creator_name.map(|name| CreatorRef {
                    id: r.creator_id,
                    name,
                }),
                submission_count: r.submission_count,
                challenge: Challenge {
                    id: r.id,
                    title: r.title,
                    description: r.description,
                    start_date: r.start_date,
                    end_date: r.end_date,
                    is_active: r.is_active,
                    creator_id: r.creator_id,
                    created_at: r.created_at,
                    updated_at: r.updated_at,
                },
            })
            .collect())
    }

    async fn list_active_challenges(&self, now: DateTime<Utc>) -> AppResult<Vec<Challenge>> {
        let result = ChallengeEntity::find()
            .filter(challenge::Column::IsActive.eq(true))
            .filter(challenge::Column::EndDate.gt(now))
            .order_by_asc(challenge::Column::StartDate)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list active challenges: {}", e)))?;

        Ok(result.into_iter().map(model_to_challenge).collect())
    }
}

#[async_trait]
impl SubmissionStore for DbPool {
    async fn insert_submission(
        &self,
        challenge_id: Uuid,
        video_id: Uuid,
    ) -> AppResult<Submission> {
        let now = Utc::now();
        let model = video_submission::ActiveModel {
            id: Set(Uuid::now_v7()),
            challenge_id: Set(challenge_id),
            video_id: Set(video_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model
            .insert(self.connection())
            .await
            .map_err(|e| unique_or_db(e, DUPLICATE_SUBMISSION, "Failed to insert submission"))?;

        Ok(model_to_submission(inserted))
    }

    async fn find_submission(&self, id: Uuid) -> AppResult<Option<Submission>> {
        let result = SubmissionEntity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get submission: {}", e)))?;

        Ok(result.map(model_to_submission))
    }

    async fn list_challenge_submissions(
        &self,
        challenge_id: Uuid,
    ) -> AppResult<Vec<SubmissionDetail>> {
        let rows = SubmissionRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            SELECT s.id, s.challenge_id, s.video_id, s.created_at, s.updated_at,
                v.title AS video_title, v.description AS video_description,
                v.object_key, v.file_size, v.content_type, v.user_id,
                v.created_at AS video_created_at, v.updated_at AS video_updated_at,
                u.name AS uploader_name, u.email AS uploader_email
            FROM video_submissions s
            JOIN videos v ON v.id = s.video_id
            JOIN users u ON u.id = v.user_id
            WHERE s.challenge_id = $1
            ORDER BY s.created_at ASC
            "#,
            [challenge_id.into()],
        ))
        .all(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to list submissions: {}", e)))?;

        let video_ids: Vec<Uuid> = rows.iter().map(|r| r.video_id).collect();
        let mut feedback = self
            .notes_for_videos(&video_ids, NoteFilter::ScoredOnly)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| SubmissionDetail {
                feedback: feedback
                    .remove(&r.video_id)
                    .and_then(|notes| notes.into_iter().next())
                    .map(|view| FeedbackView {
                        note: view.note,
                        supervisor_name: view.supervisor_name,
                    }),
                uploader: PersonRef {
                    id: r.user_id,
                    name: r.uploader_name,
                    email: r.uploader_email,
                },
                video: Video {
                    id: r.video_id,
                    title: r.video_title,
                    description: r.video_description,
                    object_key: r.object_key,
                    file_size: r.file_size,
                    content_type: r.content_type,
                    user_id: r.user_id,
                    created_at: r.video_created_at,
                    updated_at: r.video_updated_at,
                },
                submission: Submission {
                    id: r.id,
                    challenge_id: r.challenge_id,
                    video_id: r.video_id,
                    created_at: r.created_at,
                    updated_at: r.updated_at,
                },
            })
            .collect())
    }
}

fn model_to_challenge(m: challenge::Model) -> Challenge {
    Challenge {
        id: m.id,
        title: m.title,
        description: m.description,
        start_date: m.start_date,
        end_date: m.end_date,
        is_active: m.is_active,
        creator_id: m.creator_id,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn model_to_submission(m: video_submission::Model) -> Submission {
    Submission {
        id: m.id,
        challenge_id: m.challenge_id,
        video_id: m.video_id,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}
