//! Database operations for video notes and feedback records.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbBackend, EntityTrait, QueryFilter, Set, Statement,
};
use uuid::Uuid;

use crate::entity::video_note::{self, ActiveModel, Entity as NoteEntity};
use crate::error::{AppError, AppResult};
use crate::models::{NewNote, VideoNote};

use super::{DbPool, NoteStore};

/// Conflict target is the partial unique index `idx_video_notes_feedback`.
const UPSERT_FEEDBACK_SQL: &str = r#"
    INSERT INTO video_notes (id, content, timestamp_ms, supervisor_id, video_id, score, created_at, updated_at)
    VALUES ($1, $2, NULL, $3, $4, $5, NOW(), NOW())
    ON CONFLICT (video_id) WHERE score IS NOT NULL
    DO UPDATE SET
        score = EXCLUDED.score,
        content = EXCLUDED.content,
        supervisor_id = EXCLUDED.supervisor_id,
        updated_at = NOW()
    RETURNING *
"#;

#[async_trait]
impl NoteStore for DbPool {
    async fn insert_note(&self, new: NewNote) -> AppResult<VideoNote> {
        let now = Utc::now();
        let model = ActiveModel {
            id: Set(Uuid::now_v7()),
            content: Set(new.content),
            timestamp_ms: Set(new.timestamp_ms),
            supervisor_id: Set(new.supervisor_id),
            video_id: Set(new.video_id),
            score: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert note: {}", e)))?;

        Ok(model_to_note(inserted))
    }

    async fn upsert_feedback(
        &self,
        video_id: Uuid,
        supervisor_id: Uuid,
        score: i32,
        content: String,
    ) -> AppResult<VideoNote> {
        let saved = NoteEntity::find()
            .from_raw_sql(Statement::from_sql_and_values(
                DbBackend::Postgres,
                UPSERT_FEEDBACK_SQL,
                [
                    Uuid::now_v7().into(),
                    content.into(),
                    supervisor_id.into(),
                    video_id.into(),
                    score.into(),
                ],
            ))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to upsert feedback: {}", e)))?
            .ok_or_else(|| AppError::Database("Feedback upsert returned no row".to_string()))?;

        Ok(model_to_note(saved))
    }

    async fn find_feedback(&self, video_id: Uuid) -> AppResult<Option<VideoNote>> {
        let result = NoteEntity::find()
            .filter(video_note::Column::VideoId.eq(video_id))
            .filter(video_note::Column::Score.is_not_null())
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get feedback: {}", e)))?;

        Ok(result.map(model_to_note))
    }
}

fn model_to_note(m: video_note::Model) -> VideoNote {
    VideoNote {
        id: m.id,
        content: m.content,
        timestamp_ms: m.timestamp_ms,
        supervisor_id: m.supervisor_id,
        video_id: m.video_id,
        score: m.score,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}
