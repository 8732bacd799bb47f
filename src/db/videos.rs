//! Database operations for videos.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbBackend, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, Set, Statement,
};
use uuid::Uuid;

use crate::entity::video::{self, ActiveModel, Entity as VideoEntity};
use crate::error::{AppError, AppResult};
use crate::models::{NewVideo, NoteView, PersonRef, ReviewVideo, Video, VideoNote, VideoWithNotes};

use super::{DbPool, VideoStore, in_clause};

/// Note joined with its author's name.
#[derive(Debug, FromQueryResult)]
pub(super) struct NoteRow {
    id: Uuid,
    content: String,
    timestamp_ms: Option<i64>,
    supervisor_id: Uuid,
    video_id: Uuid,
    score: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    supervisor_name: String,
}

impl From<NoteRow> for NoteView {
    fn from(r: NoteRow) -> Self {
        NoteView {
            note: VideoNote {
                id: r.id,
                content: r.content,
                timestamp_ms: r.timestamp_ms,
                supervisor_id: r.supervisor_id,
                video_id: r.video_id,
                score: r.score,
                created_at: r.created_at,
                updated_at: r.updated_at,
            },
            supervisor_name: r.supervisor_name,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct ReviewRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    object_key: String,
    file_size: i64,
    content_type: String,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    uploader_name: String,
    uploader_email: String,
}

/// Which notes to load and in what order.
#[derive(Debug, Clone, Copy)]
pub(super) enum NoteFilter {
    AllOldestFirst,
    AllNewestFirst,
    ScoredOnly,
}

impl DbPool {
    /// Notes of the given videos with author names, grouped by video id.
    pub(super) async fn notes_for_videos(
        &self,
        video_ids: &[Uuid],
        filter: NoteFilter,
    ) -> AppResult<HashMap<Uuid, Vec<NoteView>>> {
        if video_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let (placeholders, values) = in_clause(video_ids, 0);
        let (scored, order) = match filter {
            NoteFilter::AllOldestFirst => ("", "ASC"),
            NoteFilter::AllNewestFirst => ("", "DESC"),
            NoteFilter::ScoredOnly => ("AND n.score IS NOT NULL", "ASC"),
        };
        let sql = format!(
            "SELECT n.*, u.name AS supervisor_name FROM video_notes n \
             JOIN users u ON u.id = n.supervisor_id \
             WHERE n.video_id IN ({}) {} ORDER BY n.created_at {}",
            placeholders, scored, order
        );

        let rows = NoteRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            &sql,
            values,
        ))
        .all(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to load notes: {}", e)))?;

        let mut grouped: HashMap<Uuid, Vec<NoteView>> = HashMap::new();
        for row in rows {
            grouped.entry(row.video_id).or_default().push(row.into());
        }
        Ok(grouped)
    }

    async fn attach_notes(&self, videos: Vec<video::Model>) -> AppResult<Vec<VideoWithNotes>> {
        let ids: Vec<Uuid> = videos.iter().map(|v| v.id).collect();
        let mut notes = self
            .notes_for_videos(&ids, NoteFilter::AllOldestFirst)
            .await?;

        Ok(videos
            .into_iter()
            .map(|v| VideoWithNotes {
                notes: notes.remove(&v.id).unwrap_or_default(),
                video: model_to_video(v),
            })
            .collect())
    }
}

#[async_trait]
impl VideoStore for DbPool {
    async fn insert_video(&self, new: NewVideo) -> AppResult<Video> {
        let now = Utc::now();
        let model = ActiveModel {
            id: Set(Uuid::now_v7()),
            title: Set(new.title),
            description: Set(new.description),
            object_key: Set(new.object_key),
            file_size: Set(new.file_size),
            content_type: Set(new.content_type),
            user_id: Set(new.user_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert video: {}", e)))?;

        Ok(model_to_video(inserted))
    }

    async fn find_video(&self, id: Uuid) -> AppResult<Option<Video>> {
        let result = VideoEntity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get video: {}", e)))?;

        Ok(result.map(model_to_video))
    }

    async fn list_videos_by_owner(&self, owner: Uuid) -> AppResult<Vec<VideoWithNotes>> {
        let videos = VideoEntity::find()
            .filter(video::Column::UserId.eq(owner))
            .order_by_desc(video::Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list videos: {}", e)))?;

        self.attach_notes(videos).await
    }

    async fn find_owned_video(&self, id: Uuid, owner: Uuid) -> AppResult<Option<VideoWithNotes>> {
        let video = VideoEntity::find_by_id(id)
            .filter(video::Column::UserId.eq(owner))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get video: {}", e)))?;

        match video {
            Some(v) => Ok(self.attach_notes(vec![v]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_videos_for_review(&self) -> AppResult<Vec<ReviewVideo>> {
        let rows = ReviewRow::find_by_statement(Statement::from_string(
            DbBackend::Postgres,
            r#"
            SELECT v.*, u.name AS uploader_name, u.email AS uploader_email
            FROM videos v
            JOIN users u ON u.id = v.user_id
            ORDER BY v.created_at DESC
            "#,
        ))
        .all(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to list videos for review: {}", e)))?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut notes = self
            .notes_for_videos(&ids, NoteFilter::AllNewestFirst)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| ReviewVideo {
                notes: notes.remove(&r.id).unwrap_or_default(),
                uploader: PersonRef {
                    id: r.user_id,
                    name: r.uploader_name,
                    email: r.uploader_email,
                },
                video: Video {
                    id: r.id,
                    title: r.title,
                    description: r.description,
                    object_key: r.object_key,
                    file_size: r.file_size,
                    content_type: r.content_type,
                    user_id: r.user_id,
                    created_at: r.created_at,
                    updated_at: r.updated_at,
                },
            })
            .collect())
    }
}

pub(super) fn model_to_video(m: video::Model) -> Video {
    Video {
        id: m.id,
        title: m.title,
        description: m.description,
        object_key: m.object_key,
        file_size: m.file_size,
        content_type: m.content_type,
        user_id: m.user_id,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}
