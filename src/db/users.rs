//! Database operations for users.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbBackend, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, Set, Statement,
};
use uuid::Uuid;

use crate::entity::user::{self, ActiveModel, Entity as UserEntity};
use crate::entity::video::{self, Entity as VideoEntity};
use crate::error::{AppError, AppResult};
use crate::models::user::{UserNoteItem, UserVideoItem};
use crate::models::{NewUser, Role, User, UserDetail, UserWithCounts};

use super::{DUPLICATE_EMAIL, DbPool, UserStore, unique_or_db};

#[derive(Debug, FromQueryResult)]
struct UserCountRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    student_id: Option<String>,
    professional_id: Option<String>,
    class: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    video_count: i64,
    note_count: i64,
}

#[derive(Debug, FromQueryResult)]
struct AuthoredNoteRow {
    id: Uuid,
    content: String,
    timestamp_ms: Option<i64>,
    video_title: String,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl UserStore for DbPool {
    async fn insert_user(&self, new: NewUser) -> AppResult<User> {
        let now = Utc::now();
        let model = ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(new.name),
            email: Set(new.email.to_lowercase()),
            password_hash: Set(new.password_hash),
            role: Set(new.role.as_str().to_string()),
            student_id: Set(new.student_id),
            professional_id: Set(new.professional_id),
            class: Set(new.class),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model
            .insert(self.connection())
            .await
            .map_err(|e| unique_or_db(e, DUPLICATE_EMAIL, "Failed to insert user"))?;

        model_to_user(inserted)
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get user: {}", e)))?;

        result.map(model_to_user).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email.to_lowercase()))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get user by email: {}", e)))?;

        result.map(model_to_user).transpose()
    }

    async fn list_users_with_counts(&self) -> AppResult<Vec<UserWithCounts>> {
        let rows = UserCountRow::find_by_statement(Statement::from_string(
            DbBackend::Postgres,
            r#"
            SELECT u.*,
                (SELECT COUNT(*) FROM videos v WHERE v.user_id = u.id) AS video_count,
                (SELECT COUNT(*) FROM video_notes n WHERE n.supervisor_id = u.id) AS note_count
            FROM users u
            ORDER BY u.created_at DESC
            "#,
        ))
        .all(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to list users: {}", e)))?;

        rows.into_iter()
            .map(|r| {
                Ok(UserWithCounts {
                    user: User {
                        id: r.id,
                        role: parse_role(&r.role, r.id)?,
                        name: r.name,
                        email: r.email,
                        password_hash: r.password_hash,
                        student_id: r.student_id,
                        professional_id: r.professional_id,
                        class: r.class,
                        created_at: r.created_at,
                        updated_at: r.updated_at,
                    },
                    video_count: r.video_count,
                    note_count: r.note_count,
                })
            })
            .collect()
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let result = UserEntity::find()
            .order_by_asc(user::Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list users: {}", e)))?;

        result.into_iter().map(model_to_user).collect()
    }

    async fn find_user_detail(&self, id: Uuid) -> AppResult<Option<UserDetail>> {
        let Some(user) = self.find_user(id).await? else {
            return Ok(None);
        };

        let videos = VideoEntity::find()
            .filter(video::Column::UserId.eq(id))
            .order_by_desc(video::Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get user videos: {}", e)))?;

        let notes = AuthoredNoteRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            SELECT n.id, n.content, n.timestamp_ms, n.created_at, v.title AS video_title
            FROM video_notes n
            JOIN videos v ON v.id = n.video_id
            WHERE n.supervisor_id = $1
            ORDER BY n.created_at DESC
            "#,
            [id.into()],
        ))
        .all(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to get user notes: {}", e)))?;

        Ok(Some(UserDetail {
            user,
            uploaded_videos: videos
                .into_iter()
                .map(|v| UserVideoItem {
                    id: v.id,
                    title: v.title,
                    object_key: v.object_key,
                    created_at: v.created_at,
                })
                .collect(),
            created_notes: notes
                .into_iter()
                .map(|n| UserNoteItem {
                    id: n.id,
                    content: n.content,
                    timestamp_ms: n.timestamp_ms,
                    video_title: n.video_title,
                    created_at: n.created_at,
                })
                .collect(),
        }))
    }

    async fn update_user_role(&self, id: Uuid, role: Role) -> AppResult<User> {
        let existing = UserEntity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get user: {}", e)))?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        let mut active: ActiveModel = existing.into();
        active.role = Set(role.as_str().to_string());
        active.updated_at = Set(Utc::now());

        let updated = active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update user role: {}", e)))?;

        model_to_user(updated)
    }
}

fn parse_role(raw: &str, id: Uuid) -> AppResult<Role> {
    Role::parse(raw)
        .ok_or_else(|| AppError::Database(format!("User {} has unknown role '{}'", id, raw)))
}

fn model_to_user(m: user::Model) -> AppResult<User> {
    Ok(User {
        role: parse_role(&m.role, m.id)?,
        id: m.id,
        name: m.name,
        email: m.email,
        password_hash: m.password_hash,
        student_id: m.student_id,
        professional_id: m.professional_id,
        class: m.class,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}
