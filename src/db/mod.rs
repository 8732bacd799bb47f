//! Resource repository: store traits, the PostgreSQL implementation and an
//! in-memory implementation with the same semantics.
//!
//! Handlers see only `web::Data<dyn Repository>`.

pub mod challenges;
pub mod memory;
pub mod notes;
pub mod users;
pub mod videos;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use crate::config::DatabaseSettings;
use crate::error::{AppError, AppResult};
use crate::migration::Migrator;
use crate::models::{
    Challenge, ChallengePatch, ChallengeSummary, NewChallenge, NewNote, NewUser, NewVideo,
    ReviewVideo, Role, Submission, SubmissionDetail, User, UserDetail, UserWithCounts, Video,
    VideoNote, VideoWithNotes,
};

pub use memory::MemoryRepository;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Duplicate email (case-insensitive) is a `Conflict`.
    async fn insert_user(&self, user: NewUser) -> AppResult<User>;
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;
    /// Newest first, with video and note counts.
    async fn list_users_with_counts(&self) -> AppResult<Vec<UserWithCounts>>;
    /// Oldest first.
    async fn list_users(&self) -> AppResult<Vec<User>>;
    async fn find_user_detail(&self, id: Uuid) -> AppResult<Option<UserDetail>>;
    /// Unknown id is `NotFound`.
    async fn update_user_role(&self, id: Uuid, role: Role) -> AppResult<User>;
}

#[async_trait]
pub trait VideoStore: Send + Sync {
    async fn insert_video(&self, video: NewVideo) -> AppResult<Video>;
    async fn find_video(&self, id: Uuid) -> AppResult<Option<Video>>;
    /// Videos of `owner`, newest first, notes oldest first.
    async fn list_videos_by_owner(&self, owner: Uuid) -> AppResult<Vec<VideoWithNotes>>;
    /// `None` both when the video is missing and when another user owns it.
    async fn find_owned_video(&self, id: Uuid, owner: Uuid) -> AppResult<Option<VideoWithNotes>>;
    /// Every video with its uploader, newest first, notes newest first.
    async fn list_videos_for_review(&self) -> AppResult<Vec<ReviewVideo>>;
}

#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn insert_note(&self, note: NewNote) -> AppResult<VideoNote>;
    /// Create or overwrite the single scored note of `video_id`.
    async fn upsert_feedback(
        &self,
        video_id: Uuid,
        supervisor_id: Uuid,
        score: i32,
        content: String,
    ) -> AppResult<VideoNote>;
    async fn find_feedback(&self, video_id: Uuid) -> AppResult<Option<VideoNote>>;
}

#[async_trait]
pub trait ChallengeStore: Send + Sync {
    async fn insert_challenge(&self, challenge: NewChallenge) -> AppResult<Challenge>;
    async fn find_challenge(&self, id: Uuid) -> AppResult<Option<Challenge>>;
    /// Unknown id is `NotFound`.
    async fn update_challenge(&self, id: Uuid, patch: ChallengePatch) -> AppResult<Challenge>;
    /// Removes the challenge and its submissions together. Unknown id is `NotFound`.
    async fn delete_challenge(&self, id: Uuid) -> AppResult<()>;
    /// Newest first, with creator and submission count.
    async fn list_challenges(&self) -> AppResult<Vec<ChallengeSummary>>;
    /// Active and not yet ended at `now`, earliest start first.
    async fn list_active_challenges(&self, now: DateTime<Utc>) -> AppResult<Vec<Challenge>>;
}

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// A repeated (video, challenge) pair is a `Conflict`.
    async fn insert_submission(&self, challenge_id: Uuid, video_id: Uuid)
    -> AppResult<Submission>;
    async fn find_submission(&self, id: Uuid) -> AppResult<Option<Submission>>;
    /// Oldest first, each with video, uploader and feedback.
    async fn list_challenge_submissions(
        &self,
        challenge_id: Uuid,
    ) -> AppResult<Vec<SubmissionDetail>>;
}

/// Everything a handler may ask of persistence.
#[async_trait]
pub trait Repository:
    UserStore + VideoStore + NoteStore + ChallengeStore + SubmissionStore
{
    /// Readiness probe.
    async fn ping(&self) -> AppResult<()>;
}

/// Message used when a (video, challenge) pair already exists.
pub const DUPLICATE_SUBMISSION: &str = "This video has already been submitted to this challenge.";

/// Message used when an email is already registered.
pub const DUPLICATE_EMAIL: &str = "An account with this email already exists.";

/// Map a unique violation to `Conflict(message)`, anything else to `Database`.
pub(crate) fn unique_or_db(err: DbErr, message: &str, context: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(message.to_string()),
        _ => AppError::Database(format!("{}: {}", context, err)),
    }
}

/// `$1, $2, ...` placeholders and values for an `IN (...)` clause.
pub(crate) fn in_clause(ids: &[Uuid], offset: usize) -> (String, Vec<sea_orm::Value>) {
    let placeholders = (1..=ids.len())
        .map(|i| format!("${}", i + offset))
        .collect::<Vec<_>>()
        .join(", ");
    let values = ids.iter().map(|id| sea_orm::Value::Uuid(Some(*id))).collect();
    (placeholders, values)
}

/// PostgreSQL connection pool.
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Connect using the configured pool bounds.
    pub async fn new(settings: &DatabaseSettings) -> AppResult<Self> {
        let mut opt = ConnectOptions::new(&settings.url);
        opt.max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect: {}", e)))?;

        Ok(DbPool { conn })
    }

    /// Wrap an existing connection (used with `MockDatabase` in tests).
    pub fn from_connection(conn: DatabaseConnection) -> Self {
        DbPool { conn }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Apply pending migrations.
    pub async fn run_migrations(&self) -> AppResult<()> {
        Migrator::up(self.connection(), None)
            .await
            .map_err(|e| AppError::Database(format!("Migration failed: {}", e)))
    }
}

#[async_trait]
impl Repository for DbPool {
    async fn ping(&self) -> AppResult<()> {
        self.connection()
            .execute_unprepared("SELECT 1")
            .await
            .map(|_| ())
            .map_err(|e| AppError::Database(format!("Ping failed: {}", e)))
    }
}
