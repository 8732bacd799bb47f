//! In-process repository with the same semantics as the PostgreSQL one.
//!
//! All tables sit behind one mutex, so every operation (including the
//! challenge delete cascade) is a single critical section. Rows are kept in
//! insertion order, which is also `created_at` order.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{
    ChallengeStore, DUPLICATE_EMAIL, DUPLICATE_SUBMISSION, NoteStore, Repository,
    SubmissionStore, UserStore, VideoStore,
};
use crate::error::{AppError, AppResult};
use crate::models::user::{UserNoteItem, UserVideoItem};
use crate::models::{
    Challenge, ChallengePatch, ChallengeSummary, CreatorRef, FeedbackView, NewChallenge, NewNote,
    NewUser, NewVideo, NoteView, PersonRef, ReviewVideo, Role, Submission, SubmissionDetail, User,
    UserDetail, UserWithCounts, Video, VideoNote, VideoWithNotes,
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    videos: Vec<Video>,
    notes: Vec<VideoNote>,
    challenges: Vec<Challenge>,
    submissions: Vec<Submission>,
}

impl Tables {
    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn video(&self, id: Uuid) -> Option<&Video> {
        self.videos.iter().find(|v| v.id == id)
    }

    fn note_view(&self, note: &VideoNote) -> Option<NoteView> {
        let author = self.user(note.supervisor_id)?;
        Some(NoteView {
            note: note.clone(),
            supervisor_name: author.name.clone(),
        })
    }

    fn notes_of(&self, video_id: Uuid) -> Vec<NoteView> {
        self.notes
            .iter()
            .filter(|n| n.video_id == video_id)
            .filter_map(|n| self.note_view(n))
            .collect()
    }

    fn with_notes(&self, video: &Video) -> VideoWithNotes {
        VideoWithNotes {
            video: video.clone(),
            notes: self.notes_of(video.id),
        }
    }
}

/// Mutex-guarded repository for tests and local demos.
#[derive(Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal("Repository mutex poisoned".to_string()))
    }
}

#[async_trait]
impl UserStore for MemoryRepository {
    async fn insert_user(&self, new: NewUser) -> AppResult<User> {
        let mut t = self.lock()?;
        let email = new.email.to_lowercase();
        if t.users.iter().any(|u| u.email == email) {
            return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            name: new.name,
            email,
            password_hash: new.password_hash,
            role: new.role,
            student_id: new.student_id,
            professional_id: new.professional_id,
            class: new.class,
            created_at: now,
            updated_at: now,
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.lock()?.user(id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = email.to_lowercase();
        Ok(self.lock()?.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users_with_counts(&self) -> AppResult<Vec<UserWithCounts>> {
        let t = self.lock()?;
        Ok(t.users
            .iter()
            .rev()
            .map(|u| UserWithCounts {
                user: u.clone(),
                video_count: t.videos.iter().filter(|v| v.user_id == u.id).count() as i64,
                note_count: t.notes.iter().filter(|n| n.supervisor_id == u.id).count() as i64,
            })
            .collect())
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(self.lock()?.users.clone())
    }

    async fn find_user_detail(&self, id: Uuid) -> AppResult<Option<UserDetail>> {
        let t = self.lock()?;
        let Some(user) = t.user(id).cloned() else {
            return Ok(None);
        };

        let uploaded_videos = t
            .videos
            .iter()
            .rev()
            .filter(|v| v.user_id == id)
            .map(|v| UserVideoItem {
                id: v.id,
                title: v.title.clone(),
                object_key: v.object_key.clone(),
                created_at: v.created_at,
            })
            .collect();

        let created_notes = t
            .notes
            .iter()
            .rev()
            .filter(|n| n.supervisor_id == id)
            .filter_map(|n| {
                let video = t.video(n.video_id)?;
                Some(UserNoteItem {
                    id: n.id,
                    content: n.content.clone(),
                    timestamp_ms: n.timestamp_ms,
                    video_title: video.title.clone(),
                    created_at: n.created_at,
                })
            })
            .collect();

        Ok(Some(UserDetail {
            user,
            uploaded_videos,
            created_notes,
        }))
    }

    async fn update_user_role(&self, id: Uuid, role: Role) -> AppResult<User> {
        let mut t = self.lock()?;
        let user = t
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;
        user.role = role;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

#[async_trait]
impl VideoStore for MemoryRepository {
    async fn insert_video(&self, new: NewVideo) -> AppResult<Video> {
        let mut t = self.lock()?;
        if t.user(new.user_id).is_none() {
            return Err(AppError::Database(
                "Foreign key violation: videos.user_id".to_string(),
            ));
        }

        let now = Utc::now();
        let video = Video {
            id: Uuid::now_v7(),
            title: new.title,
            description: new.description,
            object_key: new.object_key,
            file_size: new.file_size,
            content_type: new.content_type,
            user_id: new.user_id,
            created_at: now,
            updated_at: now,
        };
        t.videos.push(video.clone());
        Ok(video)
    }

    async fn find_video(&self, id: Uuid) -> AppResult<Option<Video>> {
        Ok(self.lock()?.video(id).cloned())
    }

    async fn list_videos_by_owner(&self, owner: Uuid) -> AppResult<Vec<VideoWithNotes>> {
        let t = self.lock()?;
        Ok(t.videos
            .iter()
            .rev()
            .filter(|v| v.user_id == owner)
            .map(|v| t.with_notes(v))
            .collect())
    }

    async fn find_owned_video(&self, id: Uuid, owner: Uuid) -> AppResult<Option<VideoWithNotes>> {
        let t = self.lock()?;
        Ok(t.videos
            .iter()
            .find(|v| v.id == id && v.user_id == owner)
            .map(|v| t.with_notes(v)))
    }

    async fn list_videos_for_review(&self) -> AppResult<Vec<ReviewVideo>> {
        let t = self.lock()?;
        Ok(t.videos
            .iter()
            .rev()
            .filter_map(|v| {
                let uploader = t.user(v.user_id)?;
                let mut notes = t.notes_of(v.id);
                notes.reverse();
                Some(ReviewVideo {
                    video: v.clone(),
                    uploader: PersonRef {
                        id: uploader.id,
                        name: uploader.name.clone(),
                        email: uploader.email.clone(),
                    },
                    notes,
                })
            })
            .collect())
    }
}

#[async_trait]
impl NoteStore for MemoryRepository {
    async fn insert_note(&self, new: NewNote) -> AppResult<VideoNote> {
        let mut t = self.lock()?;
        if t.video(new.video_id).is_none() {
            return Err(AppError::Database(
                "Foreign key violation: video_notes.video_id".to_string(),
            ));
        }

        let now = Utc::now();
        let note = VideoNote {
            id: Uuid::now_v7(),
            content: new.content,
            timestamp_ms: new.timestamp_ms,
            supervisor_id: new.supervisor_id,
            video_id: new.video_id,
            score: None,
            created_at: now,
            updated_at: now,
        };
        t.notes.push(note.clone());
        Ok(note)
    }

    async fn upsert_feedback(
        &self,
        video_id: Uuid,
        supervisor_id: Uuid,
        score: i32,
        content: String,
    ) -> AppResult<VideoNote> {
        let mut t = self.lock()?;
        let now = Utc::now();

        if let Some(existing) = t
            .notes
            .iter_mut()
            .find(|n| n.video_id == video_id && n.score.is_some())
        {
            existing.score = Some(score);
            existing.content = content;
            existing.supervisor_id = supervisor_id;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let note = VideoNote {
            id: Uuid::now_v7(),
            content,
            timestamp_ms: None,
            supervisor_id,
            video_id,
            score: Some(score),
            created_at: now,
            updated_at: now,
        };
        t.notes.push(note.clone());
        Ok(note)
    }

    async fn find_feedback(&self, video_id: Uuid) -> AppResult<Option<VideoNote>> {
        Ok(self
            .lock()?
            .notes
            .iter()
            .find(|n| n.video_id == video_id && n.score.is_some())
            .cloned())
    }
}

#[async_trait]
impl ChallengeStore for MemoryRepository {
    async fn insert_challenge(&self, new: NewChallenge) -> AppResult<Challenge> {
        let mut t = self.lock()?;
        let now = Utc::now();
        let challenge = Challenge {
            id: Uuid::now_v7(),
            title: new.title,
            description: new.description,
            start_date: new.start_date,
            end_date: new.end_date,
            is_active: new.is_active,
            creator_id: new.creator_id,
            created_at: now,
            updated_at: now,
        };
        t.challenges.push(challenge.clone());
        Ok(challenge)
    }

    async fn find_challenge(&self, id: Uuid) -> AppResult<Option<Challenge>> {
        Ok(self.lock()?.challenges.iter().find(|c| c.id == id).cloned())
    }

    async fn update_challenge(&self, id: Uuid, patch: ChallengePatch) -> AppResult<Challenge> {
        let mut t = self.lock()?;
        let challenge = t
            .challenges
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::NotFound("Challenge".to_string()))?;
        patch.apply(challenge);
        challenge.updated_at = Utc::now();
        Ok(challenge.clone())
    }

    async fn delete_challenge(&self, id: Uuid) -> AppResult<()> {
        let mut t = self.lock()?;
        let Some(pos) = t.challenges.iter().position(|c| c.id == id) else {
            return Err(AppError::NotFound("Challenge".to_string()));
        };
        t.submissions.retain(|s| s.challenge_id != id);
        t.challenges.remove(pos);
        Ok(())
    }

    async fn list_challenges(&self) -> AppResult<Vec<ChallengeSummary>> {
        let t = self.lock()?;
        Ok(t.challenges
            .iter()
            .rev()
            .map(|c| ChallengeSummary {
                challenge: c.clone(),
                creator: t.user(c.creator_id).map(|u| CreatorRef {
                    id: u.id,
                    name: u.name.clone(),
                }),
                submission_count: t
                    .submissions
                    .iter()
                    .filter(|s| s.challenge_id == c.id)
                    .count() as i64,
            })
            .collect())
    }

    async fn list_active_challenges(&self, now: DateTime<Utc>) -> AppResult<Vec<Challenge>> {
        let t = self.lock()?;
        let mut active: Vec<Challenge> = t
            .challenges
            .iter()
            .filter(|c| c.is_publicly_listed(now))
            .cloned()
            .collect();
        active.sort_by_key(|c| c.start_date);
        Ok(active)
    }
}

#[async_trait]
impl SubmissionStore for MemoryRepository {
    async fn insert_submission(
        &self,
        challenge_id: Uuid,
        video_id: Uuid,
    ) -> AppResult<Submission> {
        let mut t = self.lock()?;
        if !t.challenges.iter().any(|c| c.id == challenge_id) || t.video(video_id).is_none() {
            return Err(AppError::Database(
                "Foreign key violation: video_submissions".to_string(),
            ));
        }
        if t
            .submissions
            .iter()
            .any(|s| s.challenge_id == challenge_id && s.video_id == video_id)
        {
            return Err(AppError::Conflict(DUPLICATE_SUBMISSION.to_string()));
        }

        let now = Utc::now();
        let submission = Submission {
            id: Uuid::now_v7(),
            challenge_id,
            video_id,
            created_at: now,
            updated_at: now,
        };
        t.submissions.push(submission.clone());
        Ok(submission)
    }

    async fn find_submission(&self, id: Uuid) -> AppResult<Option<Submission>> {
        Ok(self.lock()?.submissions.iter().find(|s| s.id == id).cloned())
    }

    async fn list_challenge_submissions(
        &self,
        challenge_id: Uuid,
    ) -> AppResult<Vec<SubmissionDetail>> {
        let t = self.lock()?;
        Ok(t.submissions
            .iter()
            .filter(|s| s.challenge_id == challenge_id)
            .filter_map(|s| {
                let video = t.video(s.video_id)?;
                let uploader = t.user(video.user_id)?;
                let feedback = t
                    .notes
                    .iter()
                    .find(|n| n.video_id == video.id && n.score.is_some())
                    .and_then(|n| t.note_view(n))
                    .map(|view| FeedbackView {
                        note: view.note,
                        supervisor_name: view.supervisor_name,
                    });
                Some(SubmissionDetail {
                    submission: s.clone(),
                    video: video.clone(),
                    uploader: PersonRef {
                        id: uploader.id,
                        name: uploader.name.clone(),
                        email: uploader.email.clone(),
                    },
                    feedback,
                })
            })
            .collect())
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn ping(&self) -> AppResult<()> {
        self.lock().map(|_| ())
    }
}
