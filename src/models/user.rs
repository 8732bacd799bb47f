//! User models: roles, resolved identities and user DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Canonical role set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Supervisor,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Student, Role::Supervisor, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Supervisor => "supervisor",
            Self::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "student" => Some(Self::Student),
            "supervisor" => Some(Self::Supervisor),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Roles a user may pick for themselves at sign-up.
    pub fn is_self_assignable(&self) -> bool {
        !matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity resolved from a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// User stored in database.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub role: Role,
    pub student_id: Option<String>,
    pub professional_id: Option<String>,
    pub class: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Insert payload for a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub student_id: Option<String>,
    pub professional_id: Option<String>,
    pub class: Option<String>,
}

/// User row with aggregate counts for the admin listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserWithCounts {
    #[serde(flatten)]
    pub user: User,
    pub video_count: i64,
    pub note_count: i64,
}

/// Video summary inside a user detail.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserVideoItem {
    pub id: Uuid,
    pub title: String,
    pub object_key: String,
    pub created_at: DateTime<Utc>,
}

/// Note authored by a user, with the title of the annotated video.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserNoteItem {
    pub id: Uuid,
    pub content: String,
    pub timestamp_ms: Option<i64>,
    pub video_title: String,
    pub created_at: DateTime<Utc>,
}

/// User detail for the admin view.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub uploaded_videos: Vec<UserVideoItem>,
    pub created_notes: Vec<UserNoteItem>,
}

/// Sign-up request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required."))]
    pub name: String,
    #[validate(email(message = "A valid email is required."))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8 to 128 characters."))]
    pub password: String,
    /// `student` or `supervisor`.
    pub role: String,
    pub student_id: Option<String>,
    pub professional_id: Option<String>,
    pub class: Option<String>,
}

/// Sign-in request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignInRequest {
    #[validate(length(min = 1, message = "Email is required."))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

/// Response after sign-up or sign-in.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub token: String,
    pub user: Identity,
}

/// Role change request (admin).
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRoleRequest {
    pub role: Option<String>,
}

/// Profile view returned after a role change.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            updated_at: u.updated_at,
        }
    }
}

/// Session JWT claims.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub iss: String,
    pub exp: usize,
    pub iat: usize,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}
