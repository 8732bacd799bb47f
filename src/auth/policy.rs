//! Static role → capability table.

use crate::error::{AppError, AppResult};
use crate::models::{Identity, Role};

/// Everything a caller can be allowed or denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Create, update and delete challenges.
    ManageChallenges,
    /// See every challenge, including inactive ones, with submissions.
    ReviewChallenges,
    SubmitToChallenge,
    /// Upsert the scored feedback record of a video.
    ScoreVideo,
    /// Add un-scored notes to a video.
    AnnotateVideo,
    ReviewAllVideos,
    UploadVideo,
    ListOwnVideos,
    ManageUsers,
    UseChat,
}

impl Action {
    pub const ALL: [Action; 10] = [
        Action::ManageChallenges,
        Action::ReviewChallenges,
        Action::SubmitToChallenge,
        Action::ScoreVideo,
        Action::AnnotateVideo,
        Action::ReviewAllVideos,
        Action::UploadVideo,
        Action::ListOwnVideos,
        Action::ManageUsers,
        Action::UseChat,
    ];

    pub fn allowed_roles(self) -> &'static [Role] {
        use Role::*;
        match self {
            Action::ManageChallenges | Action::ManageUsers => &[Admin],
            Action::ReviewChallenges | Action::ScoreVideo | Action::AnnotateVideo => {
                &[Admin, Supervisor]
            }
            Action::ReviewAllVideos => &[Supervisor],
            Action::SubmitToChallenge | Action::UploadVideo | Action::ListOwnVideos => &[Student],
            Action::UseChat => &[Admin, Supervisor, Student],
        }
    }
}

impl Role {
    pub fn can(self, action: Action) -> bool {
        action.allowed_roles().contains(&self)
    }
}

/// Check `identity` against `action`.
///
/// Anonymous callers get `Unauthenticated`; callers with the wrong role get
/// `Forbidden` naming the roles that would have been accepted.
pub fn authorize(identity: Option<&Identity>, action: Action) -> AppResult<&Identity> {
    let identity = identity.ok_or(AppError::Unauthenticated)?;
    if identity.role.can(action) {
        return Ok(identity);
    }

    tracing::debug!(
        user_id = %identity.id,
        role = %identity.role,
        action = ?action,
        "Authorization denied"
    );
    let roles = action
        .allowed_roles()
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    Err(AppError::Forbidden(format!(
        "Access denied. Requires one of the following roles: {}.",
        roles
    )))
}
