//! Account lifecycle: sign-up, sign-in and admin role changes.

use uuid::Uuid;
use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::db::Repository;
use crate::error::{AppError, AppResult};
use crate::models::user::SignUpRequest;
use crate::models::{NewUser, Role, User};

const INVALID_ROLE: &str = "Invalid role. Must be one of: student, supervisor, admin.";

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Register a student or supervisor account.
pub async fn sign_up(repo: &dyn Repository, req: SignUpRequest) -> AppResult<User> {
    req.validate()?;

    let role = Role::parse(&req.role)
        .filter(Role::is_self_assignable)
        .ok_or_else(|| AppError::invalid_field("role", "Role must be student or supervisor."))?;

    let user = repo
        .insert_user(NewUser {
            name: req.name.trim().to_string(),
            email: req.email.trim().to_string(),
            password_hash: hash_password(&req.password)?,
            role,
            student_id: non_blank(req.student_id),
            professional_id: non_blank(req.professional_id),
            class: non_blank(req.class),
        })
        .await?;

    tracing::info!(user_id = %user.id, role = %user.role, "User signed up");
    Ok(user)
}

/// Check credentials. Unknown email and wrong password are indistinguishable.
pub async fn sign_in(repo: &dyn Repository, email: &str, password: &str) -> AppResult<User> {
    let user = repo
        .find_user_by_email(email.trim())
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(password, &user.password_hash)? {
        tracing::warn!(user_id = %user.id, "Sign-in rejected: wrong password");
        return Err(AppError::InvalidCredentials);
    }

    Ok(user)
}

/// Parse the role of an admin role change. Validated before any lookup.
pub fn parse_role_change(raw: Option<&str>) -> AppResult<Role> {
    raw.and_then(|r| Role::ALL.into_iter().find(|role| role.as_str() == r))
        .ok_or_else(|| AppError::invalid_field("role", INVALID_ROLE))
}

/// Change a user's role.
pub async fn change_role(repo: &dyn Repository, id: Uuid, raw: Option<&str>) -> AppResult<User> {
    let role = parse_role_change(raw)?;
    let user = repo.update_user_role(id, role).await?;
    tracing::info!(user_id = %id, role = %role, "User role changed");
    Ok(user)
}
