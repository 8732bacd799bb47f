//! Session token issue and verification (HS256 JWT).

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use crate::config::SessionSettings;
use crate::error::{AppError, AppResult};
use crate::models::user::SessionClaims;
use crate::models::{Identity, Role};

/// `iss` claim of every session token.
pub const SESSION_ISSUER: &str = "video-feedback";

/// Signing material for session tokens. Registered once as app data.
#[derive(Clone)]
pub struct SessionKeys {
    secret: SecretString,
    ttl_secs: u64,
}

impl SessionKeys {
    pub fn new(settings: &SessionSettings) -> Self {
        Self {
            secret: settings.secret.clone(),
            ttl_secs: settings.ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Sign a session token for `identity`.
    pub fn issue(&self, identity: &Identity) -> AppResult<String> {
        let now = Utc::now().timestamp() as usize;
        let claims = SessionClaims {
            sub: identity.id.to_string(),
            iss: SESSION_ISSUER.to_string(),
            iat: now,
            exp: now + self.ttl_secs as usize,
            user_id: identity.id.to_string(),
            name: identity.name.clone(),
            email: identity.email.clone(),
            role: identity.role.as_str().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to sign session token: {}", e)))
    }

    /// Resolve a token to an identity. Any failure means anonymous.
    pub fn resolve(&self, token: &str) -> Option<Identity> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[SESSION_ISSUER]);

        let claims = match decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &validation,
        ) {
            Ok(data) => data.claims,
            Err(e) => {
                tracing::debug!("Session token rejected: {}", e);
                return None;
            }
        };

        Some(Identity {
            id: Uuid::parse_str(&claims.user_id).ok()?,
            role: Role::parse(&claims.role)?,
            name: claims.name,
            email: claims.email,
        })
    }
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("secret", &"[REDACTED]")
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}
