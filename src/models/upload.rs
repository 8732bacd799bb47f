//! Upload slot models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Request for a pre-signed upload URL.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadSlotRequest {
    #[validate(custom(function = "not_blank", message = "File name is required."))]
    pub file_name: String,
    #[validate(custom(function = "not_blank", message = "Content type is required."))]
    pub content_type: String,
    #[validate(range(min = 1, message = "Size must be a positive integer."))]
    pub size: i64,
}

/// Pre-signed upload credential.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadSlot {
    pub upload_url: String,
    pub object_key: String,
    pub expires_at: DateTime<Utc>,
}
