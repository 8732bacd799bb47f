//! Upload broker: pre-signed S3 upload URLs and object key rules.
//!
//! The server never touches video bytes. Clients `PUT` straight to the
//! object store with the URL issued here, then record the metadata through
//! `POST /videos`. That second step checks only the key shape; whether the
//! object actually exists is not verified.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use chrono::Utc;
use secrecy::ExposeSecret;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::config::StorageSettings;
use crate::error::{AppError, AppResult};
use crate::models::UploadSlot;
use crate::models::upload::UploadSlotRequest;

/// Lifetime of an upload URL.
pub const UPLOAD_URL_TTL: Duration = Duration::from_secs(30 * 60);

/// Object store operations the server needs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Pre-signed `PUT` URL bound to the key, content type and length.
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        content_length: i64,
        expires_in: Duration,
    ) -> AppResult<String>;
}

/// S3 storage client wrapper.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3 storage client from configuration.
    pub async fn new(config: &StorageSettings) -> AppResult<Self> {
        let credentials = Credentials::new(
            &config.access_key,
            config.secret_key.expose_secret(),
            None,
            None,
            "video-feedback",
        );

        let mut s3_config_builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true); // Required for MinIO

        // Use custom endpoint for MinIO in development
        if let Some(ref endpoint) = config.endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        let storage = Self {
            client: Client::from_conf(s3_config_builder.build()),
            bucket: config.bucket.clone(),
        };

        storage.ensure_bucket_exists().await?;

        info!("S3 storage initialized: bucket={}", config.bucket);

        Ok(storage)
    }

    /// Ensure the bucket exists, creating it if necessary.
    async fn ensure_bucket_exists(&self) -> AppResult<()> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => Ok(()),
            Err(e) => {
                let service_error = e.into_service_error();
                if !service_error.is_not_found() {
                    return Err(AppError::ExternalService(format!(
                        "Failed to access bucket '{}': {}",
                        self.bucket, service_error
                    )));
                }

                info!("Creating S3 bucket '{}'", self.bucket);
                self.client
                    .create_bucket()
                    .bucket(&self.bucket)
                    .send()
                    .await
                    .map_err(|e| {
                        AppError::ExternalService(format!("Failed to create bucket: {}", e))
                    })?;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl ObjectStore for S3Storage {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        content_length: i64,
        expires_in: Duration,
    ) -> AppResult<String> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| AppError::Internal(format!("Invalid presign expiry: {}", e)))?;

        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .content_length(content_length)
            .presigned(presigning)
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to presign upload: {}", e)))?;

        Ok(request.uri().to_string())
    }
}

/// Make a client-supplied file name safe to embed in an object key.
///
/// Whitespace and path separators become `_`; runs of dots are collapsed so
/// no `..` segment survives.
pub fn sanitize_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if c.is_whitespace() || c == '/' || c == '\\' {
            '_'
        } else {
            c
        };
        if c == '.' && out.ends_with('.') {
            continue;
        }
        out.push(c);
    }
    out
}

/// `{prefix}/{uuid}-{sanitized name}`.
pub fn object_key_for(prefix: &str, file_name: &str) -> String {
    format!(
        "{}/{}-{}",
        prefix.trim_end_matches('/'),
        Uuid::new_v4(),
        sanitize_file_name(file_name)
    )
}

/// Reject keys outside the upload prefix or containing traversal segments.
pub fn validate_object_key(prefix: &str, key: &str) -> AppResult<()> {
    let prefix = format!("{}/", prefix.trim_end_matches('/'));
    let rest = key.strip_prefix(&prefix).unwrap_or_default();
    let traversal = key.contains('\\') || key.split('/').any(|seg| seg == ".." || seg == ".");

    if rest.is_empty() || traversal {
        return Err(AppError::invalid_field(
            "objectKey",
            "Object key is not a valid upload key.",
        ));
    }
    Ok(())
}

/// Issue a pre-signed upload URL for a new video object.
pub async fn request_upload_slot(
    store: &dyn ObjectStore,
    prefix: &str,
    req: &UploadSlotRequest,
) -> AppResult<UploadSlot> {
    req.validate()?;

    let object_key = object_key_for(prefix, &req.file_name);
    let expires_at = Utc::now() + UPLOAD_URL_TTL;
    let upload_url = store
        .presign_put(&object_key, &req.content_type, req.size, UPLOAD_URL_TTL)
        .await?;

    Ok(UploadSlot {
        upload_url,
        object_key,
        expires_at,
    })
}
