//! Chat bridge: identity sync and token minting for the hosted chat
//! provider, plus the client-side rules for direct channels and unread
//! counts.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::{EncodingKey, Header, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::ChatSettings;
use crate::error::{AppError, AppResult};
use crate::models::{ChannelMember, ChatEvent, ChatUser, DirectChannel, Identity};

const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Channel type used for one-to-one conversations.
pub const DIRECT_CHANNEL_TYPE: &str = "messaging";

/// Operations the server performs against the chat provider.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Public key handed to clients.
    fn api_key(&self) -> AppResult<&str>;
    /// Token a client uses to connect as `user_id`.
    fn create_user_token(&self, user_id: &str) -> AppResult<String>;
    /// Create or update users on the provider.
    async fn upsert_users(&self, users: &[ChatUser]) -> AppResult<()>;
}

/// Build the provider for the given settings. Without credentials every
/// call answers with `Misconfigured`.
pub fn provider_from_settings(settings: &ChatSettings) -> AppResult<Arc<dyn ChatProvider>> {
    match (&settings.api_key, &settings.api_secret) {
        (Some(key), Some(secret)) => Ok(Arc::new(StreamChat::new(
            key.clone(),
            secret.clone(),
            settings.base_url.clone(),
        )?)),
        _ => {
            warn!("Chat provider credentials not set; chat endpoints are disabled");
            Ok(Arc::new(UnconfiguredChat))
        }
    }
}

/// Stream Chat REST client.
pub struct StreamChat {
    api_key: String,
    api_secret: SecretString,
    base_url: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct UserTokenClaims<'a> {
    user_id: &'a str,
}

#[derive(Serialize)]
struct ServerTokenClaims {
    server: bool,
}

#[derive(Serialize)]
struct StreamUser<'a> {
    id: &'a str,
    name: &'a str,
    role: &'static str,
    app_role: &'a str,
}

#[derive(Serialize)]
struct UpsertUsersBody<'a> {
    users: BTreeMap<&'a str, StreamUser<'a>>,
}

impl StreamChat {
    pub fn new(api_key: String, api_secret: SecretString, base_url: String) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .timeout(HTTP_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build chat HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            api_secret,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn sign<T: Serialize>(&self, claims: &T) -> AppResult<String> {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.api_secret.expose_secret().as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to sign chat token: {}", e)))
    }
}

#[async_trait]
impl ChatProvider for StreamChat {
    fn api_key(&self) -> AppResult<&str> {
        Ok(&self.api_key)
    }

    fn create_user_token(&self, user_id: &str) -> AppResult<String> {
        self.sign(&UserTokenClaims { user_id })
    }

    async fn upsert_users(&self, users: &[ChatUser]) -> AppResult<()> {
        if users.is_empty() {
            return Ok(());
        }

        let body = UpsertUsersBody {
            users: users
                .iter()
                .map(|u| {
                    (
                        u.id.as_str(),
                        StreamUser {
                            id: &u.id,
                            name: &u.name,
                            role: "user",
                            app_role: u.role.as_str(),
                        },
                    )
                })
                .collect(),
        };

        let response = self
            .http
            .post(format!("{}/users", self.base_url))
            .query(&[("api_key", self.api_key.as_str())])
            .header("Authorization", self.sign(&ServerTokenClaims { server: true })?)
            .header("Stream-Auth-Type", "jwt")
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Chat user upsert failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Chat user upsert returned {}: {}",
                status, detail
            )));
        }

        info!(count = users.len(), "Synced users to chat provider");
        Ok(())
    }
}

/// Stand-in used when no provider credentials are configured.
pub struct UnconfiguredChat;

fn chat_not_configured() -> AppError {
    AppError::Misconfigured("Chat provider credentials are not configured".to_string())
}

#[async_trait]
impl ChatProvider for UnconfiguredChat {
    fn api_key(&self) -> AppResult<&str> {
        Err(chat_not_configured())
    }

    fn create_user_token(&self, _user_id: &str) -> AppResult<String> {
        Err(chat_not_configured())
    }

    async fn upsert_users(&self, _users: &[ChatUser]) -> AppResult<()> {
        Err(chat_not_configured())
    }
}

impl From<&Identity> for ChatUser {
    fn from(identity: &Identity) -> Self {
        ChatUser {
            id: identity.id.to_string(),
            name: identity.name.clone(),
            role: identity.role,
        }
    }
}

/// 32-bit FNV-1a over UTF-16 code units, as unpadded lowercase hex.
pub fn short_id(input: &str) -> String {
    let hash = input.encode_utf16().fold(0x811c_9dc5_u32, |hash, unit| {
        (hash ^ u32::from(unit)).wrapping_mul(0x0100_0193)
    });
    format!("{:x}", hash)
}

/// Descriptor of the one-to-one channel between `me` and `target`.
///
/// The id depends only on the member set, so both sides derive the same
/// channel.
pub fn direct_channel(me: &ChatUser, target: &ChatUser) -> AppResult<DirectChannel> {
    if me.id == target.id {
        return Err(AppError::invalid("You cannot start a chat with yourself."));
    }

    let mut members = vec![me.id.clone(), target.id.clone()];
    members.sort();

    Ok(DirectChannel {
        channel_type: DIRECT_CHANNEL_TYPE.to_string(),
        id: short_id(&members.join("-")),
        name: format!("{} & {}", me.name, target.name),
        members,
    })
}

/// Title shown for a channel in the channel list.
pub fn channel_display_name(
    explicit: Option<&str>,
    members: &[ChannelMember],
    viewer_id: &str,
) -> String {
    if let Some(name) = explicit.filter(|n| !n.is_empty()) {
        return name.to_string();
    }

    let others: Vec<&ChannelMember> = members.iter().filter(|m| m.user_id != viewer_id).collect();
    match others.as_slice() {
        [] => "Chat".to_string(),
        [only] => only
            .name
            .clone()
            .unwrap_or_else(|| "Direct Message".to_string()),
        _ => {
            let names: Vec<&str> = others
                .iter()
                .take(2)
                .map(|m| {
                    m.name
                        .as_deref()
                        .and_then(|n| n.split(' ').next())
                        .filter(|n| !n.is_empty())
                        .unwrap_or("User")
                })
                .collect();
            let joined = names.join(", ");
            if others.len() > 2 {
                format!("{} +{}", joined, others.len() - 2)
            } else {
                joined
            }
        }
    }
}

/// Outcome of feeding an event to the unread counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnreadUpdate {
    Unchanged,
    Changed(u32),
    /// Per-channel counts must be fetched again and passed to `recount`.
    RecountNeeded,
}

/// Running total of unread messages across a user's channels.
#[derive(Debug, Clone)]
pub struct UnreadCounter {
    user_id: String,
    total: u32,
}

impl UnreadCounter {
    pub fn new(user_id: impl Into<String>, per_channel: impl IntoIterator<Item = u32>) -> Self {
        let mut counter = Self {
            user_id: user_id.into(),
            total: 0,
        };
        counter.recount(per_channel);
        counter
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn recount(&mut self, per_channel: impl IntoIterator<Item = u32>) {
        self.total = per_channel.into_iter().fold(0u32, u32::saturating_add);
    }

    pub fn apply(&mut self, event: &ChatEvent) -> UnreadUpdate {
        match event {
            ChatEvent::MessageNew { sender_id } if *sender_id != self.user_id => {
                self.total = self.total.saturating_add(1);
                UnreadUpdate::Changed(self.total)
            }
            ChatEvent::MessageNew { .. } => UnreadUpdate::Unchanged,
            ChatEvent::MarkRead | ChatEvent::ChannelUpdated => UnreadUpdate::RecountNeeded,
        }
    }
}
