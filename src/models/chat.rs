//! Chat bridge models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::Role;

/// Identity pushed to the chat provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ChatUser {
    pub id: String,
    pub name: String,
    pub role: Role,
}

/// Credentials a client needs to open a chat connection.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatConnectResponse {
    pub api_key: String,
    pub user_token: String,
    pub user_id: String,
    pub user_name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DirectChannelRequest {
    pub target_user_id: Option<Uuid>,
}

/// Deterministic two-member channel descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DirectChannel {
    #[serde(rename = "type")]
    pub channel_type: String,
    pub id: String,
    pub name: String,
    pub members: Vec<String>,
}

/// Channel member as seen by a client.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelMember {
    pub user_id: String,
    pub name: Option<String>,
}

/// Events that affect the aggregated unread count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    MessageNew { sender_id: String },
    MarkRead,
    ChannelUpdated,
}
