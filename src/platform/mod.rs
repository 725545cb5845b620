pub mod rtm;
pub mod slack;

#[cfg(test)]
pub(crate) mod spy;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PlatformError;

/// A message posted in a channel or group, as delivered by the real-time feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent {
    /// Id of the channel or group the message was posted in
    #[serde(default)]
    pub channel: String,
    /// Id of the sending user; empty for bot and system messages
    #[serde(default)]
    pub user: String,
    /// Opaque platform timestamp (`"1610000000.000100"`), also the message id
    #[serde(default)]
    pub ts: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    /// Plain-text summary of the attachment
    #[serde(default)]
    pub fallback: String,
    /// Remaining attachment fields, kept verbatim for structured output
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
impl Attachment {
    pub fn with_fallback(fallback: impl Into<String>) -> Self {
        Self {
            fallback: fallback.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Events produced by the connection manager, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Message(MessageEvent),
    /// Recoverable transport or protocol failure; the manager reconnects on its own
    ConnectionError { message: String },
    /// The credential was rejected. Nothing follows this event.
    AuthInvalid,
}

/// Channel or group metadata returned by the info endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConversationInfo {
    pub id: String,
    /// Empty when the payload carries no name. Keyword matching treats an
    /// empty name as unrecognised and never matches it.
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub real_name: Option<String>,
}

/// The subset of the messaging platform API the suppressor depends on.
///
/// Implementations own transport concerns (auth, timeouts); callers never retry.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    async fn channel_info(&self, channel_id: &str) -> Result<ConversationInfo, PlatformError>;

    async fn group_info(&self, group_id: &str) -> Result<ConversationInfo, PlatformError>;

    async fn set_channel_read_mark(&self, channel_id: &str, ts: &str)
        -> Result<(), PlatformError>;

    async fn set_group_read_mark(&self, group_id: &str, ts: &str) -> Result<(), PlatformError>;

    async fn user_info(&self, user_id: &str) -> Result<UserInfo, PlatformError>;
}
