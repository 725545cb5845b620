use serde::Serialize;
use tracing::trace;

use crate::error::OriginLookupError;
use crate::platform::{ConversationInfo, PlatformClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginKind {
    Channel,
    Group,
}

impl OriginKind {
    /// Section label used by the human-readable formats
    pub fn label(self) -> &'static str {
        match self {
            OriginKind::Channel => "Channel",
            OriginKind::Group => "Group",
        }
    }
}

impl std::fmt::Display for OriginKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OriginKind::Channel => write!(f, "channel"),
            OriginKind::Group => write!(f, "group"),
        }
    }
}

/// The channel or group a message was posted in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Origin {
    pub kind: OriginKind,
    pub id: String,
    pub name: String,
}

impl Origin {
    pub fn new(kind: OriginKind, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            name: name.into(),
        }
    }

    fn from_info(kind: OriginKind, info: ConversationInfo) -> Self {
        Self::new(kind, info.id, info.name)
    }
}

/// Look the id up as a channel first, then as a group.
///
/// Every call goes to the platform; nothing is cached between events.
pub async fn resolve(
    client: &dyn PlatformClient,
    origin_id: &str,
) -> Result<Origin, OriginLookupError> {
    match client.channel_info(origin_id).await {
        Ok(info) => return Ok(Origin::from_info(OriginKind::Channel, info)),
        Err(e) => trace!("{} is not a channel ({}), trying group", origin_id, e),
    }

    client
        .group_info(origin_id)
        .await
        .map(|info| Origin::from_info(OriginKind::Group, info))
        .map_err(|source| OriginLookupError {
            origin_id: origin_id.to_string(),
            source,
        })
}
