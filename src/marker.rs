use serde::Serialize;
use tracing::debug;

use crate::error::{MarkReadError, PlatformError};
use crate::origin::{Origin, OriginKind};
use crate::platform::{MessageEvent, PlatformClient, UserInfo};

/// The user who sent a suppressed message, resolved for display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub id: String,
    pub display_name: String,
}

impl From<UserInfo> for Actor {
    fn from(user: UserInfo) -> Self {
        let display_name = if user.name.is_empty() {
            user.real_name.unwrap_or_default()
        } else {
            user.name
        };
        Self {
            id: user.id,
            display_name,
        }
    }
}

/// Advance the read cursor of `origin` up to the event's raw timestamp.
///
/// The sender is looked up alongside the mark call. A failed lookup only
/// leaves the actor absent; a failed mark is returned as `MarkReadError`
/// with whatever actor was resolved.
pub async fn mark_read(
    client: &dyn PlatformClient,
    origin: &Origin,
    event: &MessageEvent,
) -> Result<Option<Actor>, MarkReadError> {
    let (marked, actor) = tokio::join!(
        set_read_mark(client, origin, &event.ts),
        resolve_actor(client, &event.user)
    );

    match marked {
        Ok(()) => Ok(actor),
        Err(source) => Err(MarkReadError {
            origin: origin.clone(),
            actor,
            source,
        }),
    }
}

async fn set_read_mark(
    client: &dyn PlatformClient,
    origin: &Origin,
    ts: &str,
) -> Result<(), PlatformError> {
    match origin.kind {
        OriginKind::Channel => client.set_channel_read_mark(&origin.id, ts).await,
        OriginKind::Group => client.set_group_read_mark(&origin.id, ts).await,
    }
}

async fn resolve_actor(client: &dyn PlatformClient, user_id: &str) -> Option<Actor> {
    if user_id.is_empty() {
        return None;
    }
    match client.user_info(user_id).await {
        Ok(user) => Some(user.into()),
        Err(e) => {
            debug!("Sender {} unresolved: {}", user_id, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::spy::{Call, SpyClient};

    fn event(channel: &str, user: &str, ts: &str) -> MessageEvent {
        MessageEvent {
            channel: channel.to_string(),
            user: user.to_string(),
            ts: ts.to_string(),
            text: "hello".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_channel_mark_uses_raw_timestamp() {
        let client = SpyClient::new().with_user("U1", "alice");
        let origin = Origin::new(OriginKind::Channel, "C1", "ops-alerts");

        let actor = mark_read(&client, &origin, &event("C1", "U1", "1610000000.000100"))
            .await
            .unwrap();

        assert_eq!(
            actor,
            Some(Actor {
                id: "U1".to_string(),
                display_name: "alice".to_string()
            })
        );
        assert_eq!(
            client.mark_calls(),
            vec![Call::ChannelMark {
                id: "C1".to_string(),
                ts: "1610000000.000100".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_group_mark_uses_group_endpoint() {
        let client = SpyClient::new();
        let origin = Origin::new(OriginKind::Group, "G7", "incident-room");

        mark_read(&client, &origin, &event("G7", "U1", "42.000001"))
            .await
            .unwrap();

        assert_eq!(
            client.mark_calls(),
            vec![Call::GroupMark {
                id: "G7".to_string(),
                ts: "42.000001".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_unknown_sender_is_absent_not_an_error() {
        let client = SpyClient::new();
        let origin = Origin::new(OriginKind::Channel, "C1", "ops-alerts");

        let actor = mark_read(&client, &origin, &event("C1", "U404", "1.0"))
            .await
            .unwrap();
        assert_eq!(actor, None);
    }

    #[tokio::test]
    async fn test_empty_sender_skips_user_lookup() {
        let client = SpyClient::new();
        let origin = Origin::new(OriginKind::Channel, "C1", "ops-alerts");

        mark_read(&client, &origin, &event("C1", "", "1.0"))
            .await
            .unwrap();
        assert!(!client
            .calls()
            .iter()
            .any(|call| matches!(call, Call::UserInfo(_))));
    }

    #[tokio::test]
    async fn test_mark_failure_keeps_resolved_actor() {
        let client = SpyClient::new().with_user("U1", "alice").failing_marks();
        let origin = Origin::new(OriginKind::Group, "G1", "sre");

        let err = mark_read(&client, &origin, &event("G1", "U1", "1.0"))
            .await
            .unwrap_err();

        assert_eq!(err.origin, origin);
        assert_eq!(err.actor.map(|a| a.display_name), Some("alice".to_string()));
        assert_eq!(err.source.api_code(), Some("not_in_group"));
    }
}
