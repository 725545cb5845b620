//! Recording `PlatformClient` used by pipeline and event-loop tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ConversationInfo, PlatformClient, UserInfo};
use crate::error::PlatformError;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ChannelInfo(String),
    GroupInfo(String),
    ChannelMark { id: String, ts: String },
    GroupMark { id: String, ts: String },
    UserInfo(String),
}

#[derive(Default)]
pub struct SpyClient {
    channels: HashMap<String, String>,
    groups: HashMap<String, String>,
    users: HashMap<String, String>,
    fail_marks: bool,
    calls: Mutex<Vec<Call>>,
}

impl SpyClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(mut self, id: &str, name: &str) -> Self {
        self.channels.insert(id.to_string(), name.to_string());
        self
    }

    pub fn with_group(mut self, id: &str, name: &str) -> Self {
        self.groups.insert(id.to_string(), name.to_string());
        self
    }

    pub fn with_user(mut self, id: &str, name: &str) -> Self {
        self.users.insert(id.to_string(), name.to_string());
        self
    }

    pub fn failing_marks(mut self) -> Self {
        self.fail_marks = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mark_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::ChannelMark { .. } | Call::GroupMark { .. }))
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PlatformClient for SpyClient {
    async fn channel_info(&self, channel_id: &str) -> Result<ConversationInfo, PlatformError> {
        self.record(Call::ChannelInfo(channel_id.to_string()));
        self.channels
            .get(channel_id)
            .map(|name| ConversationInfo {
                id: channel_id.to_string(),
                name: name.clone(),
            })
            .ok_or_else(|| PlatformError::api("channels.info", "channel_not_found"))
    }

    async fn group_info(&self, group_id: &str) -> Result<ConversationInfo, PlatformError> {
        self.record(Call::GroupInfo(group_id.to_string()));
        self.groups
            .get(group_id)
            .map(|name| ConversationInfo {
                id: group_id.to_string(),
                name: name.clone(),
            })
            .ok_or_else(|| PlatformError::api("groups.info", "group_not_found"))
    }

    async fn set_channel_read_mark(
        &self,
        channel_id: &str,
        ts: &str,
    ) -> Result<(), PlatformError> {
        self.record(Call::ChannelMark {
            id: channel_id.to_string(),
            ts: ts.to_string(),
        });
        if self.fail_marks {
            return Err(PlatformError::api("channels.mark", "not_in_channel"));
        }
        Ok(())
    }

    async fn set_group_read_mark(&self, group_id: &str, ts: &str) -> Result<(), PlatformError> {
        self.record(Call::GroupMark {
            id: group_id.to_string(),
            ts: ts.to_string(),
        });
        if self.fail_marks {
            return Err(PlatformError::api("groups.mark", "not_in_group"));
        }
        Ok(())
    }

    async fn user_info(&self, user_id: &str) -> Result<UserInfo, PlatformError> {
        self.record(Call::UserInfo(user_id.to_string()));
        self.users
            .get(user_id)
            .map(|name| UserInfo {
                id: user_id.to_string(),
                name: name.clone(),
                real_name: None,
            })
            .ok_or_else(|| PlatformError::api("users.info", "user_not_found"))
    }
}
