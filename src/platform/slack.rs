//! Slack Web API client backing [`PlatformClient`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::trace;

use super::{ConversationInfo, PlatformClient, UserInfo};
use crate::config::SlackConfig;
use crate::error::PlatformError;

#[derive(Debug, Deserialize)]
struct SlackEnvelope {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

#[derive(Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl SlackClient {
    pub fn new(config: &SlackConfig, token: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("slack-suppressor/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: token.trim().to_string(),
        })
    }

    /// Request a websocket URL for the real-time messaging session.
    pub async fn rtm_connect(&self) -> Result<String, PlatformError> {
        self.call("rtm.connect", &[], "url").await
    }

    /// POST a form-encoded method call and return the named response field.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, &str)],
        field: &str,
    ) -> Result<T, PlatformError> {
        let mut fields = self.call_raw(method, params).await?;
        let value = fields.remove(field).ok_or_else(|| PlatformError::Decode {
            method: method.to_string(),
            message: format!("missing `{field}`"),
        })?;
        serde_json::from_value(value).map_err(|e| PlatformError::Decode {
            method: method.to_string(),
            message: e.to_string(),
        })
    }

    async fn call_raw(
        &self,
        method: &str,
        params: &[(&str, &str)],
    ) -> Result<Map<String, Value>, PlatformError> {
        let url = format!("{}/{}", self.api_base, method);
        trace!("Calling slack api {}", method);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .form(params)
            .send()
            .await
            .map_err(|source| PlatformError::Transport {
                method: method.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::Status {
                method: method.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let envelope: SlackEnvelope =
            response.json().await.map_err(|e| PlatformError::Decode {
                method: method.to_string(),
                message: e.to_string(),
            })?;

        if !envelope.ok {
            return Err(PlatformError::api(
                method,
                envelope.error.unwrap_or_else(|| "unknown_error".to_string()),
            ));
        }
        Ok(envelope.fields)
    }
}

#[async_trait]
impl PlatformClient for SlackClient {
    async fn channel_info(&self, channel_id: &str) -> Result<ConversationInfo, PlatformError> {
        self.call("channels.info", &[("channel", channel_id)], "channel")
            .await
    }

    async fn group_info(&self, group_id: &str) -> Result<ConversationInfo, PlatformError> {
        self.call("groups.info", &[("channel", group_id)], "group")
            .await
    }

    async fn set_channel_read_mark(
        &self,
        channel_id: &str,
        ts: &str,
    ) -> Result<(), PlatformError> {
        self.call_raw("channels.mark", &[("channel", channel_id), ("ts", ts)])
            .await
            .map(|_| ())
    }

    async fn set_group_read_mark(&self, group_id: &str, ts: &str) -> Result<(), PlatformError> {
        self.call_raw("groups.mark", &[("channel", group_id), ("ts", ts)])
            .await
            .map(|_| ())
    }

    async fn user_info(&self, user_id: &str) -> Result<UserInfo, PlatformError> {
        self.call("users.info", &[("user", user_id)], "user").await
    }
}
