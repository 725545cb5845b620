use std::path::PathBuf;

use crate::marker::Actor;
use crate::origin::Origin;

/// Failure to load the keyword configuration. Always fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// A single failed call against the messaging platform.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("slack api {method} request failed: {source}")]
    Transport {
        method: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("slack api {method} failed with status {status}: {body}")]
    Status {
        method: String,
        status: u16,
        body: String,
    },

    #[error("slack api {method} failed: {code}")]
    Api { method: String, code: String },

    #[error("failed to decode slack {method} response: {message}")]
    Decode { method: String, message: String },
}

impl PlatformError {
    pub fn api(method: &str, code: impl Into<String>) -> Self {
        Self::Api {
            method: method.to_string(),
            code: code.into(),
        }
    }

    /// Slack error code when the API answered with `ok: false`.
    pub fn api_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Neither a channel nor a group with the given id could be fetched.
///
/// Carries the error of the group lookup, which is the last attempt made.
#[derive(Debug, thiserror::Error)]
#[error("failed to resolve origin {origin_id}: {source}")]
pub struct OriginLookupError {
    pub origin_id: String,
    #[source]
    pub source: PlatformError,
}

/// The read mark could not be set.
///
/// The actor that was resolved alongside the mark call is kept so the caller
/// can still assemble a record if its policy asks for one.
#[derive(Debug, thiserror::Error)]
#[error("failed to mark {} {} as read: {source}", .origin.kind, .origin.name)]
pub struct MarkReadError {
    pub origin: Origin,
    pub actor: Option<Actor>,
    #[source]
    pub source: PlatformError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::origin::OriginKind;

    #[test]
    fn test_api_code_only_for_api_errors() {
        let err = PlatformError::api("groups.info", "channel_not_found");
        assert_eq!(err.api_code(), Some("channel_not_found"));

        let err = PlatformError::Decode {
            method: "users.info".to_string(),
            message: "missing user".to_string(),
        };
        assert_eq!(err.api_code(), None);
    }

    #[test]
    fn test_mark_read_error_names_origin() {
        let err = MarkReadError {
            origin: Origin::new(OriginKind::Group, "G1", "secret-ops"),
            actor: None,
            source: PlatformError::api("groups.mark", "not_in_group"),
        };
        assert_eq!(
            err.to_string(),
            "failed to mark group secret-ops as read: slack api groups.mark failed: not_in_group"
        );
    }
}
