use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::marker::Actor;
use crate::origin::Origin;
use crate::platform::MessageEvent;

/// One message whose notification was suppressed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuppressedEvent {
    pub event: MessageEvent,
    pub origin: Origin,
    pub actor: Option<Actor>,
    pub recorded_at: DateTime<Utc>,
}

impl SuppressedEvent {
    /// Assemble a record stamped with the current time.
    pub fn record(event: MessageEvent, origin: Origin, actor: Option<Actor>) -> Self {
        Self::recorded_at(event, origin, actor, Utc::now())
    }

    pub fn recorded_at(
        event: MessageEvent,
        origin: Origin,
        actor: Option<Actor>,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event,
            origin,
            actor,
            recorded_at,
        }
    }

    pub fn username(&self) -> &str {
        self.actor
            .as_ref()
            .map(|actor| actor.display_name.as_str())
            .unwrap_or("Unknown")
    }
}

/// Convert a platform timestamp token (`"1610000000.000100"`) to a UTC time.
///
/// Fractional seconds are truncated toward zero, never rounded.
pub fn parse_timestamp(token: &str) -> Option<DateTime<Utc>> {
    let token = token.trim();
    let (whole, fraction) = token.split_once('.').unwrap_or((token, ""));

    let seconds = match whole.parse::<i64>() {
        Ok(seconds) if fraction.bytes().all(|b| b.is_ascii_digit()) => seconds,
        _ => {
            let value: f64 = token.parse().ok()?;
            if !value.is_finite() {
                return None;
            }
            value.trunc() as i64
        }
    };

    DateTime::from_timestamp(seconds, 0)
}

/// Human-readable rendering of a message timestamp.
pub fn display_timestamp(token: &str) -> String {
    match parse_timestamp(token) {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => token.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::origin::OriginKind;

    #[test]
    fn test_fraction_is_truncated() {
        let parsed = parse_timestamp("1610000000.000100").unwrap();
        assert_eq!(parsed, DateTime::from_timestamp(1610000000, 0).unwrap());

        let parsed = parse_timestamp("1610000000.999999").unwrap();
        assert_eq!(parsed.timestamp(), 1610000000);
    }

    #[test]
    fn test_negative_fraction_truncates_toward_zero() {
        assert_eq!(parse_timestamp("-1.75").unwrap().timestamp(), -1);
    }

    #[test]
    fn test_token_without_fraction() {
        assert_eq!(parse_timestamp("1610000000").unwrap().timestamp(), 1610000000);
    }

    #[test]
    fn test_unparsable_token() {
        assert_eq!(parse_timestamp("not-a-ts"), None);
        assert_eq!(parse_timestamp("12.ab"), None);
        assert_eq!(display_timestamp("not-a-ts"), "not-a-ts");
    }

    #[test]
    fn test_display_timestamp() {
        assert_eq!(
            display_timestamp("1610000000.000100"),
            "2021-01-07 06:13:20 UTC"
        );
    }

    #[test]
    fn test_username_defaults_to_unknown() {
        let record = SuppressedEvent::record(
            MessageEvent::default(),
            Origin::new(OriginKind::Channel, "C1", "ops-alerts"),
            None,
        );
        assert_eq!(record.username(), "Unknown");
    }
}
