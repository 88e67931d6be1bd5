use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of an event resource. Always displayed lowercase and hyphenated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventId(Uuid);

/// Returned when a candidate id is not a canonical UUID
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid event id: {0:?}")]
pub struct InvalidEventId(pub String);

impl FromStr for EventId {
    type Err = InvalidEventId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !is_canonical_uuid(s) {
            return Err(InvalidEventId(s.to_string()));
        }
        Uuid::parse_str(s)
            .map(EventId)
            .map_err(|_| InvalidEventId(s.to_string()))
    }
}

impl TryFrom<String> for EventId {
    type Error = InvalidEventId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EventId> for String {
    fn from(id: EventId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Canonical 8-4-4-4-12 hex form only. `Uuid::parse_str` alone also accepts
/// braced, urn and unhyphenated forms, which links must not use.
fn is_canonical_uuid(s: &str) -> bool {
    s.len() == 36
        && s.char_indices().all(|(i, c)| match i {
            8 | 13 | 18 | 23 => c == '-',
            _ => c.is_ascii_hexdigit(),
        })
}

/// A deep link the app owns, validated and ready for navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedLink {
    pub event_id: EventId,
    /// Opaque invitation credential, checked server-side later
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invite_token: Option<String>,
}

/// An invite waiting for the authentication flow to consume it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingInvite {
    pub event_id: EventId,
    pub invite_token: String,
}

impl ParsedLink {
    /// The invite this link carries, if any
    pub fn pending_invite(&self) -> Option<PendingInvite> {
        self.invite_token.as_ref().map(|token| PendingInvite {
            event_id: self.event_id,
            invite_token: token.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    const ID: &str = "123e4567-e89b-12d3-a456-426614174000";

    #[test]
    fn parses_canonical_uuid() {
        let id: EventId = ID.parse().unwrap();
        assert_eq!(id.to_string(), ID);
    }

    #[test]
    fn display_folds_case() {
        let id: EventId = ID.to_uppercase().parse().unwrap();
        assert_eq!(id.to_string(), ID);
    }

    #[test]
    fn rejects_non_canonical_forms() {
        for bad in [
            "not-a-uuid",
            "123e4567e89b12d3a456426614174000",
            "{123e4567-e89b-12d3-a456-426614174000}",
            "urn:uuid:123e4567-e89b-12d3-a456-426614174000",
            "123e4567-e89b-12d3-a456-42661417400g",
            "",
        ] {
            assert!(bad.parse::<EventId>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn hand_check_agrees_with_pattern() {
        let re = Regex::new(
            r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$",
        )
        .unwrap();
        for s in [
            ID,
            "not-a-uuid",
            "123E4567-E89B-12D3-A456-426614174000",
            "123e4567-e89b-12d3-a456-4266141740000",
        ] {
            assert_eq!(is_canonical_uuid(s), re.is_match(s), "{s}");
        }
    }

    #[test]
    fn pending_invite_only_with_token() {
        let id: EventId = ID.parse().unwrap();
        let without = ParsedLink { event_id: id, invite_token: None };
        assert!(without.pending_invite().is_none());

        let with = ParsedLink { event_id: id, invite_token: Some("abc123".into()) };
        let invite = with.pending_invite().unwrap();
        assert_eq!(invite.event_id, id);
        assert_eq!(invite.invite_token, "abc123");
    }

    #[test]
    fn serde_uses_string_form() {
        let id: EventId = ID.parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{ID}\""));
        assert!(serde_json::from_str::<EventId>("\"nope\"").is_err());
    }
}
