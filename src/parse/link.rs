//! Deep link recognition.
//!
//! Links the app owns look like `https://<host>/event/<uuid>[?invite_token=<t>]`.
//! Anything else is simply not ours and is reported as `Unrecognized`.

use regex::Regex;
use url::Url;
use url::form_urlencoded;

use crate::model::link::{EventId, ParsedLink};

/// Base used to resolve path-only links such as `/event/<id>?invite_token=x`
const LOCAL_BASE: &str = "http://localhost/";

const EVENT_PREFIX: &str = "/event/";

/// Result of matching a raw link against the event link shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkMatch {
    /// A well-formed event link
    Event(ParsedLink),
    /// Not an event link. The normal case for links the app doesn't own.
    Unrecognized,
    /// Event link shape, but the id is not a canonical UUID
    InvalidId(String),
}

/// Match a raw link. Pure: no logging, no I/O.
///
/// Standard URL parsing is tried first. If it fails, or yields a path that is
/// not an event path, a permissive `http(s)://<host>/event/<id>` pattern is
/// tried on the raw text.
pub fn match_link(raw: &str, app_scheme: Option<&str>) -> LinkMatch {
    let raw = raw.trim();

    let parts = split_standard(raw, app_scheme)
        .filter(|(path, _)| event_candidate(path).is_some())
        .or_else(|| split_fallback(raw));

    let Some((path, query)) = parts else {
        return LinkMatch::Unrecognized;
    };
    let Some(candidate) = event_candidate(&path) else {
        return LinkMatch::Unrecognized;
    };

    let event_id: EventId = match candidate.parse() {
        Ok(id) => id,
        Err(_) => return LinkMatch::InvalidId(candidate.to_string()),
    };

    LinkMatch::Event(ParsedLink {
        event_id,
        invite_token: query.as_deref().and_then(invite_token),
    })
}

/// Match a raw link and log anything that isn't a usable event link.
pub fn parse_link(raw: &str, app_scheme: Option<&str>) -> Option<ParsedLink> {
    match match_link(raw, app_scheme) {
        LinkMatch::Event(link) => Some(link),
        LinkMatch::Unrecognized => {
            tracing::info!(url = raw, "link not recognized, ignoring");
            None
        }
        LinkMatch::InvalidId(id) => {
            tracing::warn!(url = raw, id = %id, "rejecting link with invalid event id");
            None
        }
    }
}

/// In-app route for a parsed link: `/event/<id>`, plus the invite token when present.
pub fn event_route(link: &ParsedLink) -> String {
    with_invite_query(format!("{}{}", EVENT_PREFIX, link.event_id), link)
}

/// Custom-scheme link that opens the native app on the same event.
pub fn app_link(scheme: &str, link: &ParsedLink) -> String {
    with_invite_query(format!("{}://event/{}", scheme, link.event_id), link)
}

fn with_invite_query(mut base: String, link: &ParsedLink) -> String {
    if let Some(token) = &link.invite_token {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("invite_token", token)
            .finish();
        base.push('?');
        base.push_str(&query);
    }
    base
}

/// Standards-based split into (path, query).
fn split_standard(raw: &str, app_scheme: Option<&str>) -> Option<(String, Option<String>)> {
    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) if raw.starts_with('/') => {
            Url::parse(LOCAL_BASE).ok()?.join(raw).ok()?
        }
        Err(_) => return None,
    };

    let path = match url.scheme() {
        "http" | "https" => url.path().to_string(),
        // zigzag://event/<id> puts "event" in the host position
        scheme if app_scheme.is_some_and(|s| s.eq_ignore_ascii_case(scheme)) => {
            format!("/{}{}", url.host_str().unwrap_or(""), url.path())
        }
        _ => return None,
    };

    Some((path, url.query().map(str::to_string)))
}

/// Permissive split for links the URL parser refuses.
fn split_fallback(raw: &str) -> Option<(String, Option<String>)> {
    let re = Regex::new(r"(?i)^https?://[^/?#\s]+(/event/[^?#\s]*)(?:\?([^#\s]*))?").ok()?;
    let caps = re.captures(raw)?;
    let path = caps.get(1)?.as_str().to_string();
    let query = caps.get(2).map(|m| m.as_str().to_string());
    Some((path, query))
}

/// The id segment of `/event/<id>`, if the path has exactly that shape
fn event_candidate(path: &str) -> Option<&str> {
    let rest = path.strip_prefix(EVENT_PREFIX)?;
    if rest.is_empty() || rest.contains('/') {
        return None;
    }
    Some(rest)
}

fn invite_token(query: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "invite_token")
        .map(|(_, value)| value.into_owned())
        .filter(|token| !token.is_empty())
}
