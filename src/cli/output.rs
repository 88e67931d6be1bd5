use serde::Serialize;

use crate::model::link::PendingInvite;
use crate::model::menu::MenuButton;
use crate::nav::app::{Cause, LogEntry, Notice};
use crate::ops::search::SearchResults;
use crate::parse::link::{LinkMatch, event_route};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct LinkMatchJson {
    pub url: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invite_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate: Option<String>,
}

#[derive(Serialize)]
pub struct ReplayJson {
    pub log: Vec<LogEntry>,
    pub active_button: Option<MenuButton>,
    pub pending_invite: Option<PendingInvite>,
}

pub fn link_match_to_json(url: &str, outcome: &LinkMatch) -> LinkMatchJson {
    let mut json = LinkMatchJson {
        url: url.to_string(),
        status: "unrecognized",
        event_id: None,
        invite_token: None,
        route: None,
        candidate: None,
    };
    match outcome {
        LinkMatch::Event(link) => {
            json.status = "event";
            json.event_id = Some(link.event_id.to_string());
            json.invite_token = link.invite_token.clone();
            json.route = Some(event_route(link));
        }
        LinkMatch::InvalidId(candidate) => {
            json.status = "invalid-id";
            json.candidate = Some(candidate.clone());
        }
        LinkMatch::Unrecognized => {}
    }
    json
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

pub fn format_link_match(url: &str, outcome: &LinkMatch) -> String {
    match outcome {
        LinkMatch::Event(link) => {
            let invite = match &link.invite_token {
                Some(token) => format!(" (invite {})", token),
                None => String::new(),
            };
            format!("{}: event {}{} -> {}", url, link.event_id, invite, event_route(link))
        }
        LinkMatch::InvalidId(candidate) => format!("{}: invalid event id {:?}", url, candidate),
        LinkMatch::Unrecognized => format!("{}: not an event link", url),
    }
}

fn cause_name(cause: Cause) -> &'static str {
    match cause {
        Cause::Menu => "menu",
        Cause::DeepLink => "deep link",
        Cause::Search => "search",
    }
}

/// One log entry as text; search matches get one indented line each
pub fn format_log_entry(entry: &LogEntry) -> Vec<String> {
    let prefix = format!("{:>6}ms", entry.at_ms);
    let line = |text: String| format!("{}  {}", prefix, text);
    match &entry.notice {
        Notice::LinkAccepted {
            url,
            path,
            invite_recorded,
        } => {
            let invite = if *invite_recorded { " (invite saved)" } else { "" };
            vec![line(format!("link {} -> {}{}", url, path, invite))]
        }
        Notice::LinkRejected { url } => vec![line(format!("link {} rejected", url))],
        Notice::Navigated { path, cause } => {
            vec![line(format!("navigate {} ({})", path, cause_name(*cause)))]
        }
        Notice::MenuClosed => vec![line("menu closed".to_string())],
        Notice::LoggedOut => vec![line("logout".to_string())],
        Notice::ClickIgnored { button } => vec![line(format!("click {} ignored", button))],
        Notice::SelectionIgnored { index } => vec![line(format!("select {} ignored", index))],
        Notice::Search { term, results } => match results {
            SearchResults::Empty => vec![line(format!("search {:?}: too short", term))],
            SearchResults::NotReady => vec![line(format!("search {:?}: not ready", term))],
            SearchResults::Matches(hits) => {
                let mut lines = vec![line(format!("search {:?}: {} result(s)", term, hits.len()))];
                for (i, hit) in hits.iter().enumerate() {
                    lines.push(format!(
                        "          {}. {} -> {}",
                        i,
                        hit.entry.display_name,
                        hit.entry.route()
                    ));
                }
                lines
            }
        },
    }
}

pub fn format_invite(invite: &PendingInvite) -> String {
    format!("{} (token {})", invite.event_id, invite.invite_token)
}
