use indexmap::IndexMap;

use crate::model::config::SearchConfig;
use crate::model::directory::{DirectoryEntry, EntryKind, EventLists, ProfileRecord};
use crate::nav::collab::{DirectoryClient, FetchError};
use crate::ops::search::{SearchResults, search_entries};

/// Lifecycle of the search index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexState {
    /// No session
    Empty,
    Building { generation: u64 },
    Ready(Vec<DirectoryEntry>),
    /// The last build failed; stays not-ready until the next session change
    Failed,
}

/// Claim on one build. Completions for an older ticket are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildTicket(u64);

/// People first, then owned events, then invited events. The first
/// occurrence of a `(kind, id)` pair wins.
pub fn merge_entries(profiles: Vec<ProfileRecord>, events: EventLists) -> Vec<DirectoryEntry> {
    let entries = profiles
        .into_iter()
        .map(DirectoryEntry::from)
        .chain(
            events
                .owned
                .into_iter()
                .chain(events.invited)
                .map(DirectoryEntry::from),
        );

    let mut merged: IndexMap<(EntryKind, String), DirectoryEntry> = IndexMap::new();
    for entry in entries {
        merged.entry((entry.kind, entry.id.clone())).or_insert(entry);
    }
    merged.into_values().collect()
}

/// Fetch both halves of the directory and merge them
pub fn fetch_entries(client: &mut dyn DirectoryClient) -> Result<Vec<DirectoryEntry>, FetchError> {
    let profiles = client.fetch_profiles()?;
    let events = client.fetch_events()?;
    Ok(merge_entries(profiles, events))
}

#[derive(Debug)]
pub struct DirectoryIndex {
    state: IndexState,
    generation: u64,
    connected: bool,
    min_query_len: usize,
}

impl DirectoryIndex {
    pub fn new(config: &SearchConfig) -> Self {
        DirectoryIndex {
            state: IndexState::Empty,
            generation: 0,
            connected: false,
            min_query_len: config.min_query_len,
        }
    }

    pub fn state(&self) -> &IndexState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, IndexState::Ready(_))
    }

    /// Track the session flag. Connecting starts a fresh build and returns
    /// its ticket; disconnecting discards the index.
    pub fn session_changed(&mut self, connected: bool) -> Option<BuildTicket> {
        if connected == self.connected {
            return None;
        }
        self.connected = connected;
        self.generation += 1;
        if connected {
            self.state = IndexState::Building {
                generation: self.generation,
            };
            Some(BuildTicket(self.generation))
        } else {
            self.state = IndexState::Empty;
            None
        }
    }

    /// Install a build result. Returns false if the ticket is stale.
    pub fn complete(
        &mut self,
        ticket: BuildTicket,
        result: Result<Vec<DirectoryEntry>, FetchError>,
    ) -> bool {
        if self.state != (IndexState::Building { generation: ticket.0 }) {
            tracing::debug!(generation = ticket.0, "stale directory build dropped");
            return false;
        }
        self.state = match result {
            Ok(entries) => {
                tracing::debug!(entries = entries.len(), "directory ready");
                IndexState::Ready(entries)
            }
            Err(e) => {
                tracing::warn!(error = %e, "directory build failed, search disabled");
                IndexState::Failed
            }
        };
        true
    }

    pub fn query(&self, term: &str) -> SearchResults {
        if term.chars().count() < self.min_query_len {
            return SearchResults::Empty;
        }
        match &self.state {
            IndexState::Ready(entries) => SearchResults::Matches(search_entries(entries, term)),
            _ => SearchResults::NotReady,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::directory::EventRecord;
    use crate::nav::collab::{DirectoryData, StaticDirectory};
    use pretty_assertions::assert_eq;

    fn profile(id: &str, name: &str) -> ProfileRecord {
        ProfileRecord {
            id: id.into(),
            username: name.into(),
        }
    }

    fn event(id: &str, title: &str) -> EventRecord {
        EventRecord {
            id: id.into(),
            title: title.into(),
        }
    }

    fn sample() -> StaticDirectory {
        StaticDirectory::new(DirectoryData {
            profiles: vec![profile("1", "theo"), profile("2", "ana")],
            events: EventLists {
                owned: vec![event("e1", "Theatre night")],
                invited: vec![event("e2", "Picnic"), event("e1", "Theatre night")],
            },
        })
    }

    #[test]
    fn merge_keeps_order_and_dedupes() {
        let events = EventLists {
            owned: vec![event("7", "Owned")],
            invited: vec![event("7", "Invited copy"), event("8", "Other")],
        };
        let merged = merge_entries(vec![profile("7", "seven")], events);
        let names: Vec<&str> = merged.iter().map(|e| e.display_name.as_str()).collect();
        // a profile and an event may share an id
        assert_eq!(names, vec!["seven", "Owned", "Other"]);
    }

    #[test]
    fn build_then_query() {
        let mut index = DirectoryIndex::new(&SearchConfig::default());
        assert_eq!(index.query("th"), SearchResults::NotReady);

        let ticket = index.session_changed(true).unwrap();
        assert_eq!(index.query("th"), SearchResults::NotReady);
        assert!(index.complete(ticket, fetch_entries(&mut sample())));

        let hits = index.query("TH");
        let ids: Vec<&str> = hits.hits().iter().map(|h| h.entry.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "e1"]);
        assert_eq!(hits.hits()[1].entry.route(), "/event/e1");
    }

    #[test]
    fn short_query_is_empty() {
        let mut index = DirectoryIndex::new(&SearchConfig::default());
        let ticket = index.session_changed(true).unwrap();
        index.complete(ticket, fetch_entries(&mut sample()));
        assert_eq!(index.query("t"), SearchResults::Empty);
        assert_eq!(index.query(""), SearchResults::Empty);
        assert_eq!(index.query("zz"), SearchResults::Matches(vec![]));
    }

    #[test]
    fn failed_fetch_reports_not_ready() {
        let mut index = DirectoryIndex::new(&SearchConfig::default());
        let ticket = index.session_changed(true).unwrap();
        index.complete(ticket, fetch_entries(&mut StaticDirectory::unavailable()));
        assert_eq!(index.state(), &IndexState::Failed);
        assert_eq!(index.query("theo"), SearchResults::NotReady);
    }

    #[test]
    fn stale_build_is_dropped() {
        let mut index = DirectoryIndex::new(&SearchConfig::default());
        let first = index.session_changed(true).unwrap();
        index.session_changed(false);
        let second = index.session_changed(true).unwrap();

        assert!(!index.complete(first, fetch_entries(&mut sample())));
        assert!(!index.is_ready());
        assert!(index.complete(second, Ok(Vec::new())));
        assert!(index.is_ready());
    }

    #[test]
    fn logout_discards_index() {
        let mut index = DirectoryIndex::new(&SearchConfig::default());
        let ticket = index.session_changed(true).unwrap();
        index.complete(ticket, fetch_entries(&mut sample()));
        assert_eq!(index.session_changed(true), None);
        index.session_changed(false);
        assert_eq!(index.state(), &IndexState::Empty);
        assert_eq!(index.query("theo"), SearchResults::NotReady);
    }
}
