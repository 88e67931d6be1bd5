use std::ops::Range;
use std::time::Duration;

use regex::Regex;
use serde::Serialize;

use crate::model::config::SearchConfig;
use crate::model::directory::DirectoryEntry;
use crate::nav::timer::{NavScheduler, NavTimer, TimerId};

/// A directory entry whose display name matched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub entry: DirectoryEntry,
    /// Byte ranges of the matches within `entry.display_name`
    pub spans: Vec<Range<usize>>,
}

/// Outcome of a directory query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "hits", rename_all = "snake_case")]
pub enum SearchResults {
    /// Query too short
    Empty,
    /// Directory not loaded (yet, or the load failed)
    NotReady,
    Matches(Vec<SearchHit>),
}

impl SearchResults {
    pub fn hits(&self) -> &[SearchHit] {
        match self {
            SearchResults::Matches(hits) => hits,
            _ => &[],
        }
    }
}

/// Collect all non-overlapping match byte-ranges for a regex in the given text.
fn find_matches(re: &Regex, text: &str) -> Vec<Range<usize>> {
    re.find_iter(text).map(|m| m.start()..m.end()).collect()
}

/// Case-insensitive literal match of `term` against display names, in
/// directory order.
pub fn search_entries(entries: &[DirectoryEntry], term: &str) -> Vec<SearchHit> {
    let re = match Regex::new(&format!("(?i){}", regex::escape(term))) {
        Ok(re) => re,
        Err(e) => {
            tracing::warn!(error = %e, "search term rejected");
            return Vec::new();
        }
    };
    entries
        .iter()
        .filter_map(|entry| {
            let spans = find_matches(&re, &entry.display_name);
            (!spans.is_empty()).then(|| SearchHit {
                entry: entry.clone(),
                spans,
            })
        })
        .collect()
}

/// Restartable quiet-period timer for search input. Every keystroke replaces
/// the pending term and pushes the deadline out.
#[derive(Debug)]
pub struct SearchDebouncer {
    delay: Duration,
    generation: u64,
    pending: Option<(TimerId, String)>,
}

impl SearchDebouncer {
    pub fn new(config: &SearchConfig) -> Self {
        SearchDebouncer {
            delay: config.debounce(),
            generation: 0,
            pending: None,
        }
    }

    pub fn input(&mut self, term: &str, scheduler: &mut NavScheduler) {
        self.cancel(scheduler);
        self.generation += 1;
        let id = scheduler.schedule(
            self.delay,
            NavTimer::SearchDebounce {
                generation: self.generation,
            },
        );
        self.pending = Some((id, term.to_string()));
    }

    /// The term to query once the quiet period for `generation` is over.
    /// Superseded generations yield nothing.
    pub fn elapsed(&mut self, generation: u64) -> Option<String> {
        if generation != self.generation {
            return None;
        }
        self.pending.take().map(|(_, term)| term)
    }

    pub fn pending_term(&self) -> Option<&str> {
        self.pending.as_ref().map(|(_, term)| term.as_str())
    }

    pub fn cancel(&mut self, scheduler: &mut NavScheduler) {
        if let Some((id, _)) = self.pending.take() {
            scheduler.cancel(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::directory::EntryKind;
    use pretty_assertions::assert_eq;

    fn entry(id: &str, name: &str, kind: EntryKind) -> DirectoryEntry {
        DirectoryEntry {
            id: id.into(),
            display_name: name.into(),
            kind,
        }
    }

    #[test]
    fn matches_case_insensitively_with_spans() {
        let entries = vec![
            entry("1", "Theo", EntryKind::Profile),
            entry("2", "ana", EntryKind::Profile),
            entry("e1", "Theatre night at the THEATRE", EntryKind::Event),
        ];
        let hits = search_entries(&entries, "the");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].entry.id, "1");
        assert_eq!(hits[0].spans, vec![0..3]);
        assert_eq!(hits[1].spans, vec![0..3, 17..20, 21..24]);
    }

    #[test]
    fn term_is_literal() {
        let entries = vec![
            entry("1", "a.b", EntryKind::Profile),
            entry("2", "axb", EntryKind::Profile),
        ];
        let hits = search_entries(&entries, "a.");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entry.id, "1");
    }

    #[test]
    fn only_last_keystroke_survives() {
        let mut sched = NavScheduler::new();
        let mut debounce = SearchDebouncer::new(&SearchConfig::default());
        debounce.input("th", &mut sched);
        sched.advance_to(Duration::from_millis(50));
        debounce.input("theo", &mut sched);
        assert_eq!(sched.len(), 1);

        let mut ran = Vec::new();
        while let Some((_, timer)) = sched.pop_due(Duration::from_millis(1_000)) {
            if let NavTimer::SearchDebounce { generation } = timer {
                ran.extend(debounce.elapsed(generation));
            }
        }
        assert_eq!(sched.now(), Duration::from_millis(350));
        assert_eq!(ran, vec!["theo".to_string()]);
    }

    #[test]
    fn stale_generation_is_ignored() {
        let mut sched = NavScheduler::new();
        let mut debounce = SearchDebouncer::new(&SearchConfig::default());
        debounce.input("a", &mut sched);
        debounce.input("ab", &mut sched);
        assert_eq!(debounce.elapsed(1), None);
        assert_eq!(debounce.pending_term(), Some("ab"));
        assert_eq!(debounce.elapsed(2).as_deref(), Some("ab"));
        assert_eq!(debounce.elapsed(2), None);
    }
}
