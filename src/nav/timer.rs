use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::nav::menu::EpisodeId;

/// Everything the navigation controller waits on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavTimer {
    /// Delayed route change for an accepted deep link
    LinkNavigate { path: String },
    /// Menu fallback for a lost animation-end signal
    MenuFallback(EpisodeId),
    /// Quiet period after the last search keystroke
    SearchDebounce { generation: u64 },
}

pub type NavScheduler = Scheduler<NavTimer>;

/// Handle for a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Single-threaded timer queue driven by an explicit clock.
///
/// Nothing fires on its own: the owner moves time forward with `pop_due` /
/// `advance_to` and dispatches the payloads it gets back, the way a UI event
/// loop drains its timers between input events. Timers with equal deadlines
/// fire in scheduling order.
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, TimerId), T>,
    deadlines: HashMap<TimerId, Duration>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Scheduler {
            now: Duration::ZERO,
            next_id: 0,
            queue: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    /// Current clock value (time since the scheduler was created)
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, delay: Duration, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let deadline = self.now + delay;
        self.queue.insert((deadline, id), payload);
        self.deadlines.insert(id, deadline);
        id
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id) {
            Some(deadline) => self.queue.remove(&(deadline, id)).is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Remove and return the earliest timer due at or before `until`, moving
    /// the clock to its deadline.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, T)> {
        let (&(deadline, id), _) = self.queue.first_key_value()?;
        if deadline > until {
            return None;
        }
        let payload = self.queue.remove(&(deadline, id))?;
        self.deadlines.remove(&id);
        self.now = self.now.max(deadline);
        Some((id, payload))
    }

    /// Move the clock forward. Never moves it backwards.
    pub fn advance_to(&mut self, at: Duration) {
        self.now = self.now.max(at);
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.queue.clear();
        self.deadlines.clear();
    }
}
