//! Deep link intake.
//!
//! The host shell reports links two ways: a live "link opened" subscription
//! and a one-shot query for the link that launched the app. Both land in the
//! same channel as [`LinkEvent`]s and go through one handler.

use std::sync::mpsc;

use crate::io::pending_invite::PendingInviteStore;
use crate::model::config::LinkConfig;
use crate::nav::timer::{NavScheduler, NavTimer, TimerId};
use crate::parse::link::{event_route, parse_link};

/// How a link reached the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOrigin {
    /// Opened while the app was running
    Live,
    /// The link that launched the app
    Launch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEvent {
    pub origin: LinkOrigin,
    pub url: String,
}

/// Sending half handed to the host bridge for live link events
#[derive(Debug, Clone)]
pub struct LinkSink(mpsc::Sender<LinkEvent>);

impl LinkSink {
    /// Deliver a live link. Returns false once the dispatcher is gone.
    pub fn deliver(&self, url: impl Into<String>) -> bool {
        self.0
            .send(LinkEvent {
                origin: LinkOrigin::Live,
                url: url.into(),
            })
            .is_ok()
    }
}

/// Native shell capabilities for app links
pub trait HostBridge {
    fn is_native_runtime(&self) -> bool;
    fn on_link_opened(&mut self, sink: LinkSink);
    fn get_launch_link(&mut self) -> Option<String>;
    fn remove_all_link_listeners(&mut self);
}

/// Bridge whose links are pushed by hand, for replay and tests
#[derive(Debug, Default)]
pub struct ManualBridge {
    native: bool,
    launch: Option<String>,
    sinks: Vec<LinkSink>,
    launch_queries: usize,
}

impl ManualBridge {
    pub fn native() -> Self {
        ManualBridge {
            native: true,
            ..Default::default()
        }
    }

    /// A plain browser: no app-link support
    pub fn web() -> Self {
        ManualBridge::default()
    }

    pub fn with_launch_link(mut self, url: impl Into<String>) -> Self {
        self.launch = Some(url.into());
        self
    }

    /// Fire a live link at every registered listener. Returns how many
    /// listeners received it.
    pub fn open(&self, url: &str) -> usize {
        self.sinks.iter().filter(|sink| sink.deliver(url)).count()
    }

    pub fn listener_count(&self) -> usize {
        self.sinks.len()
    }

    pub fn launch_queries(&self) -> usize {
        self.launch_queries
    }
}

impl HostBridge for ManualBridge {
    fn is_native_runtime(&self) -> bool {
        self.native
    }

    fn on_link_opened(&mut self, sink: LinkSink) {
        self.sinks.push(sink);
    }

    fn get_launch_link(&mut self) -> Option<String> {
        self.launch_queries += 1;
        self.launch.clone()
    }

    fn remove_all_link_listeners(&mut self) {
        self.sinks.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    Unstarted,
    /// Not inside the native shell
    Disabled,
    Listening,
    TornDown,
}

/// What the handler did with one link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Navigation to `path` is scheduled
    Scheduled { path: String, invite_recorded: bool },
    /// Not an event link, or a malformed id
    Rejected,
}

pub struct DeepLinkDispatcher {
    state: DispatcherState,
    tx: mpsc::Sender<LinkEvent>,
    rx: mpsc::Receiver<LinkEvent>,
    config: LinkConfig,
    scheduled: Vec<TimerId>,
}

impl DeepLinkDispatcher {
    pub fn new(config: &LinkConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        DeepLinkDispatcher {
            state: DispatcherState::Unstarted,
            tx,
            rx,
            config: config.clone(),
            scheduled: Vec::new(),
        }
    }

    pub fn state(&self) -> DispatcherState {
        self.state
    }

    /// Register the live listener and query the launch link. Only the first
    /// call does anything.
    pub fn start(&mut self, bridge: &mut dyn HostBridge) {
        if self.state != DispatcherState::Unstarted {
            return;
        }
        if !bridge.is_native_runtime() {
            tracing::info!("not running in the native shell, deep links disabled");
            self.state = DispatcherState::Disabled;
            return;
        }
        bridge.on_link_opened(LinkSink(self.tx.clone()));
        self.state = DispatcherState::Listening;
        if let Some(url) = bridge.get_launch_link() {
            // the receiver lives in self, so this cannot fail
            let _ = self.tx.send(LinkEvent {
                origin: LinkOrigin::Launch,
                url,
            });
        }
    }

    /// Handle every link event received since the last poll
    pub fn poll(
        &mut self,
        invites: &mut PendingInviteStore,
        scheduler: &mut NavScheduler,
    ) -> Vec<(LinkEvent, DispatchOutcome)> {
        let events: Vec<LinkEvent> = self.rx.try_iter().collect();
        if self.state != DispatcherState::Listening {
            return Vec::new();
        }
        events
            .into_iter()
            .map(|event| {
                let outcome = self.handle(&event, invites, scheduler);
                (event, outcome)
            })
            .collect()
    }

    fn handle(
        &mut self,
        event: &LinkEvent,
        invites: &mut PendingInviteStore,
        scheduler: &mut NavScheduler,
    ) -> DispatchOutcome {
        let Some(link) = parse_link(&event.url, self.config.app_scheme.as_deref()) else {
            return DispatchOutcome::Rejected;
        };
        let invite_recorded = match invites.record(&link) {
            Ok(recorded) => recorded,
            Err(e) => {
                tracing::warn!(error = %e, "could not store pending invite");
                false
            }
        };
        let path = event_route(&link);
        tracing::debug!(origin = ?event.origin, %path, "deep link accepted");
        let id = scheduler.schedule(
            self.config.navigate_delay(),
            NavTimer::LinkNavigate { path: path.clone() },
        );
        self.scheduled.push(id);
        DispatchOutcome::Scheduled {
            path,
            invite_recorded,
        }
    }

    /// Claim a fired navigation timer. False if it was not ours or the
    /// dispatcher has been torn down since.
    pub fn navigation_due(&mut self, id: TimerId) -> bool {
        match self.scheduled.iter().position(|t| *t == id) {
            Some(pos) => {
                self.scheduled.swap_remove(pos);
                self.state == DispatcherState::Listening
            }
            None => false,
        }
    }

    pub fn teardown(&mut self, bridge: &mut dyn HostBridge, scheduler: &mut NavScheduler) {
        if self.state == DispatcherState::Listening {
            bridge.remove_all_link_listeners();
        }
        for id in self.scheduled.drain(..) {
            scheduler.cancel(id);
        }
        self.state = DispatcherState::TornDown;
    }
}
