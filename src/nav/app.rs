use std::time::Duration;

use serde::Serialize;

use crate::io::active_button::ActiveButtonStore;
use crate::io::pending_invite::PendingInviteStore;
use crate::io::store::{KeyValueStore, StoreError};
use crate::model::config::NavConfig;
use crate::model::link::PendingInvite;
use crate::model::menu::{ButtonState, MenuButton};
use crate::nav::collab::{DirectoryClient, Router, Session};
use crate::nav::deep_link::{DeepLinkDispatcher, DispatchOutcome, HostBridge};
use crate::nav::menu::{ClickOutcome, MenuNavigator, Resolution};
use crate::nav::timer::{NavScheduler, NavTimer, TimerId};
use crate::ops::directory::{DirectoryIndex, fetch_entries};
use crate::ops::search::{SearchDebouncer, SearchResults};

/// Everything the controller talks to
pub struct Collaborators {
    pub router: Box<dyn Router>,
    pub session: Box<dyn Session>,
    pub directory: Box<dyn DirectoryClient>,
    /// Session-scoped storage (pending invite)
    pub session_store: Box<dyn KeyValueStore>,
    /// Storage that outlives the session (active menu button)
    pub durable_store: Box<dyn KeyValueStore>,
}

/// Who asked for a route change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cause {
    Menu,
    DeepLink,
    Search,
}

/// Something observable the controller did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Notice {
    LinkAccepted {
        url: String,
        path: String,
        invite_recorded: bool,
    },
    LinkRejected {
        url: String,
    },
    Navigated {
        path: String,
        cause: Cause,
    },
    MenuClosed,
    LoggedOut,
    ClickIgnored {
        button: MenuButton,
    },
    Search {
        term: String,
        results: SearchResults,
    },
    SelectionIgnored {
        index: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub at_ms: u64,
    #[serde(flatten)]
    pub notice: Notice,
}

/// Owns the clock and wires the link dispatcher, menu and directory search to
/// the app's collaborators. Input events and timer firings are handled one at
/// a time; after `teardown` every entry point is a no-op.
pub struct NavController {
    scheduler: NavScheduler,
    links: DeepLinkDispatcher,
    invites: PendingInviteStore,
    menu: MenuNavigator,
    directory: DirectoryIndex,
    debouncer: SearchDebouncer,
    router: Box<dyn Router>,
    session: Box<dyn Session>,
    client: Box<dyn DirectoryClient>,
    results: SearchResults,
    connected: bool,
    torn_down: bool,
    log: Vec<LogEntry>,
}

impl NavController {
    pub fn new(config: &NavConfig, collab: Collaborators) -> Self {
        NavController {
            scheduler: NavScheduler::new(),
            links: DeepLinkDispatcher::new(&config.links),
            invites: PendingInviteStore::new(collab.session_store),
            menu: MenuNavigator::new(ActiveButtonStore::new(collab.durable_store), &config.menu),
            directory: DirectoryIndex::new(&config.search),
            debouncer: SearchDebouncer::new(&config.search),
            router: collab.router,
            session: collab.session,
            client: collab.directory,
            results: SearchResults::Empty,
            connected: false,
            torn_down: false,
            log: Vec::new(),
        }
    }

    /// Hook up deep links and handle the launch link, if any
    pub fn start(&mut self, bridge: &mut dyn HostBridge) {
        if self.torn_down {
            return;
        }
        self.links.start(bridge);
        self.poll_links();
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Deliver pending link events, then fire every timer due by `at`
    pub fn advance_to(&mut self, at: Duration) {
        if !self.torn_down {
            self.poll_links();
            while let Some((id, timer)) = self.scheduler.pop_due(at) {
                self.fire(id, timer);
            }
        }
        self.scheduler.advance_to(at);
    }

    /// Run the clock until no timers are left
    pub fn settle(&mut self) {
        self.advance_to(self.now());
        while let Some(deadline) = self.scheduler.next_deadline() {
            self.advance_to(deadline);
        }
    }

    fn fire(&mut self, id: TimerId, timer: NavTimer) {
        match timer {
            NavTimer::LinkNavigate { path } => {
                if self.links.navigation_due(id) {
                    self.navigate(&path, Cause::DeepLink);
                }
            }
            NavTimer::MenuFallback(episode) => {
                let resolution = self.menu.fallback_elapsed(
                    episode,
                    &mut self.scheduler,
                    self.router.as_mut(),
                    self.session.as_mut(),
                );
                self.resolved(resolution);
            }
            NavTimer::SearchDebounce { generation } => {
                if let Some(term) = self.debouncer.elapsed(generation) {
                    self.run_search(term);
                }
            }
        }
    }

    /// Handle link events queued by the host bridge
    pub fn poll_links(&mut self) {
        if self.torn_down {
            return;
        }
        for (event, outcome) in self.links.poll(&mut self.invites, &mut self.scheduler) {
            let notice = match outcome {
                DispatchOutcome::Scheduled {
                    path,
                    invite_recorded,
                } => Notice::LinkAccepted {
                    url: event.url,
                    path,
                    invite_recorded,
                },
                DispatchOutcome::Rejected => Notice::LinkRejected { url: event.url },
            };
            self.record(notice);
        }
    }

    pub fn click(&mut self, button: MenuButton) -> ClickOutcome {
        if self.torn_down {
            return ClickOutcome::Ignored;
        }
        let outcome = self.menu.click(button, &mut self.scheduler);
        if outcome == ClickOutcome::Ignored {
            self.record(Notice::ClickIgnored { button });
        }
        outcome
    }

    pub fn disconnect(&mut self) -> ClickOutcome {
        self.click(MenuButton::Disconnect)
    }

    /// Animation-end callback from the menu view
    pub fn animation_finished(&mut self, button: MenuButton) {
        if self.torn_down {
            return;
        }
        let resolution = self.menu.animation_finished(
            button,
            &mut self.scheduler,
            self.router.as_mut(),
            self.session.as_mut(),
        );
        self.resolved(resolution);
    }

    fn resolved(&mut self, resolution: Option<Resolution>) {
        match resolution {
            None => {}
            Some(Resolution::Navigated(path)) => self.after_navigate(path, Cause::Menu),
            Some(Resolution::MenuClosed) => self.record(Notice::MenuClosed),
            Some(Resolution::Disconnected) => {
                self.record(Notice::LoggedOut);
                self.after_navigate(MenuButton::Disconnect.target_path().to_string(), Cause::Menu);
                self.set_session(false);
            }
        }
    }

    fn navigate(&mut self, path: &str, cause: Cause) {
        self.router.navigate(path);
        self.after_navigate(path.to_string(), cause);
    }

    fn after_navigate(&mut self, path: String, cause: Cause) {
        self.menu.sync_route(&path);
        self.record(Notice::Navigated { path, cause });
    }

    /// The route changed underneath us (back button, in-page link)
    pub fn route_changed(&mut self, path: &str) {
        if self.torn_down {
            return;
        }
        self.menu.sync_route(path);
    }

    /// Session flag changed. Connecting rebuilds the directory; disconnecting
    /// drops it along with any pending search.
    pub fn set_session(&mut self, connected: bool) {
        if self.torn_down || connected == self.connected {
            return;
        }
        self.connected = connected;
        match self.directory.session_changed(connected) {
            Some(ticket) => {
                let result = fetch_entries(self.client.as_mut());
                self.directory.complete(ticket, result);
            }
            None => {
                self.debouncer.cancel(&mut self.scheduler);
                self.results = SearchResults::Empty;
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// A keystroke in the search box
    pub fn search_input(&mut self, term: &str) {
        if self.torn_down {
            return;
        }
        self.debouncer.input(term, &mut self.scheduler);
    }

    fn run_search(&mut self, term: String) {
        let results = self.directory.query(&term);
        self.results = results.clone();
        self.record(Notice::Search { term, results });
    }

    /// Open the `index`th result of the last search. Ignored while a menu
    /// navigation is in flight or if there is no such result.
    pub fn select_result(&mut self, index: usize) -> bool {
        if self.torn_down {
            return false;
        }
        let route = self.results.hits().get(index).map(|hit| hit.entry.route());
        match route {
            Some(path) if !self.menu.is_busy() => {
                self.navigate(&path, Cause::Search);
                true
            }
            _ => {
                self.record(Notice::SelectionIgnored { index });
                false
            }
        }
    }

    pub fn results(&self) -> &SearchResults {
        &self.results
    }

    pub fn active_button(&self) -> Option<MenuButton> {
        self.menu.active()
    }

    pub fn button_state(&self, button: MenuButton) -> ButtonState {
        self.menu.button_state(button)
    }

    /// Buttons to render for the current session, with their state
    pub fn menu_view(&self) -> Vec<(MenuButton, ButtonState)> {
        MenuButton::visible_for(self.connected)
            .iter()
            .map(|b| (*b, self.menu.button_state(*b)))
            .collect()
    }

    pub fn pending_invite(&self) -> Option<PendingInvite> {
        self.invites.peek()
    }

    /// For the authentication step: read and clear the pending invite
    pub fn take_pending_invite(&mut self) -> Result<Option<PendingInvite>, StoreError> {
        self.invites.take()
    }

    /// Keep the invite carried by a login/sign-up redirect target
    pub fn capture_redirect(&mut self, redirect: &str) -> Result<bool, StoreError> {
        self.invites.capture_from_redirect(redirect)
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn take_log(&mut self) -> Vec<LogEntry> {
        std::mem::take(&mut self.log)
    }

    fn record(&mut self, notice: Notice) {
        let at_ms = self.scheduler.now().as_millis() as u64;
        self.log.push(LogEntry { at_ms, notice });
    }

    /// Unmount: drop link listeners and every pending timer
    pub fn teardown(&mut self, bridge: &mut dyn HostBridge) {
        if self.torn_down {
            return;
        }
        self.links.teardown(bridge, &mut self.scheduler);
        self.menu.teardown(&mut self.scheduler);
        self.debouncer.cancel(&mut self.scheduler);
        self.scheduler.clear();
        self.torn_down = true;
    }
}
