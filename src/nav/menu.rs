//! Side menu navigation.
//!
//! A click commits a [`NavigationIntent`] into the single episode slot and
//! starts the button animation. The route change happens when the animation
//! reports completion or, if that signal is lost, when the fallback timer
//! fires. Both paths go through the same check-and-clear, so each click
//! changes route at most once.

use std::fmt;
use std::mem;
use std::sync::mpsc;
use std::time::Duration;

use crate::io::active_button::ActiveButtonStore;
use crate::model::config::MenuConfig;
use crate::model::menu::{ButtonState, IntentAction, MenuButton, NavigationIntent};
use crate::nav::collab::{Router, Session};
use crate::nav::timer::{NavScheduler, NavTimer, TimerId};

/// Identifies one click-to-navigation episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EpisodeId(u64);

impl fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
enum Episode {
    Idle,
    Committed {
        id: EpisodeId,
        intent: NavigationIntent,
        fallback: TimerId,
    },
}

/// Result of a click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Committed(EpisodeId),
    /// Another episode is still in flight
    Ignored,
}

/// What resolving an episode did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Navigated(String),
    /// Already on the target route, so only the menu was closed
    MenuClosed,
    /// Logged out and sent to the root
    Disconnected,
}

#[derive(Debug, Clone, Copy)]
enum Trigger {
    Animation(MenuButton),
    Fallback(EpisodeId),
}

struct RouteRule {
    path: &'static str,
    button: MenuButton,
    /// Also matches sub-paths (`/profile/42`)
    nested: bool,
}

const ROUTE_TABLE: &[RouteRule] = &[
    RouteRule {
        path: "/profile",
        button: MenuButton::Profile,
        nested: true,
    },
    RouteRule {
        path: "/events",
        button: MenuButton::Events,
        nested: false,
    },
    RouteRule {
        path: "/circles",
        button: MenuButton::Circles,
        nested: false,
    },
    RouteRule {
        path: "/create-account",
        button: MenuButton::CreateAccount,
        nested: false,
    },
    RouteRule {
        path: "/login",
        button: MenuButton::Login,
        nested: false,
    },
];

/// Menu button owning `path`, if any. Query and fragment are ignored.
pub fn button_for_route(path: &str) -> Option<MenuButton> {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    ROUTE_TABLE
        .iter()
        .find(|rule| {
            path == rule.path
                || (rule.nested
                    && path
                        .strip_prefix(rule.path)
                        .is_some_and(|rest| rest.starts_with('/')))
        })
        .map(|rule| rule.button)
}

pub struct MenuNavigator {
    episode: Episode,
    next_episode: u64,
    active: Option<MenuButton>,
    store: ActiveButtonStore,
    fallback_delay: Duration,
}

impl MenuNavigator {
    /// The active button starts as whatever was persisted last.
    pub fn new(store: ActiveButtonStore, config: &MenuConfig) -> Self {
        MenuNavigator {
            episode: Episode::Idle,
            next_episode: 0,
            active: store.get(),
            store,
            fallback_delay: config.fallback_delay(),
        }
    }

    pub fn active(&self) -> Option<MenuButton> {
        self.active
    }

    /// The intent waiting for its animation, if any
    pub fn in_flight(&self) -> Option<&NavigationIntent> {
        match &self.episode {
            Episode::Idle => None,
            Episode::Committed { intent, .. } => Some(intent),
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.episode, Episode::Committed { .. })
    }

    pub fn button_state(&self, button: MenuButton) -> ButtonState {
        if self.in_flight().is_some_and(|intent| intent.button == button) {
            ButtonState::Clicking
        } else if self.active == Some(button) {
            ButtonState::Active
        } else {
            ButtonState::Idle
        }
    }

    /// Notifications for every change of the durable active button
    pub fn subscribe(&mut self) -> mpsc::Receiver<MenuButton> {
        self.store.subscribe()
    }

    pub fn click(&mut self, button: MenuButton, scheduler: &mut NavScheduler) -> ClickOutcome {
        if button == MenuButton::Disconnect {
            return self.disconnect(scheduler);
        }
        if let Some(intent) = self.in_flight() {
            tracing::debug!(%button, pending = %intent.button, "click ignored, navigation in flight");
            return ClickOutcome::Ignored;
        }
        self.set_active(button);
        self.commit(NavigationIntent::for_button(button), scheduler)
    }

    /// Start a disconnect episode. The active button is left alone.
    pub fn disconnect(&mut self, scheduler: &mut NavScheduler) -> ClickOutcome {
        if let Some(intent) = self.in_flight() {
            tracing::debug!(pending = %intent.button, "disconnect ignored, navigation in flight");
            return ClickOutcome::Ignored;
        }
        self.commit(NavigationIntent::for_button(MenuButton::Disconnect), scheduler)
    }

    fn commit(&mut self, intent: NavigationIntent, scheduler: &mut NavScheduler) -> ClickOutcome {
        let id = EpisodeId(self.next_episode);
        self.next_episode += 1;
        let fallback = scheduler.schedule(self.fallback_delay, NavTimer::MenuFallback(id));
        tracing::debug!(episode = %id, button = %intent.button, "navigation committed");
        self.episode = Episode::Committed {
            id,
            intent,
            fallback,
        };
        ClickOutcome::Committed(id)
    }

    /// Animation-end callback for `button`
    pub fn animation_finished(
        &mut self,
        button: MenuButton,
        scheduler: &mut NavScheduler,
        router: &mut dyn Router,
        session: &mut dyn Session,
    ) -> Option<Resolution> {
        self.resolve(Trigger::Animation(button), scheduler, router, session)
    }

    /// Fallback timer for `episode` fired
    pub fn fallback_elapsed(
        &mut self,
        episode: EpisodeId,
        scheduler: &mut NavScheduler,
        router: &mut dyn Router,
        session: &mut dyn Session,
    ) -> Option<Resolution> {
        self.resolve(Trigger::Fallback(episode), scheduler, router, session)
    }

    fn resolve(
        &mut self,
        trigger: Trigger,
        scheduler: &mut NavScheduler,
        router: &mut dyn Router,
        session: &mut dyn Session,
    ) -> Option<Resolution> {
        let owned = match (&self.episode, trigger) {
            (Episode::Idle, _) => false,
            (Episode::Committed { intent, .. }, Trigger::Animation(button)) => {
                intent.button == button
            }
            (Episode::Committed { id, .. }, Trigger::Fallback(episode)) => *id == episode,
        };
        if !owned {
            tracing::debug!(?trigger, "stale menu signal ignored");
            return None;
        }
        let Episode::Committed {
            id,
            intent,
            fallback,
        } = mem::replace(&mut self.episode, Episode::Idle)
        else {
            return None;
        };
        scheduler.cancel(fallback);
        tracing::debug!(episode = %id, ?trigger, "navigation resolved");
        Some(execute(intent, router, session))
    }

    /// Re-derive the active button from the current route. Unknown routes
    /// leave it unchanged.
    pub fn sync_route(&mut self, path: &str) -> Option<MenuButton> {
        let button = button_for_route(path)?;
        self.set_active(button);
        Some(button)
    }

    /// Cancel the armed fallback and forget the episode in flight
    pub fn teardown(&mut self, scheduler: &mut NavScheduler) {
        if let Episode::Committed { fallback, .. } = mem::replace(&mut self.episode, Episode::Idle)
        {
            scheduler.cancel(fallback);
        }
    }

    fn set_active(&mut self, button: MenuButton) {
        self.active = Some(button);
        if let Err(e) = self.store.set(button) {
            tracing::warn!(error = %e, %button, "could not persist active menu button");
        }
    }
}

fn execute(
    intent: NavigationIntent,
    router: &mut dyn Router,
    session: &mut dyn Session,
) -> Resolution {
    match intent.action {
        IntentAction::Disconnect => {
            session.logout();
            router.navigate(&intent.target_path);
            Resolution::Disconnected
        }
        IntentAction::Navigate if router.current_path() == intent.target_path => {
            router.close_menu();
            Resolution::MenuClosed
        }
        IntentAction::Navigate => {
            router.navigate(&intent.target_path);
            Resolution::Navigated(intent.target_path)
        }
    }
}
