//! End-to-end behaviour of the navigation controller, driven through the
//! public API with recording collaborators and an explicit clock.

use std::time::Duration;

use pretty_assertions::assert_eq;

use zignav::io::active_button::ACTIVE_BUTTON_KEY;
use zignav::io::pending_invite::{PENDING_EVENT_KEY, PENDING_TOKEN_KEY};
use zignav::io::store::{KeyValueStore, MemoryStore};
use zignav::model::config::NavConfig;
use zignav::model::directory::{EventLists, EventRecord, ProfileRecord};
use zignav::model::menu::{ButtonState, MenuButton};
use zignav::nav::app::{Cause, Notice};
use zignav::nav::collab::{DirectoryData, RecordingShell, ShellCall, StaticDirectory};
use zignav::nav::deep_link::ManualBridge;
use zignav::nav::menu::ClickOutcome;
use zignav::nav::{Collaborators, NavController};
use zignav::ops::search::SearchResults;
use zignav::parse::parse_link;

const ID: &str = "123e4567-e89b-12d3-a456-426614174000";

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

struct Harness {
    nav: NavController,
    shell: RecordingShell,
    session: MemoryStore,
    durable: MemoryStore,
    bridge: ManualBridge,
}

impl Harness {
    fn new(path: &str) -> Self {
        Harness::with(path, NavConfig::default(), MemoryStore::new(), directory())
    }

    fn with(path: &str, config: NavConfig, durable: MemoryStore, dir: StaticDirectory) -> Self {
        let shell = RecordingShell::at(path);
        let session = MemoryStore::new();
        let mut nav = NavController::new(
            &config,
            Collaborators {
                router: Box::new(shell.clone()),
                session: Box::new(shell.clone()),
                directory: Box::new(dir),
                session_store: Box::new(session.clone()),
                durable_store: Box::new(durable.clone()),
            },
        );
        let mut bridge = ManualBridge::native();
        nav.start(&mut bridge);
        Harness {
            nav,
            shell,
            session,
            durable,
            bridge,
        }
    }

    fn open_link(&mut self, url: &str) {
        self.bridge.open(url);
        self.nav.poll_links();
    }

    fn search_terms(&self) -> Vec<String> {
        self.nav
            .log()
            .iter()
            .filter_map(|e| match &e.notice {
                Notice::Search { term, .. } => Some(term.clone()),
                _ => None,
            })
            .collect()
    }
}

fn directory() -> StaticDirectory {
    StaticDirectory::new(DirectoryData {
        profiles: vec![
            ProfileRecord {
                id: "2".into(),
                username: "theo".into(),
            },
            ProfileRecord {
                id: "3".into(),
                username: "Thea".into(),
            },
        ],
        events: EventLists {
            owned: vec![EventRecord {
                id: ID.into(),
                title: "Theo's birthday".into(),
            }],
            invited: vec![],
        },
    })
}

// ---------------------------------------------------------------------------
// Link parsing and invites
// ---------------------------------------------------------------------------

#[test]
fn valid_links_parse_with_folded_id() {
    let upper = ID.to_uppercase();
    for (url, token) in [
        (format!("https://zigzag-project.org/event/{ID}"), None),
        (format!("https://zigzag-project.org/event/{upper}?invite_token=t1"), Some("t1")),
        (format!("http://example.com/event/{ID}?a=1&invite_token=x%20y"), Some("x y")),
    ] {
        let link = parse_link(&url, None).unwrap_or_else(|| panic!("{url} should parse"));
        assert_eq!(link.event_id.to_string(), ID);
        assert_eq!(link.invite_token.as_deref(), token);
    }
}

#[test]
fn foreign_and_malformed_links_are_absent() {
    let nested = format!("https://zigzag-project.org/event/{ID}/edit");
    for url in [
        "https://zigzag-project.org/events",
        "https://zigzag-project.org/profile/12",
        "https://zigzag-project.org/event/not-a-uuid",
        "https://zigzag-project.org/event/123e4567e89b12d3a456426614174000",
        nested.as_str(),
        "",
        "not a url at all",
    ] {
        assert_eq!(parse_link(url, None), None, "{url}");
    }
}

#[test]
fn invite_link_persists_exact_values_and_navigates() {
    let mut h = Harness::new("/");
    h.open_link(&format!(
        "https://zigzag-project.org/event/{ID}?invite_token=abc123"
    ));
    assert_eq!(h.session.get(PENDING_TOKEN_KEY).as_deref(), Some("abc123"));
    assert_eq!(h.session.get(PENDING_EVENT_KEY).as_deref(), Some(ID));

    h.nav.advance_to(ms(100));
    assert_eq!(
        h.shell.navigations(),
        vec![format!("/event/{ID}?invite_token=abc123")]
    );
}

#[test]
fn malformed_link_writes_nothing() {
    let mut h = Harness::new("/");
    h.open_link("https://zigzag-project.org/event/not-a-uuid");
    h.nav.settle();
    assert!(h.session.is_empty());
    assert!(h.shell.calls().is_empty());
}

#[test]
fn launch_link_handled_once_across_restarts() {
    let shell = RecordingShell::at("/");
    let mut nav = NavController::new(
        &NavConfig::default(),
        Collaborators {
            router: Box::new(shell.clone()),
            session: Box::new(shell.clone()),
            directory: Box::new(StaticDirectory::unavailable()),
            session_store: Box::new(MemoryStore::new()),
            durable_store: Box::new(MemoryStore::new()),
        },
    );
    let mut bridge = ManualBridge::native().with_launch_link(format!("/event/{ID}"));
    nav.start(&mut bridge);
    nav.start(&mut bridge);
    nav.settle();

    assert_eq!(bridge.launch_queries(), 1);
    assert_eq!(bridge.listener_count(), 1);
    assert_eq!(shell.navigations(), vec![format!("/event/{ID}")]);
}

#[test]
fn web_runtime_ignores_links() {
    let shell = RecordingShell::at("/");
    let mut nav = NavController::new(
        &NavConfig::default(),
        Collaborators {
            router: Box::new(shell.clone()),
            session: Box::new(shell.clone()),
            directory: Box::new(StaticDirectory::unavailable()),
            session_store: Box::new(MemoryStore::new()),
            durable_store: Box::new(MemoryStore::new()),
        },
    );
    let mut bridge = ManualBridge::web().with_launch_link(format!("/event/{ID}"));
    nav.start(&mut bridge);
    nav.settle();
    assert_eq!(bridge.launch_queries(), 0);
    assert!(shell.calls().is_empty());
}

#[test]
fn invite_from_login_redirect_is_kept_for_auth() {
    let mut h = Harness::new("/login");
    assert!(h
        .nav
        .capture_redirect(&format!("/event/{ID}?invite_token=from-login"))
        .unwrap());
    let invite = h.nav.take_pending_invite().unwrap().unwrap();
    assert_eq!(invite.invite_token, "from-login");
    assert!(h.session.is_empty());
}

// ---------------------------------------------------------------------------
// Menu
// ---------------------------------------------------------------------------

#[test]
fn reentrant_click_navigates_once() {
    let mut h = Harness::new("/");
    assert!(matches!(
        h.nav.click(MenuButton::Events),
        ClickOutcome::Committed(_)
    ));
    h.nav.advance_to(ms(200));
    assert_eq!(h.nav.click(MenuButton::Profile), ClickOutcome::Ignored);
    h.nav.settle();

    assert_eq!(h.shell.navigations(), vec!["/events"]);
    assert_eq!(h.durable.get(ACTIVE_BUTTON_KEY).as_deref(), Some("events"));
}

#[test]
fn animation_and_fallback_race_navigates_once() {
    let mut h = Harness::new("/");
    h.nav.click(MenuButton::Circles);
    h.nav.advance_to(ms(550));
    // the animation signal arrives after the fallback already resolved
    h.nav.animation_finished(MenuButton::Circles);
    h.nav.settle();
    assert_eq!(h.shell.navigations(), vec!["/circles"]);

    let mut h = Harness::new("/");
    h.nav.click(MenuButton::Circles);
    h.nav.advance_to(ms(500));
    h.nav.animation_finished(MenuButton::Circles);
    h.nav.advance_to(ms(2_000));
    assert_eq!(h.shell.navigations(), vec!["/circles"]);
}

#[test]
fn fallback_delay_follows_config() {
    let mut config = NavConfig::default();
    config.menu.animation_ms = 200;
    config.menu.fallback_margin_ms = 20;
    let mut h = Harness::with("/", config, MemoryStore::new(), directory());
    h.nav.click(MenuButton::Login);
    h.nav.advance_to(ms(219));
    assert!(h.shell.navigations().is_empty());
    h.nav.advance_to(ms(220));
    assert_eq!(h.shell.navigations(), vec!["/login"]);
}

#[test]
fn external_route_changes_resync_active_button() {
    let mut h = Harness::new("/");
    h.nav.route_changed("/circles");
    assert_eq!(h.nav.active_button(), Some(MenuButton::Circles));
    assert_eq!(h.durable.get(ACTIVE_BUTTON_KEY).as_deref(), Some("circles"));

    h.nav.route_changed("/unknown-path");
    assert_eq!(h.nav.active_button(), Some(MenuButton::Circles));
    assert_eq!(h.nav.button_state(MenuButton::Circles), ButtonState::Active);
}

#[test]
fn active_button_survives_restart() {
    let durable = MemoryStore::new();
    let mut h = Harness::with("/", NavConfig::default(), durable.clone(), directory());
    h.nav.click(MenuButton::CreateAccount);
    h.nav.settle();

    let h = Harness::with("/", NavConfig::default(), durable, directory());
    assert_eq!(h.nav.active_button(), Some(MenuButton::CreateAccount));
}

#[test]
fn disconnect_logs_out_and_goes_home() {
    let mut h = Harness::new("/events");
    h.nav.set_session(true);
    h.nav.disconnect();
    h.nav.settle();
    assert_eq!(
        h.shell.calls(),
        vec![ShellCall::Logout, ShellCall::Navigate("/".into())]
    );
    assert!(!h.nav.is_connected());
}

// ---------------------------------------------------------------------------
// Directory search
// ---------------------------------------------------------------------------

#[test]
fn debounced_search_yields_only_last_term() {
    let mut h = Harness::new("/");
    h.nav.set_session(true);
    h.nav.search_input("th");
    h.nav.advance_to(ms(50));
    h.nav.search_input("theo");
    h.nav.advance_to(ms(350));

    assert_eq!(h.search_terms(), vec!["theo"]);
    let names: Vec<&str> = h
        .nav
        .results()
        .hits()
        .iter()
        .map(|hit| hit.entry.display_name.as_str())
        .collect();
    assert_eq!(names, vec!["theo", "Theo's birthday"]);
}

#[test]
fn short_or_early_queries_are_explicit() {
    let mut h = Harness::new("/");
    h.nav.search_input("theo");
    h.nav.settle();
    assert_eq!(h.nav.results(), &SearchResults::NotReady);

    h.nav.set_session(true);
    h.nav.search_input("t");
    h.nav.settle();
    assert_eq!(h.nav.results(), &SearchResults::Empty);
}

#[test]
fn failed_directory_stays_not_ready() {
    let mut h = Harness::with(
        "/",
        NavConfig::default(),
        MemoryStore::new(),
        StaticDirectory::unavailable(),
    );
    h.nav.set_session(true);
    h.nav.search_input("theo");
    h.nav.settle();
    assert_eq!(h.nav.results(), &SearchResults::NotReady);
}

#[test]
fn selecting_results_routes_by_kind() {
    let mut h = Harness::new("/");
    h.nav.set_session(true);
    h.nav.search_input("theo");
    h.nav.settle();

    assert!(h.nav.select_result(1));
    assert!(h.nav.select_result(0));
    assert!(!h.nav.select_result(9));
    assert_eq!(
        h.shell.navigations(),
        vec![format!("/event/{ID}"), "/profile/2".to_string()]
    );
    let causes: Vec<Cause> = h
        .nav
        .log()
        .iter()
        .filter_map(|e| match &e.notice {
            Notice::Navigated { cause, .. } => Some(*cause),
            _ => None,
        })
        .collect();
    assert_eq!(causes, vec![Cause::Search, Cause::Search]);
}

// ---------------------------------------------------------------------------
// Teardown
// ---------------------------------------------------------------------------

#[test]
fn teardown_silences_everything() {
    let mut h = Harness::new("/");
    h.nav.set_session(true);
    h.open_link(&format!("/event/{ID}"));
    h.nav.click(MenuButton::Events);
    h.nav.search_input("theo");
    h.nav.teardown(&mut h.bridge);

    h.nav.advance_to(ms(10_000));
    h.nav.animation_finished(MenuButton::Events);
    h.bridge.open(&format!("/event/{ID}"));
    h.nav.poll_links();

    assert!(h.shell.calls().is_empty());
    assert_eq!(h.search_terms(), Vec::<String>::new());
    assert_eq!(h.bridge.listener_count(), 0);
}
