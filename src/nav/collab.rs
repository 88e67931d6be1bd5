//! Capabilities the controller consumes from the surrounding app, plus
//! in-process implementations used by the replay command and tests.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::Deserialize;

use crate::model::directory::{EventLists, ProfileRecord};

/// The app's router
pub trait Router {
    fn navigate(&mut self, path: &str);
    /// Path of the route currently shown (no query string)
    fn current_path(&self) -> String;
    /// Dismiss the side menu without changing route
    fn close_menu(&mut self);
}

/// The authenticated session
pub trait Session {
    /// Drop the stored credentials
    fn logout(&mut self);
}

/// Error type for directory fetches
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse directory data: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Source of the searchable people and events
pub trait DirectoryClient {
    fn fetch_profiles(&mut self) -> Result<Vec<ProfileRecord>, FetchError>;
    fn fetch_events(&mut self) -> Result<EventLists, FetchError>;
}

/// A call the controller made on the shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCall {
    Navigate(String),
    CloseMenu,
    Logout,
}

#[derive(Debug, Default)]
struct ShellState {
    path: String,
    calls: Vec<ShellCall>,
}

/// Router and session that remember every call. Clones share state, so one
/// clone can be handed to the controller and another kept for inspection.
#[derive(Debug, Clone)]
pub struct RecordingShell {
    state: Rc<RefCell<ShellState>>,
}

impl RecordingShell {
    pub fn at(path: &str) -> Self {
        RecordingShell {
            state: Rc::new(RefCell::new(ShellState {
                path: path.to_string(),
                calls: Vec::new(),
            })),
        }
    }

    pub fn calls(&self) -> Vec<ShellCall> {
        self.state.borrow().calls.clone()
    }

    /// Only the `navigate` targets, in order
    pub fn navigations(&self) -> Vec<String> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                ShellCall::Navigate(path) => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    /// Simulate a route change the controller did not cause
    pub fn set_path(&self, path: &str) {
        self.state.borrow_mut().path = path.to_string();
    }
}

impl Router for RecordingShell {
    fn navigate(&mut self, path: &str) {
        let mut state = self.state.borrow_mut();
        state.path = path.split(['?', '#']).next().unwrap_or(path).to_string();
        state.calls.push(ShellCall::Navigate(path.to_string()));
    }

    fn current_path(&self) -> String {
        self.state.borrow().path.clone()
    }

    fn close_menu(&mut self) {
        self.state.borrow_mut().calls.push(ShellCall::CloseMenu);
    }
}

impl Session for RecordingShell {
    fn logout(&mut self) {
        self.state.borrow_mut().calls.push(ShellCall::Logout);
    }
}

/// Directory contents as served by the backend
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryData {
    #[serde(default)]
    pub profiles: Vec<ProfileRecord>,
    #[serde(default)]
    pub events: EventLists,
}

/// Directory served from memory. `None` behaves like an unreachable backend.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    data: Option<DirectoryData>,
}

impl StaticDirectory {
    pub fn new(data: DirectoryData) -> Self {
        StaticDirectory { data: Some(data) }
    }

    pub fn unavailable() -> Self {
        StaticDirectory { data: None }
    }

    /// Load `{"profiles": [...], "events": {"owned": [...], "invited": [...]}}`
    pub fn from_json_file(path: &Path) -> Result<Self, FetchError> {
        let text = fs::read_to_string(path).map_err(|e| FetchError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(StaticDirectory::new(serde_json::from_str(&text)?))
    }

    fn data(&self) -> Result<&DirectoryData, FetchError> {
        self.data
            .as_ref()
            .ok_or_else(|| FetchError::Unavailable("no directory data".into()))
    }
}

impl DirectoryClient for StaticDirectory {
    fn fetch_profiles(&mut self) -> Result<Vec<ProfileRecord>, FetchError> {
        Ok(self.data()?.profiles.clone())
    }

    fn fetch_events(&mut self) -> Result<EventLists, FetchError> {
        Ok(self.data()?.events.clone())
    }
}
