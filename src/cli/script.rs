//! Replay scripts.
//!
//! ```text
//! # comments and blank lines are skipped
//! @0    launch https://zigzag-project.org/event/<uuid>?invite_token=abc
//! @0    session on
//! @10   click events
//! @510  animation-end events
//! @600  type theo
//! @1000 select 0
//! ```
//!
//! Times are milliseconds since start and may not go backwards. `launch` is
//! only valid at `@0`, at most once.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::model::menu::{MenuButton, UnknownButton};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptEvent {
    Click(MenuButton),
    Disconnect,
    AnimationEnd(MenuButton),
    /// Route changed outside the controller
    Route(String),
    /// Live link from the host shell
    Link(String),
    /// Link that launched the app
    Launch(String),
    Session(bool),
    /// Search box contents after a keystroke
    Type(String),
    Select(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptStep {
    pub at: Duration,
    pub line: usize,
    pub event: ScriptEvent,
}

/// Error type for script loading
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
}

fn syntax(line: usize, message: impl Into<String>) -> ScriptError {
    ScriptError::Syntax {
        line,
        message: message.into(),
    }
}

pub fn read_script(path: &Path) -> Result<Vec<ScriptStep>, ScriptError> {
    let text = fs::read_to_string(path).map_err(|e| ScriptError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_script(&text)
}

pub fn parse_script(text: &str) -> Result<Vec<ScriptStep>, ScriptError> {
    let mut steps: Vec<ScriptStep> = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let (time, rest) = trimmed
            .strip_prefix('@')
            .and_then(|rest| rest.split_once(char::is_whitespace))
            .ok_or_else(|| syntax(line, "expected `@<ms> <event> [args]`"))?;
        let ms: u64 = time
            .parse()
            .map_err(|_| syntax(line, format!("bad time `{time}`")))?;
        let at = Duration::from_millis(ms);
        if steps.last().is_some_and(|prev| prev.at > at) {
            return Err(syntax(line, "time goes backwards"));
        }
        let rest = rest.trim_start();
        let (name, arg) = rest
            .split_once(char::is_whitespace)
            .map(|(name, arg)| (name, arg.trim()))
            .unwrap_or((rest, ""));
        let event = parse_event(name, arg, line)?;
        if let ScriptEvent::Launch(_) = event {
            let launched = steps
                .iter()
                .any(|s| matches!(s.event, ScriptEvent::Launch(_)));
            if ms != 0 || launched {
                return Err(syntax(line, "launch is only allowed once, at @0"));
            }
        }
        steps.push(ScriptStep { at, line, event });
    }
    Ok(steps)
}

fn parse_event(name: &str, arg: &str, line: usize) -> Result<ScriptEvent, ScriptError> {
    let button = || -> Result<MenuButton, ScriptError> {
        arg.parse()
            .map_err(|e: UnknownButton| syntax(line, e.to_string()))
    };
    let required = |what: &str| -> Result<String, ScriptError> {
        if arg.is_empty() {
            Err(syntax(line, format!("{name} needs {what}")))
        } else {
            Ok(arg.to_string())
        }
    };

    Ok(match name {
        "click" => ScriptEvent::Click(button()?),
        "disconnect" => ScriptEvent::Disconnect,
        "animation-end" => ScriptEvent::AnimationEnd(button()?),
        "route" => ScriptEvent::Route(required("a path")?),
        "link" => ScriptEvent::Link(required("a url")?),
        "launch" => ScriptEvent::Launch(required("a url")?),
        "session" => match arg {
            "on" => ScriptEvent::Session(true),
            "off" => ScriptEvent::Session(false),
            _ => return Err(syntax(line, "session takes `on` or `off`")),
        },
        // an empty search box is a valid state
        "type" => ScriptEvent::Type(arg.to_string()),
        "select" => ScriptEvent::Select(
            arg.parse()
                .map_err(|_| syntax(line, "select needs a result index"))?,
        ),
        other => return Err(syntax(line, format!("unknown event `{other}`"))),
    })
}
