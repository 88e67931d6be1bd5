use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Buttons of the side menu. The string form is what gets persisted under
/// `activeMenuButton`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MenuButton {
    Profile,
    Events,
    Circles,
    CreateAccount,
    Login,
    /// Reserved: ends the session instead of opening a route
    Disconnect,
}

impl MenuButton {
    pub const ALL: [MenuButton; 6] = [
        MenuButton::Profile,
        MenuButton::Events,
        MenuButton::Circles,
        MenuButton::CreateAccount,
        MenuButton::Login,
        MenuButton::Disconnect,
    ];

    pub fn key(self) -> &'static str {
        match self {
            MenuButton::Profile => "profile",
            MenuButton::Events => "events",
            MenuButton::Circles => "circles",
            MenuButton::CreateAccount => "create-account",
            MenuButton::Login => "login",
            MenuButton::Disconnect => "disconnect",
        }
    }

    /// Route opened by this button. `Disconnect` always lands on the root.
    pub fn target_path(self) -> &'static str {
        match self {
            MenuButton::Profile => "/profile",
            MenuButton::Events => "/events",
            MenuButton::Circles => "/circles",
            MenuButton::CreateAccount => "/create-account",
            MenuButton::Login => "/login",
            MenuButton::Disconnect => "/",
        }
    }

    /// Buttons the menu offers for the given session state
    pub fn visible_for(connected: bool) -> &'static [MenuButton] {
        if connected {
            &[
                MenuButton::Profile,
                MenuButton::Events,
                MenuButton::Circles,
                MenuButton::Disconnect,
            ]
        } else {
            &[MenuButton::CreateAccount, MenuButton::Login]
        }
    }
}

/// Returned when a persisted or typed button key is unknown
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown menu button: {0:?}")]
pub struct UnknownButton(pub String);

impl FromStr for MenuButton {
    type Err = UnknownButton;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MenuButton::ALL
            .into_iter()
            .find(|b| b.key() == s)
            .ok_or_else(|| UnknownButton(s.to_string()))
    }
}

impl fmt::Display for MenuButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Visual state of one menu button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonState {
    Idle,
    /// Button of the current route (durable)
    Active,
    /// Transition animation in flight (transient)
    Clicking,
}

/// What resolving an intent does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentAction {
    Navigate,
    /// Log out, then go to the root regardless of the current route
    Disconnect,
}

/// A navigation the menu has committed to but not executed yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationIntent {
    pub target_path: String,
    pub button: MenuButton,
    pub action: IntentAction,
}

impl NavigationIntent {
    pub fn for_button(button: MenuButton) -> Self {
        let action = if button == MenuButton::Disconnect {
            IntentAction::Disconnect
        } else {
            IntentAction::Navigate
        };
        NavigationIntent {
            target_path: button.target_path().to_string(),
            button,
            action,
        }
    }
}
