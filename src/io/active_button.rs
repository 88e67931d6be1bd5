use std::sync::mpsc;

use crate::io::store::{KeyValueStore, StoreError};
use crate::model::menu::MenuButton;

/// Durable key holding the button of the current route
pub const ACTIVE_BUTTON_KEY: &str = "activeMenuButton";

/// Typed access to the durable "active menu button" record, with change
/// notifications for anything that renders it.
pub struct ActiveButtonStore {
    store: Box<dyn KeyValueStore>,
    subscribers: Vec<mpsc::Sender<MenuButton>>,
}

impl ActiveButtonStore {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        ActiveButtonStore {
            store,
            subscribers: Vec::new(),
        }
    }

    /// The persisted button. Unknown or missing values read as `None`.
    pub fn get(&self) -> Option<MenuButton> {
        let raw = self.store.get(ACTIVE_BUTTON_KEY)?;
        match raw.parse() {
            Ok(button) => Some(button),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring persisted active button");
                None
            }
        }
    }

    /// Persist `button` and notify subscribers. Subscribers are notified even
    /// when the write fails, since the in-memory view has already changed.
    pub fn set(&mut self, button: MenuButton) -> Result<(), StoreError> {
        let result = self.store.set(ACTIVE_BUTTON_KEY, button.key());
        self.subscribers.retain(|tx| tx.send(button).is_ok());
        result
    }

    /// Receive every future `set`. Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> mpsc::Receiver<MenuButton> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }
}
