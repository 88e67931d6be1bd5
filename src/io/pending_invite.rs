use crate::io::store::{KeyValueStore, StoreError};
use crate::model::link::{EventId, ParsedLink, PendingInvite};
use crate::parse::link::parse_link;

pub const PENDING_TOKEN_KEY: &str = "pending_invite_token";
pub const PENDING_EVENT_KEY: &str = "pending_event_id";

/// The single invite awaiting the authentication step, kept in session storage.
pub struct PendingInviteStore {
    store: Box<dyn KeyValueStore>,
}

impl PendingInviteStore {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        PendingInviteStore { store }
    }

    /// Record the link's invite, replacing any previous one. Links without a
    /// token leave the store untouched. Returns whether an invite was written.
    ///
    /// The previous pair is removed first, and a failed write clears both
    /// keys, so a token never ends up next to another invite's event id.
    pub fn record(&mut self, link: &ParsedLink) -> Result<bool, StoreError> {
        let Some(invite) = link.pending_invite() else {
            return Ok(false);
        };
        self.clear()?;
        let written = self
            .store
            .set(PENDING_EVENT_KEY, &invite.event_id.to_string())
            .and_then(|()| self.store.set(PENDING_TOKEN_KEY, &invite.invite_token));
        if let Err(e) = written {
            if let Err(clear_err) = self.clear() {
                tracing::warn!(error = %clear_err, "could not clear half-written invite");
            }
            return Err(e);
        }
        tracing::debug!(event_id = %invite.event_id, "pending invite recorded");
        Ok(true)
    }

    /// The stored invite, if both halves are present and the id is valid.
    pub fn peek(&self) -> Option<PendingInvite> {
        let invite_token = self.store.get(PENDING_TOKEN_KEY)?;
        let event_id: EventId = self.store.get(PENDING_EVENT_KEY)?.parse().ok()?;
        Some(PendingInvite {
            event_id,
            invite_token,
        })
    }

    /// Read and clear, for the authentication flow.
    pub fn take(&mut self) -> Result<Option<PendingInvite>, StoreError> {
        let invite = self.peek();
        self.clear()?;
        Ok(invite)
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.store.remove(PENDING_TOKEN_KEY)?;
        self.store.remove(PENDING_EVENT_KEY)
    }

    /// Preserve an invite carried by a login/sign-up `redirect` target such as
    /// `/event/<id>?invite_token=<t>`. The target goes through the same
    /// validation as deep links.
    pub fn capture_from_redirect(&mut self, redirect: &str) -> Result<bool, StoreError> {
        match parse_link(redirect, None) {
            Some(link) => self.record(&link),
            None => Ok(false),
        }
    }
}
