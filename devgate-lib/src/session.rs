//! Identity/session collaborator contract
//!
//! Authentication lives outside this crate. An [`IdentityProvider`] hands out the
//! identity of the signed-in user and notifies subscribers when it changes; consumers
//! derive a [`SessionState`] from each notification.

use crate::sources::Identity;
use tokio::sync::watch;

/// Source of the current user identity.
pub trait IdentityProvider: Send + Sync {
    /// The identity of the signed-in user, or `None` when nobody is signed in.
    fn current_identity(&self) -> impl Future<Output = Option<Identity>> + Send;

    /// A receiver that observes every identity change.
    fn subscribe(&self) -> watch::Receiver<Option<Identity>>;
}

/// Session flags derived from an identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub identity: Option<Identity>,
    pub is_logged_in: bool,
    pub is_admin: bool,
}

impl SessionState {
    /// Recompute the session state for `identity`.
    #[must_use]
    pub fn derive(identity: Option<&Identity>) -> Self {
        Self {
            identity: identity.cloned(),
            is_logged_in: identity.is_some(),
            is_admin: identity.is_some_and(Identity::is_admin),
        }
    }
}

/// An identity provider whose identity is set explicitly.
#[derive(Debug)]
pub struct StaticIdentityProvider {
    sender: watch::Sender<Option<Identity>>,
}

impl StaticIdentityProvider {
    #[must_use]
    pub fn new(identity: Option<Identity>) -> Self {
        Self {
            sender: watch::Sender::new(identity),
        }
    }

    /// Replace the identity and notify subscribers.
    pub fn set(&self, identity: Option<Identity>) {
        let _ = self.sender.send_replace(identity);
    }
}

impl IdentityProvider for StaticIdentityProvider {
    async fn current_identity(&self) -> Option<Identity> {
        self.sender.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.sender.subscribe()
    }
}

/// Follows an [`IdentityProvider`] and yields a fresh [`SessionState`] per change.
#[derive(Debug)]
pub struct SessionWatcher {
    receiver: watch::Receiver<Option<Identity>>,
}

impl SessionWatcher {
    pub fn new(provider: &impl IdentityProvider) -> Self {
        Self {
            receiver: provider.subscribe(),
        }
    }

    /// The session state for the identity seen most recently.
    #[must_use]
    pub fn current(&self) -> SessionState {
        SessionState::derive(self.receiver.borrow().as_ref())
    }

    /// Wait for the next identity change. Returns `None` once the provider is gone.
    pub async fn changed(&mut self) -> Option<SessionState> {
        self.receiver.changed().await.ok()?;
        Some(SessionState::derive(self.receiver.borrow_and_update().as_ref()))
    }
}
