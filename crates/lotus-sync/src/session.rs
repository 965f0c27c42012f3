//! Session state: who is signed in, and the live connection handle.
//!
//! Mode selection happens here. An authenticated identity puts the client
//! in cloud mode even while the connection handle is still absent; the
//! readiness poll in [`retry`](crate::retry) covers that window.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::actor::CloudActor;

/// Caller identity as the auth provider reported it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub principal: String,
    /// Anonymous identities exist (a provider can hand one out before
    /// login completes) but never count as signed in.
    pub anonymous: bool,
}

impl Identity {
    pub fn new(principal: impl Into<String>) -> Self {
        Identity {
            principal: principal.into(),
            anonymous: false,
        }
    }

    pub fn anonymous() -> Self {
        Identity {
            principal: String::new(),
            anonymous: true,
        }
    }

    pub fn authenticated(&self) -> bool {
        !self.anonymous && !self.principal.is_empty()
    }
}

#[derive(Default)]
struct SessionState {
    identity: Option<Identity>,
    actor: Option<Arc<dyn CloudActor>>,
}

/// Shared, mutable session: identity and connection arrive and leave
/// independently.
#[derive(Default)]
pub struct CloudSession {
    state: RwLock<SessionState>,
}

impl CloudSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install an identity and its connection handle together.
    pub async fn connect(&self, identity: Identity, actor: Arc<dyn CloudActor>) {
        let mut state = self.state.write().await;
        state.identity = Some(identity);
        state.actor = Some(actor);
    }

    /// Set the identity before a connection exists. Cloud mode starts
    /// here; operations then wait for readiness.
    pub async fn set_identity(&self, identity: Identity) {
        self.state.write().await.identity = Some(identity);
    }

    /// Attach the connection handle once the transport is up.
    pub async fn set_actor(&self, actor: Arc<dyn CloudActor>) {
        self.state.write().await.actor = Some(actor);
    }

    /// Drop both identity and connection: back to guest mode.
    pub async fn disconnect(&self) {
        let mut state = self.state.write().await;
        state.identity = None;
        state.actor = None;
    }

    /// Cloud mode iff a non-anonymous identity is present. Checked fresh
    /// at every operation; never cached by callers.
    pub async fn authenticated(&self) -> bool {
        self.state
            .read()
            .await
            .identity
            .as_ref()
            .is_some_and(Identity::authenticated)
    }

    /// Ready to serve: authenticated and holding a connection handle.
    pub async fn is_ready(&self) -> bool {
        let state = self.state.read().await;
        state.identity.as_ref().is_some_and(Identity::authenticated) && state.actor.is_some()
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.state.read().await.identity.clone()
    }

    pub async fn actor(&self) -> Option<Arc<dyn CloudActor>> {
        self.state.read().await.actor.clone()
    }
}
