//! Session and provider-change primitives
//!
//! The board never reads a process-wide singleton. It is handed a
//! [`ProviderSlot`] at construction: a watch channel whose value is the
//! currently active [`Session`], or `None` when nobody is signed in yet.
//! Swapping the slot's value replaces the provider; every subscriber sees
//! the change. Each session in turn broadcasts its own sign-in state over
//! a nested watch channel.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::client::PlannerClient;

/// Sign-in state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No credential established
    #[default]
    SignedOut,
    /// Sign-in is in flight
    Loading,
    /// Credential established, API calls may be issued
    SignedIn,
}

/// One identity provider instance
///
/// Owns the planner client derived from its credential and a broadcast
/// channel for sign-in state transitions.
pub struct Session {
    state_tx: watch::Sender<SessionState>,
    client: Arc<dyn PlannerClient>,
}

impl Session {
    /// Create a signed-out session around a client
    pub fn new(client: Arc<dyn PlannerClient>) -> Self {
        Self {
            state_tx: watch::channel(SessionState::SignedOut).0,
            client,
        }
    }

    /// Create a session that is already signed in
    pub fn signed_in(client: Arc<dyn PlannerClient>) -> Self {
        Self {
            state_tx: watch::channel(SessionState::SignedIn).0,
            client,
        }
    }

    /// Current sign-in state
    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    pub fn is_signed_in(&self) -> bool {
        self.state() == SessionState::SignedIn
    }

    /// Transition the session and notify subscribers
    pub fn set_state(&self, state: SessionState) {
        debug!(?state, "set_state: called");
        // send_replace never fails; a channel with no receivers still stores
        // the value for late subscribers
        self.state_tx.send_replace(state);
    }

    /// Subscribe to sign-in state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// The planner client derived from this session's credential
    pub fn client(&self) -> Arc<dyn PlannerClient> {
        Arc::clone(&self.client)
    }
}

/// Holder for the active provider
///
/// Cloneable handle over a watch channel of `Option<Arc<Session>>`. The slot
/// may be empty at any time and the session may be swapped for a different
/// instance; subscribers observe both.
#[derive(Clone)]
pub struct ProviderSlot {
    tx: Arc<watch::Sender<Option<Arc<Session>>>>,
}

impl Default for ProviderSlot {
    fn default() -> Self {
        Self::empty()
    }
}

impl ProviderSlot {
    /// An empty slot - no provider present
    pub fn empty() -> Self {
        Self {
            tx: Arc::new(watch::channel(None).0),
        }
    }

    /// A slot pre-filled with a provider
    pub fn with_session(session: Arc<Session>) -> Self {
        Self {
            tx: Arc::new(watch::channel(Some(session)).0),
        }
    }

    /// Replace (or clear) the active provider
    pub fn set(&self, session: Option<Arc<Session>>) {
        debug!(present = session.is_some(), "set: provider replaced");
        self.tx.send_replace(session);
    }

    /// The currently active provider, if any
    pub fn current(&self) -> Option<Arc<Session>> {
        self.tx.borrow().clone()
    }

    /// Subscribe to provider changes
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Session>>> {
        self.tx.subscribe()
    }
}
