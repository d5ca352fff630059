//! Session watcher
//!
//! Subscribes once to the provider slot. Whenever the provider changes, it
//! rebinds to the new session's state stream (the old receiver is dropped,
//! so no stale subscription survives a swap). A provider that is already
//! signed in triggers a load immediately; every later state change triggers
//! a load unconditionally - the loader itself re-checks sign-in before
//! fetching.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use plansvc::{ProviderSlot, SessionState};

use super::loader::BoardMessage;

/// Spawn the watcher task
///
/// Finishes when either the slot's sender or the runner's receiver goes
/// away.
pub fn spawn(slot: ProviderSlot, tx: mpsc::UnboundedSender<BoardMessage>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut slot_rx = slot.subscribe();

        loop {
            // Bind to whatever provider is current right now
            let session = slot_rx.borrow_and_update().clone();
            let mut state_rx: Option<watch::Receiver<SessionState>> = match session {
                Some(session) => {
                    debug!(signed_in = session.is_signed_in(), "watcher: provider bound");
                    let rx = session.subscribe();
                    if session.is_signed_in() && tx.send(BoardMessage::LoadRequested).is_err() {
                        return;
                    }
                    Some(rx)
                }
                None => {
                    debug!("watcher: no provider present");
                    None
                }
            };

            // Stay on this provider until the slot changes
            loop {
                enum Next {
                    SlotChanged,
                    SlotClosed,
                    StateChanged,
                    StateClosed,
                }

                let next = match state_rx.as_mut() {
                    Some(rx) => tokio::select! {
                        changed = slot_rx.changed() => match changed {
                            Ok(()) => Next::SlotChanged,
                            Err(_) => Next::SlotClosed,
                        },
                        changed = rx.changed() => match changed {
                            Ok(()) => Next::StateChanged,
                            Err(_) => Next::StateClosed,
                        },
                    },
                    None => match slot_rx.changed().await {
                        Ok(()) => Next::SlotChanged,
                        Err(_) => Next::SlotClosed,
                    },
                };

                match next {
                    Next::SlotChanged => break,
                    Next::SlotClosed => return,
                    Next::StateChanged => {
                        debug!("watcher: session state changed");
                        if tx.send(BoardMessage::LoadRequested).is_err() {
                            return;
                        }
                    }
                    // Session dropped out from under us; wait for the slot
                    // to produce a replacement
                    Next::StateClosed => state_rx = None,
                }
            }
        }
    })
}
