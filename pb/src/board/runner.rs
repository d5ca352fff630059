//! Board runner - owns the terminal and the synchronization loop
//!
//! The runner is the only place view-state is mutated from the outside
//! world. It selects over terminal events and board messages, executes
//! pending actions by spawning loader calls, and applies finished loads
//! only when their generation is still current, so an older response can
//! never overwrite a newer one.

use std::sync::Arc;
use std::time::Duration;

use eyre::Result;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use plansvc::{PlannerError, ProviderSlot};

use crate::config::BoardConfig;

use super::Tui;
use super::app::App;
use super::events::{Event, EventHandler};
use super::loader::{BoardMessage, LoadOutcome, Loader, MutationOp};
use super::state::{BoardState, PendingAction};
use super::{views, watcher};

/// Board runner that manages the terminal and the feedback loop
pub struct BoardRunner {
    app: App,
    terminal: Tui,
    loader: Arc<Loader>,
    slot: ProviderSlot,
    event_handler: EventHandler,
    msg_tx: mpsc::UnboundedSender<BoardMessage>,
    msg_rx: mpsc::UnboundedReceiver<BoardMessage>,
}

impl BoardRunner {
    pub fn new(terminal: Tui, slot: ProviderSlot, config: &BoardConfig) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let loader = Arc::new(Loader::new(slot.clone(), config.target_plan_id.clone()));

        Self {
            app: App::new(config.read_only, config.target_plan_id.clone()),
            terminal,
            loader,
            slot,
            event_handler: EventHandler::new(Duration::from_millis(33)), // ~30 FPS
            msg_tx,
            msg_rx,
        }
    }

    /// Run the board main loop
    pub async fn run(&mut self) -> Result<()> {
        let watcher = watcher::spawn(self.slot.clone(), self.msg_tx.clone());

        loop {
            let signed_in = self
                .slot
                .current()
                .map(|session| session.is_signed_in())
                .unwrap_or(false);
            self.app.state_mut().signed_in = signed_in;

            self.terminal.draw(|frame| views::render(self.app.state(), frame))?;

            enum Step {
                Term(Event),
                Msg(BoardMessage),
                Closed,
            }

            let step = tokio::select! {
                event = self.event_handler.next() => Step::Term(event?),
                msg = self.msg_rx.recv() => match msg {
                    Some(msg) => Step::Msg(msg),
                    None => Step::Closed,
                },
            };

            match step {
                Step::Term(Event::Key(key)) => {
                    if self.app.handle_key(key) {
                        break;
                    }
                    self.execute_pending();
                }
                Step::Term(Event::Tick | Event::Resize(..)) => {}
                Step::Msg(msg) => self.handle_message(msg),
                Step::Closed => break,
            }

            if self.app.state().should_quit {
                break;
            }
        }

        watcher.abort();
        Ok(())
    }

    /// Execute whatever action the key handlers queued
    fn execute_pending(&mut self) {
        let Some(action) = self.app.state_mut().pending_action.take() else {
            return;
        };

        match action {
            PendingAction::Refresh => self.spawn_load(),
            PendingAction::Add { title, due, plan_id } => {
                let loader = Arc::clone(&self.loader);
                let tx = self.msg_tx.clone();
                tokio::spawn(async move {
                    let result = loader.add_task(&title, &due, &plan_id).await;
                    let _ = tx.send(BoardMessage::MutationFinished {
                        op: MutationOp::Add,
                        result,
                    });
                });
            }
            PendingAction::Complete(task) => {
                let loader = Arc::clone(&self.loader);
                let tx = self.msg_tx.clone();
                tokio::spawn(async move {
                    let result = loader.complete_task(&task).await;
                    let _ = tx.send(BoardMessage::MutationFinished {
                        op: MutationOp::Complete,
                        result,
                    });
                });
            }
            PendingAction::Remove(task_id) => {
                let loader = Arc::clone(&self.loader);
                let tx = self.msg_tx.clone();
                tokio::spawn(async move {
                    let result = loader.remove_task(&task_id).await;
                    let _ = tx.send(BoardMessage::MutationFinished {
                        op: MutationOp::Remove,
                        result,
                    });
                });
            }
        }
    }

    /// Start a new load generation in the background
    fn spawn_load(&mut self) {
        self.app.state_mut().loading = true;
        let generation = self.loader.next_generation();
        let loader = Arc::clone(&self.loader);
        let tx = self.msg_tx.clone();

        tokio::spawn(async move {
            let result = loader.load_plans().await;
            let _ = tx.send(BoardMessage::LoadFinished(LoadOutcome { generation, result }));
        });
    }

    fn handle_message(&mut self, msg: BoardMessage) {
        match msg {
            BoardMessage::LoadRequested => self.spawn_load(),
            BoardMessage::LoadFinished(outcome) => {
                apply_load_outcome(self.app.state_mut(), self.loader.latest_generation(), outcome);
            }
            BoardMessage::MutationFinished { op, result } => {
                if apply_mutation_result(self.app.state_mut(), op, result) {
                    self.spawn_load();
                }
            }
        }
    }
}

/// Apply a finished load, unless a newer generation has been issued
pub fn apply_load_outcome(state: &mut BoardState, latest_generation: u64, outcome: LoadOutcome) {
    if outcome.generation != latest_generation {
        debug!(
            generation = outcome.generation,
            latest = latest_generation,
            "discarding stale load"
        );
        return;
    }

    match outcome.result {
        Ok(Some(snapshot)) => state.apply_snapshot(snapshot),
        // Signed out: nothing was fetched, nothing changes
        Ok(None) => state.loading = false,
        Err(e) => {
            warn!("load failed: {}", e);
            state.set_error(e.to_string());
        }
    }
}

/// Apply a finished mutation; returns true when a resync should follow
pub fn apply_mutation_result(
    state: &mut BoardState,
    op: MutationOp,
    result: Result<bool, PlannerError>,
) -> bool {
    match result {
        Ok(true) => {
            if op == MutationOp::Add {
                state.note_add_success();
            }
            true
        }
        // Precondition not met (signed out, or already complete): no-op
        Ok(false) => false,
        Err(e) => {
            warn!(?op, "mutation failed: {}", e);
            state.set_error(e.to_string());
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plansvc::Plan;

    use crate::board::loader::LoadSnapshot;

    fn snapshot(plan: &str, title: &str) -> LoadSnapshot {
        LoadSnapshot {
            plans: vec![Plan::new(plan, title)],
            tasks: vec![],
            forced_selection: None,
        }
    }

    #[test]
    fn test_stale_load_discarded() {
        let mut state = BoardState::new(false, None);
        state.apply_snapshot(snapshot("p1", "Current"));

        let stale = LoadOutcome {
            generation: 1,
            result: Ok(Some(snapshot("p9", "Stale"))),
        };
        apply_load_outcome(&mut state, 2, stale);

        assert_eq!(state.plans[0].id, "p1");
    }

    #[test]
    fn test_current_load_applied() {
        let mut state = BoardState::new(false, None);
        let outcome = LoadOutcome {
            generation: 2,
            result: Ok(Some(snapshot("p2", "Fresh"))),
        };
        apply_load_outcome(&mut state, 2, outcome);

        assert_eq!(state.plans[0].id, "p2");
        assert!(!state.loading);
    }

    #[test]
    fn test_failed_load_keeps_data_and_sets_banner() {
        let mut state = BoardState::new(false, None);
        state.apply_snapshot(snapshot("p1", "Current"));

        let failed = LoadOutcome {
            generation: 3,
            result: Err(PlannerError::Api {
                status: 503,
                message: "Service unavailable".to_string(),
            }),
        };
        apply_load_outcome(&mut state, 3, failed);

        assert_eq!(state.plans[0].id, "p1");
        assert!(state.last_error.as_deref().unwrap_or("").contains("503"));
    }

    #[test]
    fn test_successful_add_clears_drafts_and_requests_resync() {
        let mut state = BoardState::new(false, None);
        state.draft_title = "Buy milk".to_string();
        state.draft_due = "2024-01-01".to_string();

        let resync = apply_mutation_result(&mut state, MutationOp::Add, Ok(true));
        assert!(resync);
        assert!(state.draft_title.is_empty());
        assert!(state.draft_due.is_empty());
    }

    #[test]
    fn test_failed_add_keeps_drafts() {
        let mut state = BoardState::new(false, None);
        state.draft_title = "Buy milk".to_string();

        let resync = apply_mutation_result(
            &mut state,
            MutationOp::Add,
            Err(PlannerError::Api {
                status: 500,
                message: "boom".to_string(),
            }),
        );
        assert!(!resync);
        assert_eq!(state.draft_title, "Buy milk");
        assert!(state.last_error.is_some());
    }

    #[test]
    fn test_no_op_mutation_requests_nothing() {
        let mut state = BoardState::new(false, None);
        let resync = apply_mutation_result(&mut state, MutationOp::Complete, Ok(false));
        assert!(!resync);
        assert!(state.last_error.is_none());
    }
}
