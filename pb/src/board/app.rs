//! Board application - key handling
//!
//! The App owns the BoardState and turns key events into state changes and
//! pending actions. It does no rendering and no networking; the runner
//! executes whatever actions the handlers queue.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::state::{BoardState, Focus, PendingAction};

/// Board application
#[derive(Debug, Default)]
pub struct App {
    state: BoardState,
}

impl App {
    pub fn new(read_only: bool, target_plan_id: Option<String>) -> Self {
        Self {
            state: BoardState::new(read_only, target_plan_id),
        }
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut BoardState {
        &mut self.state
    }

    /// Handle a key event
    ///
    /// Returns true if the application should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        // The error banner is transient: any key dismisses it
        self.state.clear_error();

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        match self.state.focus {
            Focus::TaskList => self.handle_task_list_key(key),
            Focus::PlanPicker => self.handle_picker_key(key),
            Focus::TitleInput | Focus::DueInput => self.handle_input_key(key),
        }

        false
    }

    /// Advance focus through the visible parts of the board
    fn cycle_focus(&mut self) {
        self.state.focus = match self.state.focus {
            Focus::TaskList => {
                if self.state.picker_visible() {
                    Focus::PlanPicker
                } else if !self.state.read_only {
                    Focus::TitleInput
                } else {
                    Focus::TaskList
                }
            }
            Focus::PlanPicker => {
                if !self.state.read_only {
                    Focus::TitleInput
                } else {
                    Focus::TaskList
                }
            }
            Focus::TitleInput => Focus::DueInput,
            Focus::DueInput => Focus::TaskList,
        };
    }

    fn handle_task_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => {
                self.state.should_quit = true;
            }
            KeyCode::Tab => {
                self.cycle_focus();
            }
            KeyCode::Char('n') if !self.state.read_only => {
                self.state.focus = Focus::TitleInput;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.state.task_selection.select_prev();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let max = self.state.visible_tasks().len();
                self.state.task_selection.select_next(max);
            }
            KeyCode::Char(' ') | KeyCode::Char('x') => {
                if !self.state.read_only
                    && let Some(task) = self.state.selected_task()
                {
                    self.state.pending_action = Some(PendingAction::Complete(task.clone()));
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if !self.state.read_only
                    && let Some(task) = self.state.selected_task()
                {
                    self.state.pending_action = Some(PendingAction::Remove(task.id.clone()));
                }
            }
            KeyCode::Char('r') => {
                self.state.pending_action = Some(PendingAction::Refresh);
            }
            _ => {}
        }
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab => {
                self.cycle_focus();
            }
            KeyCode::Esc | KeyCode::Enter => {
                self.state.focus = Focus::TaskList;
            }
            // Switching plans is purely local: no network call
            KeyCode::Up | KeyCode::Char('k') => {
                let index = self.state.picker_index.saturating_sub(1);
                self.state.select_plan_at(index);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let index = self.state.picker_index + 1;
                if index < self.state.plans.len() {
                    self.state.select_plan_at(index);
                }
            }
            _ => {}
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        let draft = match self.state.focus {
            Focus::TitleInput => &mut self.state.draft_title,
            Focus::DueInput => &mut self.state.draft_due,
            _ => return,
        };

        match key.code {
            KeyCode::Char(c) => {
                draft.push(c);
            }
            KeyCode::Backspace => {
                draft.pop();
            }
            KeyCode::Tab => {
                self.cycle_focus();
            }
            KeyCode::Esc => {
                self.state.focus = Focus::TaskList;
            }
            KeyCode::Enter => {
                self.submit_add();
            }
            _ => {}
        }
    }

    /// Queue a task creation from the drafts
    ///
    /// Only fires with a non-empty title and a plan to add to; drafts are
    /// kept until the runner reports a successful creation.
    fn submit_add(&mut self) {
        if self.state.read_only || self.state.draft_title.is_empty() {
            return;
        }
        let Some(plan_id) = self.state.selected_plan_id.clone() else {
            return;
        };

        self.state.pending_action = Some(PendingAction::Add {
            title: self.state.draft_title.clone(),
            due: self.state.draft_due.clone(),
            plan_id,
        });
        self.state.focus = Focus::TaskList;
    }
}
