//! Board view-state
//!
//! Pure data structures for the board. No rendering logic here. The state
//! is created empty at construction, mutated only by the runner (applying
//! load outcomes) and by key handlers (drafts, selection), and discarded
//! with the component.

use plansvc::{Plan, Task};

use super::loader::LoadSnapshot;

/// Which part of the board has keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// The task list (default)
    #[default]
    TaskList,
    /// The plan picker in the header
    PlanPicker,
    /// The new-task title input
    TitleInput,
    /// The new-task due-date input
    DueInput,
}

/// Selection state for the task list
#[derive(Debug, Default, Clone)]
pub struct SelectionState {
    pub selected_index: usize,
}

impl SelectionState {
    pub fn select_next(&mut self, max_items: usize) {
        if max_items > 0 && self.selected_index < max_items - 1 {
            self.selected_index += 1;
        }
    }

    pub fn select_prev(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    /// Ensure selection is within bounds
    pub fn clamp(&mut self, max_items: usize) {
        if max_items == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= max_items {
            self.selected_index = max_items - 1;
        }
    }
}

/// Action queued by a key handler for the runner to execute
#[derive(Debug, Clone)]
pub enum PendingAction {
    /// Re-fetch everything
    Refresh,
    /// Create a task from the draft fields
    Add {
        title: String,
        due: String,
        plan_id: String,
    },
    /// Mark a task complete
    Complete(Task),
    /// Delete a task
    Remove(String),
}

/// Main board state
#[derive(Debug, Default)]
pub struct BoardState {
    /// All plans visible to the user (or the single pinned plan)
    pub plans: Vec<Plan>,
    /// Union of tasks across all loaded plans
    pub tasks: Vec<Task>,
    /// Which plan's tasks are displayed
    pub selected_plan_id: Option<String>,

    /// Pending new-task input, cleared only on successful creation
    pub draft_title: String,
    pub draft_due: String,

    /// Pin the board to one plan; suppresses the picker
    pub target_plan_id: Option<String>,
    /// Suppress add/complete/delete affordances
    pub read_only: bool,

    /// Last failure, shown as a banner until the next key press
    pub last_error: Option<String>,
    /// A fetch generation is outstanding
    pub loading: bool,
    /// Sign-in state for the footer
    pub signed_in: bool,

    /// Keyboard focus
    pub focus: Focus,
    /// Highlighted entry in the plan picker
    pub picker_index: usize,
    /// Task list selection
    pub task_selection: SelectionState,

    /// Should the board quit
    pub should_quit: bool,
    /// Action queued for the runner
    pub pending_action: Option<PendingAction>,
}

impl BoardState {
    /// Create board state with the given external configuration
    pub fn new(read_only: bool, target_plan_id: Option<String>) -> Self {
        Self {
            // The pinned plan is the selection from the start; loads keep
            // forcing it (see apply_snapshot)
            selected_plan_id: target_plan_id.clone(),
            target_plan_id,
            read_only,
            ..Self::default()
        }
    }

    /// Whether the plan picker is shown at all
    pub fn picker_visible(&self) -> bool {
        self.target_plan_id.is_none()
    }

    /// Tasks belonging to the selected plan, in load order
    pub fn visible_tasks(&self) -> Vec<&Task> {
        match &self.selected_plan_id {
            Some(id) => self.tasks.iter().filter(|t| &t.plan_id == id).collect(),
            None => Vec::new(),
        }
    }

    /// The task currently highlighted in the list
    pub fn selected_task(&self) -> Option<&Task> {
        self.visible_tasks()
            .get(self.task_selection.selected_index)
            .copied()
    }

    /// Title for the header when the picker is suppressed
    pub fn pinned_plan_title(&self) -> &str {
        self.plans.first().map(|p| p.title.as_str()).unwrap_or("Plan")
    }

    /// Switch the displayed plan; no network involved
    pub fn select_plan_at(&mut self, index: usize) {
        if let Some(plan) = self.plans.get(index) {
            self.picker_index = index;
            self.selected_plan_id = Some(plan.id.clone());
            self.task_selection = SelectionState::default();
        }
    }

    /// Commit a successful load
    ///
    /// A pinned board forces the selection to the target on every load; an
    /// unpinned one assigns the selection only when it is still unset, so a
    /// user's picker choice survives reloads.
    pub fn apply_snapshot(&mut self, snapshot: LoadSnapshot) {
        self.plans = snapshot.plans;
        self.tasks = snapshot.tasks;

        match snapshot.forced_selection {
            Some(target) => self.selected_plan_id = Some(target),
            None => {
                if self.selected_plan_id.is_none() {
                    self.selected_plan_id = self.plans.first().map(|p| p.id.clone());
                }
            }
        }

        // Keep the picker highlight in step with the selection
        if let Some(selected) = &self.selected_plan_id
            && let Some(idx) = self.plans.iter().position(|p| &p.id == selected)
        {
            self.picker_index = idx;
        }

        let visible = self.visible_tasks().len();
        self.task_selection.clamp(visible);
        self.loading = false;
    }

    /// A task was created: clear the drafts so the add bar resets
    pub fn note_add_success(&mut self) {
        self.draft_title.clear();
        self.draft_due.clear();
    }

    /// Set the error banner
    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.last_error = Some(msg.into());
        self.loading = false;
    }

    /// Clear the error banner
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plansvc::Plan;
    use std::collections::BTreeMap;

    fn task(id: &str, plan_id: &str, title: &str) -> Task {
        Task {
            id: id.to_string(),
            plan_id: plan_id.to_string(),
            title: title.to_string(),
            percent_complete: 0,
            due_date_time: None,
            assignments: BTreeMap::new(),
        }
    }

    fn snapshot(plans: Vec<Plan>, tasks: Vec<Task>, forced: Option<&str>) -> LoadSnapshot {
        LoadSnapshot {
            plans,
            tasks,
            forced_selection: forced.map(str::to_string),
        }
    }

    #[test]
    fn test_visible_tasks_filtered_to_selected_plan() {
        let mut state = BoardState::new(false, None);
        state.apply_snapshot(snapshot(
            vec![Plan::new("p1", "Groceries"), Plan::new("p2", "Chores")],
            vec![task("t1", "p1", "Buy milk"), task("t2", "p2", "Mow lawn")],
            None,
        ));

        assert_eq!(state.selected_plan_id.as_deref(), Some("p1"));
        let visible = state.visible_tasks();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "t1");
    }

    #[test]
    fn test_no_selection_shows_nothing() {
        let mut state = BoardState::new(false, None);
        state.tasks = vec![task("t1", "p1", "Buy milk")];
        assert!(state.visible_tasks().is_empty());
    }

    #[test]
    fn test_selection_auto_assigned_only_when_unset() {
        let mut state = BoardState::new(false, None);
        state.apply_snapshot(snapshot(
            vec![Plan::new("p1", "Groceries"), Plan::new("p2", "Chores")],
            vec![],
            None,
        ));
        assert_eq!(state.selected_plan_id.as_deref(), Some("p1"));

        // User picks the second plan, then a reload arrives
        state.select_plan_at(1);
        assert_eq!(state.selected_plan_id.as_deref(), Some("p2"));

        state.apply_snapshot(snapshot(
            vec![Plan::new("p1", "Groceries"), Plan::new("p2", "Chores")],
            vec![],
            None,
        ));
        assert_eq!(state.selected_plan_id.as_deref(), Some("p2"));
    }

    #[test]
    fn test_forced_selection_overrides_prior_choice() {
        let mut state = BoardState::new(false, Some("p2".to_string()));
        state.selected_plan_id = Some("p1".to_string());

        state.apply_snapshot(snapshot(
            vec![Plan::new("p2", "Chores")],
            vec![task("t2", "p2", "Mow lawn")],
            Some("p2"),
        ));
        assert_eq!(state.selected_plan_id.as_deref(), Some("p2"));
        assert_eq!(state.visible_tasks().len(), 1);
    }

    #[test]
    fn test_pinned_board_starts_with_target_selected() {
        let state = BoardState::new(true, Some("p9".to_string()));
        assert_eq!(state.selected_plan_id.as_deref(), Some("p9"));
        assert!(!state.picker_visible());
        assert!(state.read_only);
    }

    #[test]
    fn test_pinned_plan_title_fallback() {
        let state = BoardState::new(false, Some("p1".to_string()));
        assert_eq!(state.pinned_plan_title(), "Plan");
    }

    #[test]
    fn test_note_add_success_clears_drafts() {
        let mut state = BoardState::new(false, None);
        state.draft_title = "Buy milk".to_string();
        state.draft_due = "2024-01-01".to_string();
        state.note_add_success();
        assert!(state.draft_title.is_empty());
        assert!(state.draft_due.is_empty());
    }

    #[test]
    fn test_failed_load_leaves_data_untouched() {
        let mut state = BoardState::new(false, None);
        state.apply_snapshot(snapshot(
            vec![Plan::new("p1", "Groceries")],
            vec![task("t1", "p1", "Buy milk")],
            None,
        ));

        // The runner reports failures via set_error without applying
        state.set_error("API error 503: Service unavailable");
        assert_eq!(state.plans.len(), 1);
        assert_eq!(state.tasks.len(), 1);
        assert!(state.last_error.is_some());
    }

    #[test]
    fn test_task_selection_clamped_on_apply() {
        let mut state = BoardState::new(false, None);
        state.task_selection.selected_index = 5;
        state.apply_snapshot(snapshot(
            vec![Plan::new("p1", "Groceries")],
            vec![task("t1", "p1", "Buy milk")],
            None,
        ));
        assert_eq!(state.task_selection.selected_index, 0);
    }
}
