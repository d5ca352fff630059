//! Data loader - fetches remote state and runs mutations
//!
//! Every operation checks sign-in locally before touching the network: a
//! signed-out board degrades to a no-op, not an error. Mutations never
//! patch local state; the runner follows each success with a full
//! [`Loader::load_plans`] so the board resynchronizes with the service.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::try_join_all;
use tracing::debug;

use plansvc::{NewTask, Plan, PlannerClient, PlannerError, ProviderSlot, Task};

/// Everything a successful load produces
#[derive(Debug)]
pub struct LoadSnapshot {
    pub plans: Vec<Plan>,
    pub tasks: Vec<Task>,
    /// Present on a pinned board: the selection is forced to this plan
    pub forced_selection: Option<String>,
}

/// A finished load, tagged with the generation that issued it
#[derive(Debug)]
pub struct LoadOutcome {
    pub generation: u64,
    /// Ok(None) means the board was signed out and nothing was fetched
    pub result: Result<Option<LoadSnapshot>, PlannerError>,
}

/// Which mutation finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOp {
    Add,
    Complete,
    Remove,
}

/// Messages delivered to the runner between draws
#[derive(Debug)]
pub enum BoardMessage {
    /// The session watcher wants a reload
    LoadRequested,
    /// A spawned load finished
    LoadFinished(LoadOutcome),
    /// A spawned mutation finished; `Ok(true)` means the remote call ran
    MutationFinished {
        op: MutationOp,
        result: Result<bool, PlannerError>,
    },
}

/// Fetches plans/tasks and issues mutations against the active session
pub struct Loader {
    slot: ProviderSlot,
    target_plan_id: Option<String>,
    generation: AtomicU64,
}

impl Loader {
    pub fn new(slot: ProviderSlot, target_plan_id: Option<String>) -> Self {
        Self {
            slot,
            target_plan_id,
            generation: AtomicU64::new(0),
        }
    }

    /// The client of the active, signed-in session (None otherwise)
    fn signed_in_client(&self) -> Option<Arc<dyn PlannerClient>> {
        self.slot
            .current()
            .filter(|session| session.is_signed_in())
            .map(|session| session.client())
    }

    /// Issue a new load generation
    ///
    /// Overlapping loads are allowed; only the outcome whose generation is
    /// still the latest when it finishes gets applied.
    pub fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The most recently issued generation
    pub fn latest_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Fetch the plan(s) and their tasks
    ///
    /// Unpinned: all visible plans, then every plan's tasks concurrently,
    /// flattened. Pinned: exactly the target plan and its tasks. Any failed
    /// fetch fails the whole load; nothing partial is ever returned.
    pub async fn load_plans(&self) -> Result<Option<LoadSnapshot>, PlannerError> {
        let Some(client) = self.signed_in_client() else {
            debug!("load_plans: no signed-in session, skipping");
            return Ok(None);
        };

        match &self.target_plan_id {
            None => {
                let plans = client.get_all_my_plans().await?;
                debug!(plan_count = plans.len(), "load_plans: fetched plans");

                let fetches = plans.iter().map(|plan| client.get_tasks_for_plan(&plan.id));
                let tasks: Vec<Task> = try_join_all(fetches).await?.into_iter().flatten().collect();

                Ok(Some(LoadSnapshot {
                    plans,
                    tasks,
                    forced_selection: None,
                }))
            }
            Some(target) => {
                let plan = client.get_single_plan(target).await?;
                let tasks = client.get_tasks_for_plan(&plan.id).await?;
                debug!(plan = %plan.id, task_count = tasks.len(), "load_plans: fetched pinned plan");

                Ok(Some(LoadSnapshot {
                    plans: vec![plan],
                    tasks,
                    forced_selection: Some(target.clone()),
                }))
            }
        }
    }

    /// Create a task under a plan
    ///
    /// Returns Ok(false) without a remote call when signed out. An empty
    /// due date is omitted from the payload.
    pub async fn add_task(&self, title: &str, due: &str, plan_id: &str) -> Result<bool, PlannerError> {
        let Some(client) = self.signed_in_client() else {
            return Ok(false);
        };

        let due_date_time = if due.is_empty() { None } else { Some(due.to_string()) };
        client
            .add_task(plan_id, NewTask::new(plan_id, title, due_date_time))
            .await?;
        Ok(true)
    }

    /// Mark a task complete
    ///
    /// Completing an already-complete task is a no-op: no remote call, no
    /// state change.
    pub async fn complete_task(&self, task: &Task) -> Result<bool, PlannerError> {
        let Some(client) = self.signed_in_client() else {
            return Ok(false);
        };
        if task.is_complete() {
            debug!(task = %task.id, "complete_task: already complete, skipping");
            return Ok(false);
        }

        client.set_task_complete(&task.id).await?;
        Ok(true)
    }

    /// Delete a task
    pub async fn remove_task(&self, task_id: &str) -> Result<bool, PlannerError> {
        let Some(client) = self.signed_in_client() else {
            return Ok(false);
        };

        client.remove_task(task_id).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plansvc::client::mock::MockPlannerClient;
    use plansvc::{Plan, Session};
    use std::collections::BTreeMap;

    fn task(id: &str, plan_id: &str, title: &str, percent: u8) -> Task {
        Task {
            id: id.to_string(),
            plan_id: plan_id.to_string(),
            title: title.to_string(),
            percent_complete: percent,
            due_date_time: None,
            assignments: BTreeMap::new(),
        }
    }

    fn signed_in_loader(client: Arc<MockPlannerClient>, target: Option<&str>) -> Loader {
        let session = Arc::new(Session::signed_in(client));
        let slot = ProviderSlot::with_session(session);
        Loader::new(slot, target.map(str::to_string))
    }

    #[tokio::test]
    async fn test_load_all_plans_flattens_tasks() {
        let client = Arc::new(
            MockPlannerClient::new()
                .with_plan(Plan::new("p1", "Groceries"), vec![task("t1", "p1", "Buy milk", 0)])
                .with_plan(Plan::new("p2", "Chores"), vec![task("t2", "p2", "Mow lawn", 0)]),
        );
        let loader = signed_in_loader(client, None);

        let snapshot = loader
            .load_plans()
            .await
            .expect("load should succeed")
            .expect("signed in");
        assert_eq!(snapshot.plans.len(), 2);
        assert_eq!(snapshot.tasks.len(), 2);
        assert!(snapshot.forced_selection.is_none());
    }

    #[tokio::test]
    async fn test_load_pinned_plan_forces_selection() {
        let client = Arc::new(
            MockPlannerClient::new()
                .with_plan(Plan::new("p1", "Groceries"), vec![task("t1", "p1", "Buy milk", 0)])
                .with_plan(Plan::new("p2", "Chores"), vec![task("t2", "p2", "Mow lawn", 0)]),
        );
        let loader = signed_in_loader(client.clone(), Some("p2"));

        let snapshot = loader.load_plans().await.expect("load").expect("signed in");
        assert_eq!(snapshot.plans.len(), 1);
        assert_eq!(snapshot.plans[0].id, "p2");
        assert!(snapshot.tasks.iter().all(|t| t.plan_id == "p2"));
        assert_eq!(snapshot.forced_selection.as_deref(), Some("p2"));

        // Pinned loads never enumerate all plans
        assert_eq!(client.call_count("get_all_my_plans"), 0);
        assert_eq!(client.call_count("get_single_plan"), 1);
    }

    #[tokio::test]
    async fn test_signed_out_load_is_a_no_op() {
        let client = Arc::new(MockPlannerClient::new().with_plan(Plan::new("p1", "Groceries"), vec![]));
        let session = Arc::new(Session::new(client.clone()));
        let loader = Loader::new(ProviderSlot::with_session(session), None);

        let result = loader.load_plans().await.expect("no error when signed out");
        assert!(result.is_none());
        assert_eq!(client.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_slot_load_is_a_no_op() {
        let loader = Loader::new(ProviderSlot::empty(), None);
        let result = loader.load_plans().await.expect("no error with empty slot");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_one_failed_task_fetch_fails_whole_load() {
        let client = Arc::new(
            MockPlannerClient::new()
                .with_plan(Plan::new("p1", "Groceries"), vec![task("t1", "p1", "Buy milk", 0)])
                .with_plan(Plan::new("p2", "Chores"), vec![task("t2", "p2", "Mow lawn", 0)]),
        );
        client.fail_tasks_for("p2");
        let loader = signed_in_loader(client, None);

        assert!(loader.load_plans().await.is_err());
    }

    #[tokio::test]
    async fn test_complete_task_idempotence_guard() {
        let client = Arc::new(
            MockPlannerClient::new()
                .with_plan(Plan::new("p1", "Groceries"), vec![task("t1", "p1", "Buy milk", 100)]),
        );
        let loader = signed_in_loader(client.clone(), None);

        let done = task("t1", "p1", "Buy milk", 100);
        let performed = loader.complete_task(&done).await.expect("no error");
        assert!(!performed);
        assert_eq!(client.call_count("set_task_complete"), 0);
    }

    #[tokio::test]
    async fn test_complete_incomplete_task_calls_service() {
        let client = Arc::new(
            MockPlannerClient::new()
                .with_plan(Plan::new("p1", "Groceries"), vec![task("t1", "p1", "Buy milk", 50)]),
        );
        let loader = signed_in_loader(client.clone(), None);

        let pending = task("t1", "p1", "Buy milk", 50);
        let performed = loader.complete_task(&pending).await.expect("no error");
        assert!(performed);
        assert_eq!(client.call_count("set_task_complete"), 1);
    }

    #[tokio::test]
    async fn test_add_task_then_reload_includes_it() {
        let client = Arc::new(MockPlannerClient::new().with_plan(Plan::new("p1", "Groceries"), vec![]));
        let loader = signed_in_loader(client, None);

        let performed = loader.add_task("Buy milk", "2024-01-01", "p1").await.expect("add");
        assert!(performed);

        let snapshot = loader.load_plans().await.expect("load").expect("signed in");
        assert!(
            snapshot
                .tasks
                .iter()
                .any(|t| t.title == "Buy milk" && t.plan_id == "p1")
        );
    }

    #[tokio::test]
    async fn test_failed_mutation_surfaces_error() {
        let client = Arc::new(MockPlannerClient::new().with_plan(Plan::new("p1", "Groceries"), vec![]));
        client.fail_mutations();
        let loader = signed_in_loader(client, None);

        assert!(loader.add_task("Buy milk", "", "p1").await.is_err());
    }

    #[tokio::test]
    async fn test_signed_out_mutations_do_nothing() {
        let client = Arc::new(MockPlannerClient::new().with_plan(Plan::new("p1", "Groceries"), vec![]));
        let session = Arc::new(Session::new(client.clone()));
        let loader = Loader::new(ProviderSlot::with_session(session), None);

        assert!(!loader.add_task("Buy milk", "", "p1").await.expect("no-op"));
        assert!(!loader.remove_task("t1").await.expect("no-op"));
        assert_eq!(client.total_calls(), 0);
    }

    #[test]
    fn test_generations_are_monotonic() {
        let loader = Loader::new(ProviderSlot::empty(), None);
        let g1 = loader.next_generation();
        let g2 = loader.next_generation();
        assert!(g2 > g1);
        assert_eq!(loader.latest_generation(), g2);
    }
}
