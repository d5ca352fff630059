//! PlannerClient trait definition

use async_trait::async_trait;

use crate::error::PlannerError;
use crate::types::{NewTask, Plan, Task};

/// Stateless planning-service client - each call is independent
///
/// This is the seam between the board component and the remote service.
/// Implementations must not cache: the board's whole synchronization model
/// is "mutate remotely, then re-fetch everything", so every call reflects
/// the service's current view.
#[async_trait]
pub trait PlannerClient: Send + Sync {
    /// Fetch every plan visible to the signed-in user
    async fn get_all_my_plans(&self) -> Result<Vec<Plan>, PlannerError>;

    /// Fetch one plan by id
    async fn get_single_plan(&self, id: &str) -> Result<Plan, PlannerError>;

    /// Fetch all tasks under a plan
    async fn get_tasks_for_plan(&self, plan_id: &str) -> Result<Vec<Task>, PlannerError>;

    /// Create a task under a plan
    async fn add_task(&self, plan_id: &str, task: NewTask) -> Result<Task, PlannerError>;

    /// Mark a task 100 percent complete
    async fn set_task_complete(&self, task_id: &str) -> Result<(), PlannerError>;

    /// Delete a task
    async fn remove_task(&self, task_id: &str) -> Result<(), PlannerError>;
}

/// Mock planner client for unit tests
///
/// Lives outside `#[cfg(test)]` so the board crate's tests can use it too.
pub mod mock {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct MockInner {
        plans: Vec<Plan>,
        tasks: BTreeMap<String, Vec<Task>>,
        calls: Vec<String>,
        next_task_id: u32,
        fail_plans: bool,
        fail_tasks_for: Option<String>,
        fail_mutations: bool,
    }

    /// In-memory planner that behaves like the real service
    ///
    /// Mutations change the stored plans/tasks, so a follow-up load observes
    /// them, matching the board's mutate-then-reload cycle. Failure switches
    /// let tests inject errors per operation family.
    #[derive(Default)]
    pub struct MockPlannerClient {
        inner: Mutex<MockInner>,
    }

    impl MockPlannerClient {
        pub fn new() -> Self {
            Self::default()
        }

        /// Seed a plan with its tasks
        pub fn with_plan(self, plan: Plan, tasks: Vec<Task>) -> Self {
            {
                let mut inner = self.inner.lock().expect("mock poisoned");
                inner.tasks.insert(plan.id.clone(), tasks);
                inner.plans.push(plan);
            }
            self
        }

        /// Make plan fetches fail with a 503
        pub fn fail_plans(&self) {
            self.inner.lock().expect("mock poisoned").fail_plans = true;
        }

        /// Make the task fetch for one specific plan fail
        pub fn fail_tasks_for(&self, plan_id: &str) {
            self.inner.lock().expect("mock poisoned").fail_tasks_for = Some(plan_id.to_string());
        }

        /// Make all mutations (add/complete/remove) fail
        pub fn fail_mutations(&self) {
            self.inner.lock().expect("mock poisoned").fail_mutations = true;
        }

        /// How many times the named operation was invoked
        pub fn call_count(&self, op: &str) -> usize {
            self.inner
                .lock()
                .expect("mock poisoned")
                .calls
                .iter()
                .filter(|c| c.as_str() == op)
                .count()
        }

        /// Total number of remote calls issued
        pub fn total_calls(&self) -> usize {
            self.inner.lock().expect("mock poisoned").calls.len()
        }

        fn server_error() -> PlannerError {
            PlannerError::Api {
                status: 503,
                message: "Service unavailable".to_string(),
            }
        }
    }

    #[async_trait]
    impl PlannerClient for MockPlannerClient {
        async fn get_all_my_plans(&self) -> Result<Vec<Plan>, PlannerError> {
            let mut inner = self.inner.lock().expect("mock poisoned");
            inner.calls.push("get_all_my_plans".to_string());
            if inner.fail_plans {
                return Err(Self::server_error());
            }
            Ok(inner.plans.clone())
        }

        async fn get_single_plan(&self, id: &str) -> Result<Plan, PlannerError> {
            let mut inner = self.inner.lock().expect("mock poisoned");
            inner.calls.push("get_single_plan".to_string());
            if inner.fail_plans {
                return Err(Self::server_error());
            }
            inner
                .plans
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or(PlannerError::Api {
                    status: 404,
                    message: format!("No plan {}", id),
                })
        }

        async fn get_tasks_for_plan(&self, plan_id: &str) -> Result<Vec<Task>, PlannerError> {
            let mut inner = self.inner.lock().expect("mock poisoned");
            inner.calls.push("get_tasks_for_plan".to_string());
            if inner.fail_tasks_for.as_deref() == Some(plan_id) {
                return Err(Self::server_error());
            }
            Ok(inner.tasks.get(plan_id).cloned().unwrap_or_default())
        }

        async fn add_task(&self, plan_id: &str, task: NewTask) -> Result<Task, PlannerError> {
            let mut inner = self.inner.lock().expect("mock poisoned");
            inner.calls.push("add_task".to_string());
            if inner.fail_mutations {
                return Err(Self::server_error());
            }
            inner.next_task_id += 1;
            let created = Task {
                id: format!("mock-task-{}", inner.next_task_id),
                plan_id: plan_id.to_string(),
                title: task.title,
                percent_complete: 0,
                due_date_time: task.due_date_time,
                assignments: BTreeMap::new(),
            };
            inner
                .tasks
                .entry(plan_id.to_string())
                .or_default()
                .push(created.clone());
            Ok(created)
        }

        async fn set_task_complete(&self, task_id: &str) -> Result<(), PlannerError> {
            let mut inner = self.inner.lock().expect("mock poisoned");
            inner.calls.push("set_task_complete".to_string());
            if inner.fail_mutations {
                return Err(Self::server_error());
            }
            for tasks in inner.tasks.values_mut() {
                if let Some(task) = tasks.iter_mut().find(|t| t.id == task_id) {
                    task.percent_complete = 100;
                    return Ok(());
                }
            }
            Err(PlannerError::Api {
                status: 404,
                message: format!("No task {}", task_id),
            })
        }

        async fn remove_task(&self, task_id: &str) -> Result<(), PlannerError> {
            let mut inner = self.inner.lock().expect("mock poisoned");
            inner.calls.push("remove_task".to_string());
            if inner.fail_mutations {
                return Err(Self::server_error());
            }
            for tasks in inner.tasks.values_mut() {
                if let Some(pos) = tasks.iter().position(|t| t.id == task_id) {
                    tasks.remove(pos);
                    return Ok(());
                }
            }
            Err(PlannerError::Api {
                status: 404,
                message: format!("No task {}", task_id),
            })
        }
    }
}
