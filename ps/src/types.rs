//! Domain types for the planning service
//!
//! Field names are serialized in the service's camelCase wire shape. The
//! board never mutates these locally; they are replaced wholesale on reload.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A named container of tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub title: String,
}

impl Plan {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Per-person assignment metadata attached to a task
///
/// The service keys assignments by person id; the metadata itself is mostly
/// opaque to the board (only the keys are rendered).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_hint: Option<String>,
}

/// A unit of work under a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub plan_id: String,
    #[serde(default = "default_task_title")]
    pub title: String,
    #[serde(default)]
    pub percent_complete: u8,
    #[serde(default)]
    pub due_date_time: Option<String>,
    #[serde(default)]
    pub assignments: BTreeMap<String, Assignment>,
}

fn default_task_title() -> String {
    "Task".to_string()
}

impl Task {
    /// Completion is derived: 100 percent means complete, anything else not
    pub fn is_complete(&self) -> bool {
        self.percent_complete >= 100
    }
}

/// Payload for creating a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub plan_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date_time: Option<String>,
}

impl NewTask {
    pub fn new(plan_id: impl Into<String>, title: impl Into<String>, due_date_time: Option<String>) -> Self {
        Self {
            plan_id: plan_id.into(),
            title: title.into(),
            due_date_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_completion_derived() {
        let mut task = Task {
            id: "t1".to_string(),
            plan_id: "p1".to_string(),
            title: "Buy milk".to_string(),
            percent_complete: 0,
            due_date_time: None,
            assignments: BTreeMap::new(),
        };
        assert!(!task.is_complete());

        task.percent_complete = 100;
        assert!(task.is_complete());
    }

    #[test]
    fn test_task_deserializes_wire_shape() {
        let json = r#"{
            "id": "t1",
            "planId": "p1",
            "title": "Review PR",
            "percentComplete": 50,
            "dueDateTime": "2024-01-01T00:00:00Z",
            "assignments": { "user-a": { "orderHint": "8585" } }
        }"#;

        let task: Task = serde_json::from_str(json).expect("wire task should parse");
        assert_eq!(task.plan_id, "p1");
        assert_eq!(task.percent_complete, 50);
        assert_eq!(task.due_date_time.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(task.assignments.len(), 1);
        assert_eq!(
            task.assignments["user-a"].order_hint.as_deref(),
            Some("8585")
        );
    }

    #[test]
    fn test_task_missing_fields_get_defaults() {
        let json = r#"{ "id": "t1", "planId": "p1" }"#;
        let task: Task = serde_json::from_str(json).expect("sparse task should parse");
        assert_eq!(task.title, "Task");
        assert_eq!(task.percent_complete, 0);
        assert!(task.due_date_time.is_none());
        assert!(task.assignments.is_empty());
    }

    #[test]
    fn test_new_task_omits_absent_due_date() {
        let body = serde_json::to_value(NewTask::new("p1", "Buy milk", None)).expect("serialize");
        assert_eq!(body["planId"], "p1");
        assert_eq!(body["title"], "Buy milk");
        assert!(body.get("dueDateTime").is_none());
    }
}
