//! Wire types shared with the backend API.

use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};

/// Length of client-generated task identifiers.
pub const TASK_ID_LEN: usize = 21;

/// Suffix appended to a duplicated task's name.
const COPY_SUFFIX: &str = " (copy)";

/// Task urgency, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Completion state of a task.
///
/// `in progress` sorts before `completed` in every rendered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "in progress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
}

/// A to-do item in the backend's wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    pub priority: Priority,
    pub status: Status,
    pub user_id: String,
}

impl Task {
    /// Copy of this task with a fresh identifier and a marked name.
    ///
    /// Priority, status, and owner carry over unchanged.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self {
            id: generate_task_id(),
            name: format!("{}{COPY_SUFFIX}", self.name),
            priority: self.priority,
            status: self.status,
            user_id: self.user_id.clone(),
        }
    }
}

/// The authenticated user as reported by `GET /api/validate-user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
}

/// Generate a fresh random task identifier of [`TASK_ID_LEN`] characters.
#[must_use]
pub fn generate_task_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TASK_ID_LEN)
        .map(char::from)
        .collect()
}

/// Partition tasks so everything in progress precedes everything completed.
///
/// The sort is stable: within each partition, tasks keep their existing
/// relative order, so re-sorting an already sorted list changes nothing.
pub fn sort_by_status(tasks: &mut [Task]) {
    tasks.sort_by_key(|task| matches!(task.status, Status::Completed));
}
