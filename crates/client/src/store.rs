//! Client-held task list state.
//!
//! [`TaskStore`] keeps the cached task list the UI renders from and mirrors
//! it against the backend. Two invariants hold for every operation:
//!
//! - `is_loading` is raised at the start and released on every exit path,
//!   including transport failures.
//! - The cache only changes after the server confirms the write; a rejected
//!   or failed request leaves the list exactly as it was.

use std::sync::Arc;

use tracing::warn;

use crate::api::ServerApi;
use crate::model::{Task, sort_by_status};

/// Result of a store operation, surfaced to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
}

impl Outcome {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Cached task list for one signed-in user.
pub struct TaskStore {
    api: Arc<dyn ServerApi>,
    user_id: String,
    tasks: Vec<Task>,
    is_loading: bool,
    selected: Option<Task>,
}

impl TaskStore {
    /// Build an empty store for `user_id` over the given API.
    pub fn new(api: Arc<dyn ServerApi>, user_id: impl Into<String>) -> Self {
        Self {
            api,
            user_id: user_id.into(),
            tasks: Vec::new(),
            is_loading: false,
            selected: None,
        }
    }

    /// The cached task list, in display order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Whether an operation is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// The task currently selected for editing, if any.
    #[must_use]
    pub const fn selected(&self) -> Option<&Task> {
        self.selected.as_ref()
    }

    /// Select a task for editing, or clear the selection.
    pub fn set_selected(&mut self, task: Option<Task>) {
        self.selected = task;
    }

    /// Replace the cached list with the server's, in display order.
    pub async fn fetch_all(&mut self) -> Outcome {
        self.is_loading = true;
        let outcome = self.fetch_all_inner().await;
        self.is_loading = false;
        outcome
    }

    async fn fetch_all_inner(&mut self) -> Outcome {
        match self.api.fetch_tasks(&self.user_id).await {
            Ok(response) => match (response.success, response.tasks) {
                (true, Some(mut tasks)) => {
                    sort_by_status(&mut tasks);
                    self.tasks = tasks;
                    Outcome::ok("Tasks fetched successfully")
                }
                _ => Outcome::failed(response.message),
            },
            Err(error) => {
                warn!(%error, "task fetch failed");
                Outcome::failed("Error fetching tasks")
            }
        }
    }

    /// Create `task` on the server, then append it to the cache.
    ///
    /// A name already present in the cache (case-insensitive) is rejected
    /// before any request is made.
    pub async fn add(&mut self, task: Task) -> Outcome {
        self.is_loading = true;
        let outcome = self.add_inner(task).await;
        self.is_loading = false;
        outcome
    }

    async fn add_inner(&mut self, task: Task) -> Outcome {
        if self.name_taken(&task.name) {
            return Outcome::failed("A task with this name already exists");
        }

        match self.api.create_task(&task).await {
            Ok(response) if response.success => {
                self.tasks.push(task);
                sort_by_status(&mut self.tasks);
                Outcome::ok("Task added successfully")
            }
            Ok(response) => Outcome::failed(response.message),
            Err(error) => {
                warn!(%error, "task create failed");
                Outcome::failed("Error adding task")
            }
        }
    }

    /// Create a copy of `task` with a fresh id and a marked name.
    pub async fn duplicate(&mut self, task: &Task) -> Outcome {
        let copy = task.duplicate();
        self.add(copy).await
    }

    /// Replace `task` on the server, then in the cache.
    pub async fn update(&mut self, task: Task) -> Outcome {
        self.is_loading = true;
        let outcome = self.update_inner(task).await;
        self.is_loading = false;
        outcome
    }

    async fn update_inner(&mut self, task: Task) -> Outcome {
        match self.api.update_task(&task).await {
            Ok(response) if response.success => {
                for cached in &mut self.tasks {
                    if cached.id == task.id {
                        *cached = task;
                        break;
                    }
                }
                sort_by_status(&mut self.tasks);
                Outcome::ok("Task updated successfully")
            }
            Ok(response) => Outcome::failed(response.message),
            Err(error) => {
                warn!(%error, "task update failed");
                Outcome::failed("Error updating task")
            }
        }
    }

    /// Delete `task` on the server, then drop it from the cache.
    pub async fn delete(&mut self, task: &Task) -> Outcome {
        self.is_loading = true;
        let outcome = self.delete_inner(task).await;
        self.is_loading = false;
        outcome
    }

    async fn delete_inner(&mut self, task: &Task) -> Outcome {
        match self.api.delete_task(&self.user_id, task).await {
            Ok(response) if response.success => {
                self.tasks.retain(|cached| cached.id != task.id);
                Outcome::ok(response.message)
            }
            Ok(response) => Outcome::failed(response.message),
            Err(error) => {
                warn!(%error, "task delete failed");
                Outcome::failed("Error deleting task")
            }
        }
    }

    /// Delete every task on the server, then clear the cache.
    pub async fn delete_all(&mut self) -> Outcome {
        self.is_loading = true;
        let outcome = self.delete_all_inner().await;
        self.is_loading = false;
        outcome
    }

    async fn delete_all_inner(&mut self) -> Outcome {
        match self.api.delete_all_tasks(&self.user_id).await {
            Ok(response) if response.success => {
                self.tasks.clear();
                Outcome::ok(response.message)
            }
            Ok(response) => Outcome::failed(response.message),
            Err(error) => {
                warn!(%error, "task clear failed");
                Outcome::failed("Error deleting tasks")
            }
        }
    }

    fn name_taken(&self, name: &str) -> bool {
        let wanted = name.trim().to_lowercase();
        self.tasks
            .iter()
            .any(|task| task.name.trim().to_lowercase() == wanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, MockServerApi, MutationResponse, TaskListResponse};
    use crate::model::{Priority, Status};

    fn task(id: &str, name: &str, status: Status) -> Task {
        Task {
            id: id.to_owned(),
            name: name.to_owned(),
            priority: Priority::Medium,
            status,
            user_id: "user-1".to_owned(),
        }
    }

    fn store(api: MockServerApi) -> TaskStore {
        TaskStore::new(Arc::new(api), "user-1")
    }

    fn transport_error() -> ApiError {
        ApiError::Rejected {
            status: 500,
            message: "boom".to_owned(),
        }
    }

    #[tokio::test]
    async fn fetch_all_sorts_and_caches_the_server_list() {
        let mut api = MockServerApi::new();
        api.expect_fetch_tasks().returning(|_| {
            Ok(TaskListResponse {
                tasks: Some(vec![
                    task("a", "done", Status::Completed),
                    task("b", "open", Status::InProgress),
                ]),
                success: true,
                message: "ok".to_owned(),
            })
        });
        let mut store = store(api);

        let outcome = store.fetch_all().await;

        assert!(outcome.success);
        assert!(!store.is_loading());
        let ids: Vec<&str> = store.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn fetch_failure_releases_loading_and_keeps_the_cache() {
        let mut api = MockServerApi::new();
        api.expect_fetch_tasks()
            .returning(|_| Err(transport_error()));
        let mut store = store(api);

        let outcome = store.fetch_all().await;

        assert!(!outcome.success);
        assert!(!store.is_loading());
        assert!(store.tasks().is_empty());
    }

    #[tokio::test]
    async fn duplicate_names_are_rejected_without_a_request() {
        let mut api = MockServerApi::new();
        api.expect_create_task().times(0);
        let mut store = store(api);
        store.tasks.push(task("a", "Buy milk", Status::InProgress));

        let outcome = store.add(task("b", "  buy MILK ", Status::InProgress)).await;

        assert!(!outcome.success);
        assert_eq!(store.tasks().len(), 1);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn add_appends_only_after_the_server_confirms() {
        let mut api = MockServerApi::new();
        api.expect_create_task().returning(|_| {
            Ok(MutationResponse {
                success: true,
                message: "added".to_owned(),
            })
        });
        let mut store = store(api);

        let outcome = store.add(task("a", "Buy milk", Status::InProgress)).await;

        assert!(outcome.success);
        assert_eq!(store.tasks().len(), 1);
    }

    #[tokio::test]
    async fn rejected_add_leaves_the_cache_untouched() {
        let mut api = MockServerApi::new();
        api.expect_create_task().returning(|_| {
            Ok(MutationResponse {
                success: false,
                message: "Error adding task".to_owned(),
            })
        });
        let mut store = store(api);

        let outcome = store.add(task("a", "Buy milk", Status::InProgress)).await;

        assert!(!outcome.success);
        assert!(store.tasks().is_empty());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn completing_a_task_moves_it_after_open_ones() {
        let mut api = MockServerApi::new();
        api.expect_update_task().returning(|_| {
            Ok(MutationResponse {
                success: true,
                message: "updated".to_owned(),
            })
        });
        let mut store = store(api);
        store.tasks.push(task("a", "First", Status::InProgress));
        store.tasks.push(task("b", "Second", Status::InProgress));

        let outcome = store.update(task("a", "First", Status::Completed)).await;

        assert!(outcome.success);
        let ids: Vec<&str> = store.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn delete_drops_only_the_confirmed_task() {
        let mut api = MockServerApi::new();
        api.expect_delete_task().returning(|_, _| {
            Ok(MutationResponse {
                success: true,
                message: "deleted".to_owned(),
            })
        });
        let mut store = store(api);
        store.tasks.push(task("a", "First", Status::InProgress));
        store.tasks.push(task("b", "Second", Status::InProgress));

        let outcome = store.delete(&task("a", "First", Status::InProgress)).await;

        assert!(outcome.success);
        let ids: Vec<&str> = store.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[tokio::test]
    async fn delete_all_clears_the_cache_on_confirmation() {
        let mut api = MockServerApi::new();
        api.expect_delete_all_tasks().returning(|_| {
            Ok(MutationResponse {
                success: true,
                message: "cleared".to_owned(),
            })
        });
        let mut store = store(api);
        store.tasks.push(task("a", "First", Status::InProgress));

        let outcome = store.delete_all().await;

        assert!(outcome.success);
        assert!(store.tasks().is_empty());
    }

    #[tokio::test]
    async fn duplicate_adds_a_copy_with_a_marked_name() {
        let mut api = MockServerApi::new();
        api.expect_create_task().returning(|_| {
            Ok(MutationResponse {
                success: true,
                message: "added".to_owned(),
            })
        });
        let mut store = store(api);
        let original = task("a", "Buy milk", Status::Completed);
        store.tasks.push(original.clone());

        let outcome = store.duplicate(&original).await;

        assert!(outcome.success);
        assert_eq!(store.tasks().len(), 2);
        assert!(
            store
                .tasks()
                .iter()
                .any(|t| t.name == "Buy milk (copy)" && t.status == Status::Completed)
        );
    }
}
