//! Port abstraction for task persistence adapters.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::task::{Task, TaskId};
use crate::domain::user::UserId;

/// Persistence errors raised by task repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskRepositoryError {
    /// Repository connection could not be established.
    #[error("task repository connection failed: {message}")]
    Connection {
        /// Adapter-level description of the failure.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("task repository query failed: {message}")]
    Query {
        /// Adapter-level description of the failure.
        message: String,
    },
}

impl TaskRepositoryError {
    /// Connection-class failure.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Query-class failure.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for task storage scoped by owning user.
///
/// Mutations report whether a row actually matched so callers can surface
/// "not found" to the client without a second round trip.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Fetch every task owned by `user`, in storage order.
    async fn list_for_user(&self, user: &UserId) -> Result<Vec<Task>, TaskRepositoryError>;

    /// Insert a new task record.
    async fn insert(&self, task: &Task) -> Result<(), TaskRepositoryError>;

    /// Replace name, priority, and status of the task with `task.id()`,
    /// scoped to its owner. Returns `false` when no row matched.
    async fn update(&self, task: &Task) -> Result<bool, TaskRepositoryError>;

    /// Delete the task with `id` owned by `user`. Returns `false` when no
    /// row matched.
    async fn delete(&self, id: &TaskId, user: &UserId) -> Result<bool, TaskRepositoryError>;

    /// Delete every task owned by `user`, returning the number removed.
    async fn delete_all_for_user(&self, user: &UserId) -> Result<u64, TaskRepositoryError>;
}

/// In-memory adapter backing the no-database server mode and handler tests.
#[derive(Debug, Default)]
pub struct MemoryTaskRepository {
    tasks: RwLock<Vec<Task>>,
}

#[async_trait]
impl TaskRepository for MemoryTaskRepository {
    async fn list_for_user(&self, user: &UserId) -> Result<Vec<Task>, TaskRepositoryError> {
        let tasks = self.tasks.read().await;
        Ok(tasks
            .iter()
            .filter(|task| task.user_id() == user)
            .cloned()
            .collect())
    }

    async fn insert(&self, task: &Task) -> Result<(), TaskRepositoryError> {
        let mut tasks = self.tasks.write().await;
        if tasks.iter().any(|existing| existing.id() == task.id()) {
            return Err(TaskRepositoryError::query("duplicate task id"));
        }
        tasks.push(task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> Result<bool, TaskRepositoryError> {
        let mut tasks = self.tasks.write().await;
        match tasks
            .iter_mut()
            .find(|existing| existing.id() == task.id() && existing.user_id() == task.user_id())
        {
            Some(existing) => {
                *existing = task.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &TaskId, user: &UserId) -> Result<bool, TaskRepositoryError> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|task| !(task.id() == id && task.user_id() == user));
        Ok(tasks.len() < before)
    }

    async fn delete_all_for_user(&self, user: &UserId) -> Result<u64, TaskRepositoryError> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|task| task.user_id() != user);
        Ok((before - tasks.len()) as u64)
    }
}
