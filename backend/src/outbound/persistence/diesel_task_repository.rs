//! PostgreSQL-backed `TaskRepository` implementation using Diesel ORM.
//!
//! Every mutation is scoped to the owning user in SQL, so a forged task id
//! cannot touch another user's rows regardless of what the handler checked.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{TaskRepository, TaskRepositoryError};
use crate::domain::{Task, TaskId, UserId};

use super::models::{NewTaskRow, TaskChangeset, TaskRow};
use super::pool::{DbPool, PoolError};
use super::schema::tasks;

/// Diesel-backed implementation of the `TaskRepository` port.
#[derive(Clone)]
pub struct DieselTaskRepository {
    pool: DbPool,
}

impl DieselTaskRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TaskRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            TaskRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> TaskRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if let DieselError::DatabaseError(kind, info) = &error {
        debug!(?kind, message = info.message(), "diesel operation failed");
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            TaskRepositoryError::connection("database connection error")
        }
        _ => TaskRepositoryError::query("database error"),
    }
}

#[async_trait]
impl TaskRepository for DieselTaskRepository {
    async fn list_for_user(&self, user: &UserId) -> Result<Vec<Task>, TaskRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<TaskRow> = tasks::table
            .filter(tasks::user_id.eq(user.as_uuid()))
            .order(tasks::id.asc())
            .select(TaskRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|row| Task::try_from(row).map_err(TaskRepositoryError::query))
            .collect()
    }

    async fn insert(&self, task: &Task) -> Result<(), TaskRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(tasks::table)
            .values(NewTaskRow::from_task(task))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update(&self, task: &Task) -> Result<bool, TaskRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(
            tasks::table
                .filter(tasks::id.eq(task.id().as_str()))
                .filter(tasks::user_id.eq(task.user_id().as_uuid())),
        )
        .set(TaskChangeset::from_task(task))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(updated > 0)
    }

    async fn delete(&self, id: &TaskId, user: &UserId) -> Result<bool, TaskRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(
            tasks::table
                .filter(tasks::id.eq(id.as_str()))
                .filter(tasks::user_id.eq(user.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(removed > 0)
    }

    async fn delete_all_for_user(&self, user: &UserId) -> Result<u64, TaskRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(tasks::table.filter(tasks::user_id.eq(user.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(removed as u64)
    }
}
