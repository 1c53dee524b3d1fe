//! Internal Diesel row structs for database operations.
//!
//! Implementation details of the persistence layer; never exposed to the
//! domain. Conversions into domain types re-validate stored values so a
//! corrupted row surfaces as a query error instead of a panic.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Email, PasswordHash, Priority, Session, SessionId, Status, Task, TaskId, TaskName, User,
    UserId,
};

use super::schema::{sessions, tasks, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::new(row.email).map_err(|err| format!("stored email: {err}"))?;
        let hash = PasswordHash::new(row.password_hash)
            .map_err(|err| format!("stored password hash: {err}"))?;
        Ok(User::new(UserId::from_uuid(row.id), email, hash))
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,
}

impl<'a> NewUserRow<'a> {
    pub(crate) fn from_user(user: &'a User) -> Self {
        Self {
            id: *user.id().as_uuid(),
            email: user.email().as_ref(),
            password_hash: user.password_hash().as_str(),
        }
    }
}

/// Row struct for reading from the tasks table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TaskRow {
    pub id: String,
    pub name: String,
    pub priority: String,
    pub status: String,
    pub user_id: Uuid,
}

impl TryFrom<TaskRow> for Task {
    type Error = String;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let id = TaskId::new(row.id).map_err(|err| format!("stored task id: {err}"))?;
        let name = TaskName::new(row.name).map_err(|err| format!("stored task name: {err}"))?;
        let priority = Priority::try_from(row.priority.as_str())
            .map_err(|err| format!("stored priority: {err}"))?;
        let status = Status::try_from(row.status.as_str())
            .map_err(|err| format!("stored status: {err}"))?;
        Ok(Task::new(
            id,
            name,
            priority,
            status,
            UserId::from_uuid(row.user_id),
        ))
    }
}

/// Insertable struct for creating new task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub(crate) struct NewTaskRow<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub priority: &'a str,
    pub status: &'a str,
    pub user_id: Uuid,
}

impl<'a> NewTaskRow<'a> {
    pub(crate) fn from_task(task: &'a Task) -> Self {
        Self {
            id: task.id().as_str(),
            name: task.name().as_str(),
            priority: task.priority().as_str(),
            status: task.status().as_str(),
            user_id: *task.user_id().as_uuid(),
        }
    }
}

/// Changeset struct for updating existing task records.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
pub(crate) struct TaskChangeset<'a> {
    pub name: &'a str,
    pub priority: &'a str,
    pub status: &'a str,
}

impl<'a> TaskChangeset<'a> {
    pub(crate) fn from_task(task: &'a Task) -> Self {
        Self {
            name: task.name().as_str(),
            priority: task.priority().as_str(),
            status: task.status().as_str(),
        }
    }
}

/// Row struct for reading from the sessions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SessionRow {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for Session {
    type Error = String;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let id = SessionId::new(row.id).map_err(|err| format!("stored session token: {err}"))?;
        Ok(Session::new(
            id,
            UserId::from_uuid(row.user_id),
            row.expires_at,
        ))
    }
}

/// Insertable struct for creating new session records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = sessions)]
pub(crate) struct NewSessionRow<'a> {
    pub id: &'a str,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl<'a> NewSessionRow<'a> {
    pub(crate) fn from_session(session: &'a Session) -> Self {
        Self {
            id: session.id().as_str(),
            user_id: *session.user_id().as_uuid(),
            expires_at: session.expires_at(),
        }
    }
}
