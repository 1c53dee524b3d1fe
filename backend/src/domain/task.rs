//! Task data model.
//!
//! Tasks are owned by exactly one user. Identifiers are generated client-side
//! as random collision-resistant short strings before submission, so the
//! server validates the shape but never mints them itself outside of tests.

use std::fmt;

use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::UserId;

/// Length of generated task identifiers, matching the client's generator.
pub const TASK_ID_LEN: usize = 21;
/// Minimum task name length once trimmed, mirroring the authoring form.
pub const TASK_NAME_MIN: usize = 3;
/// Upper bound keeping names within the storage column.
pub const TASK_NAME_MAX: usize = 120;

/// Validation errors raised by the task value types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskValidationError {
    /// Identifier was empty, padded, or contained whitespace.
    #[error("task id must be a non-empty token without whitespace")]
    InvalidId,
    /// Name shorter than [`TASK_NAME_MIN`] characters once trimmed.
    #[error("task name must be at least {TASK_NAME_MIN} characters")]
    NameTooShort,
    /// Name longer than [`TASK_NAME_MAX`] characters.
    #[error("task name must be at most {TASK_NAME_MAX} characters")]
    NameTooLong,
    /// Unknown priority label.
    #[error("priority must be one of low, medium, high")]
    InvalidPriority,
    /// Unknown status label.
    #[error("status must be one of 'in progress', 'completed'")]
    InvalidStatus,
}

/// Opaque client-generated task identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId(String);

impl TaskId {
    /// Validate and construct a [`TaskId`] from string input.
    pub fn new(id: impl Into<String>) -> Result<Self, TaskValidationError> {
        let id = id.into();
        if id.is_empty() || id.len() > 64 || id.contains(char::is_whitespace) {
            return Err(TaskValidationError::InvalidId);
        }
        Ok(Self(id))
    }

    /// Generate a random identifier of [`TASK_ID_LEN`] alphanumeric characters.
    pub fn random() -> Self {
        let id: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TASK_ID_LEN)
            .map(char::from)
            .collect();
        Self(id)
    }

    /// Identifier as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TaskId> for String {
    fn from(value: TaskId) -> Self {
        value.0
    }
}

impl TryFrom<String> for TaskId {
    type Error = TaskValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Human readable task name, at least [`TASK_NAME_MIN`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskName(String);

impl TaskName {
    /// Validate and construct a [`TaskName`] from owned input.
    pub fn new(name: impl Into<String>) -> Result<Self, TaskValidationError> {
        let name = name.into();
        let trimmed_len = name.trim().chars().count();
        if trimmed_len < TASK_NAME_MIN {
            return Err(TaskValidationError::NameTooShort);
        }
        if name.chars().count() > TASK_NAME_MAX {
            return Err(TaskValidationError::NameTooLong);
        }
        Ok(Self(name))
    }

    /// Name as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TaskName> for String {
    fn from(value: TaskName) -> Self {
        value.0
    }
}

impl TryFrom<String> for TaskName {
    type Error = TaskValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Task urgency label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Normal urgency.
    Medium,
    /// Needs attention first.
    High,
}

impl Priority {
    /// Wire and storage label for this priority.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl TryFrom<&str> for Priority {
    type Error = TaskValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(TaskValidationError::InvalidPriority),
        }
    }
}

/// Task completion state. Ordering of the client list partitions on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Status {
    /// Not yet done; sorts before completed tasks.
    #[serde(rename = "in progress")]
    InProgress,
    /// Done.
    #[serde(rename = "completed")]
    Completed,
}

impl Status {
    /// Wire and storage label for this status.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in progress",
            Self::Completed => "completed",
        }
    }
}

impl TryFrom<&str> for Status {
    type Error = TaskValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "in progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(TaskValidationError::InvalidStatus),
        }
    }
}

/// A to-do item owned by a single user.
///
/// Serialised in the wire shape the client expects: camelCase keys, lowercase
/// priority labels, and the two-word `"in progress"` status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[schema(value_type = String, example = "V1StGXR8_Z5jdHi6B-myT")]
    id: TaskId,
    #[schema(value_type = String, example = "Buy milk")]
    name: TaskName,
    priority: Priority,
    status: Status,
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    user_id: UserId,
}

impl Task {
    /// Build a task from validated components.
    pub const fn new(
        id: TaskId,
        name: TaskName,
        priority: Priority,
        status: Status,
        user_id: UserId,
    ) -> Self {
        Self {
            id,
            name,
            priority,
            status,
            user_id,
        }
    }

    /// Client-generated identifier.
    pub const fn id(&self) -> &TaskId {
        &self.id
    }

    /// Display name.
    pub const fn name(&self) -> &TaskName {
        &self.name
    }

    /// Urgency label.
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Completion state.
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Owning user.
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ab", false)]
    #[case("  a  ", false)]
    #[case("Buy milk", true)]
    #[case("abc", true)]
    fn task_name_enforces_minimum_length(#[case] name: &str, #[case] ok: bool) {
        assert_eq!(TaskName::new(name).is_ok(), ok, "name {name:?}");
    }

    #[test]
    fn task_name_enforces_maximum_length() {
        let long = "x".repeat(TASK_NAME_MAX + 1);
        assert_eq!(
            TaskName::new(long).expect_err("too long"),
            TaskValidationError::NameTooLong
        );
    }

    #[test]
    fn random_task_ids_have_the_documented_length() {
        let id = TaskId::random();
        assert_eq!(id.as_str().len(), TASK_ID_LEN);
        assert!(id.as_str().chars().all(char::is_alphanumeric));
    }

    #[rstest]
    #[case("")]
    #[case("has space")]
    fn task_id_rejects_whitespace(#[case] raw: &str) {
        assert!(TaskId::new(raw).is_err());
    }

    #[test]
    fn status_uses_the_two_word_wire_label() {
        let json = serde_json::to_string(&Status::InProgress).expect("serialise");
        assert_eq!(json, "\"in progress\"");
        let parsed: Status = serde_json::from_str("\"completed\"").expect("parse");
        assert_eq!(parsed, Status::Completed);
    }

    #[test]
    fn task_serialises_with_camel_case_keys() {
        let task = Task::new(
            TaskId::random(),
            TaskName::new("Buy milk").expect("valid name"),
            Priority::Low,
            Status::InProgress,
            UserId::random(),
        );
        let value = serde_json::to_value(&task).expect("serialise");
        assert!(value.get("userId").is_some());
        assert_eq!(value["priority"], "low");
        assert_eq!(value["status"], "in progress");
    }
}
