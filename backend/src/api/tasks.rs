//! Task CRUD endpoints.
//!
//! All four handlers resolve the caller through the session authority
//! before touching the repository. The `userId` scope (query parameter on
//! reads and deletes, body field on writes) is cross-checked against the
//! session's user: a mismatch is a `403`, not a silent scope-down.
//! Data-level failures (missing rows, storage errors) come back as
//! `success: false` envelopes with HTTP 200 so clients can surface them
//! without special-casing status codes; only authentication and
//! authorisation failures use error statuses.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::api::error::{ApiError, ApiResult};
use crate::api::session::SessionContext;
use crate::api::state::HttpState;
use crate::domain::{AuthenticatedSession, Error, Task, UserId};

/// Envelope for task list reads.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskListResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Task>>,
    pub success: bool,
    pub message: String,
}

/// Envelope for task writes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MutationResponse {
    pub success: bool,
    pub message: String,
}

impl MutationResponse {
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

/// `userId` query parameter scoping reads and deletes.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserScope {
    user_id: Option<UserId>,
}

/// Deletion mode selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum DeleteOption {
    /// Delete the single task carried in the request body.
    Delete,
    /// Delete every task owned by the requesting user.
    DeleteAll,
}

/// Body of `DELETE /api/tasks`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteRequest {
    pub option: DeleteOption,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<Task>,
}

/// Resolve the caller's session or fail with `401`.
async fn require_session(
    state: &HttpState,
    session: &SessionContext,
) -> ApiResult<AuthenticatedSession> {
    let token = session.token()?;
    state
        .authority
        .validate(token.as_ref())
        .await?
        .ok_or_else(|| ApiError::from(Error::unauthorized("login required")))
}

/// Reject payloads claiming a different user than the session holds.
fn check_user_matches(claimed: &UserId, authenticated: &AuthenticatedSession) -> ApiResult<()> {
    if claimed != authenticated.user().id() {
        debug!(
            session_user = %authenticated.user().id(),
            claimed_user = %claimed,
            "request scope does not match session"
        );
        return Err(ApiError::from(Error::forbidden(
            "cannot act on another user's tasks",
        )));
    }
    Ok(())
}

/// List the authenticated user's tasks.
#[utoipa::path(
    get,
    path = "/api/tasks",
    tags = ["tasks"],
    params(("userId" = String, Query, description = "Owner of the tasks to list")),
    responses(
        (status = 200, description = "Task list envelope", body = TaskListResponse),
        (status = 401, description = "No valid session", body = ApiError),
        (status = 403, description = "Scope does not match session", body = ApiError)
    )
)]
#[get("/tasks")]
pub async fn list_tasks(
    state: web::Data<HttpState>,
    session: SessionContext,
    scope: web::Query<UserScope>,
) -> ApiResult<HttpResponse> {
    let authenticated = require_session(&state, &session).await?;
    let Some(user_id) = scope.into_inner().user_id else {
        return Ok(HttpResponse::Ok().json(TaskListResponse {
            tasks: None,
            success: false,
            message: "User id required".to_string(),
        }));
    };
    check_user_matches(&user_id, &authenticated)?;

    match state.tasks.list_for_user(&user_id).await {
        Ok(tasks) => Ok(HttpResponse::Ok().json(TaskListResponse {
            tasks: Some(tasks),
            success: true,
            message: "Tasks fetched successfully".to_string(),
        })),
        Err(repo_error) => {
            error!(%repo_error, "task list failed");
            Ok(HttpResponse::Ok().json(TaskListResponse {
                tasks: None,
                success: false,
                message: "Error fetching tasks".to_string(),
            }))
        }
    }
}

/// Create a task for the authenticated user.
#[utoipa::path(
    post,
    path = "/api/tasks",
    tags = ["tasks"],
    request_body = Task,
    responses(
        (status = 200, description = "Write outcome", body = MutationResponse),
        (status = 400, description = "Malformed task payload", body = ApiError),
        (status = 401, description = "No valid session", body = ApiError),
        (status = 403, description = "Payload user does not match session", body = ApiError)
    )
)]
#[post("/tasks")]
pub async fn create_task(
    state: web::Data<HttpState>,
    session: SessionContext,
    task: web::Json<Task>,
) -> ApiResult<HttpResponse> {
    let authenticated = require_session(&state, &session).await?;
    let task = task.into_inner();
    check_user_matches(task.user_id(), &authenticated)?;

    match state.tasks.insert(&task).await {
        Ok(()) => Ok(HttpResponse::Ok().json(MutationResponse::ok("Task added successfully"))),
        Err(repo_error) => {
            error!(%repo_error, task_id = %task.id(), "task insert failed");
            Ok(HttpResponse::Ok().json(MutationResponse::failed("Error adding task")))
        }
    }
}

/// Replace a task owned by the authenticated user.
#[utoipa::path(
    put,
    path = "/api/tasks",
    tags = ["tasks"],
    request_body = Task,
    responses(
        (status = 200, description = "Write outcome", body = MutationResponse),
        (status = 400, description = "Malformed task payload", body = ApiError),
        (status = 401, description = "No valid session", body = ApiError),
        (status = 403, description = "Payload user does not match session", body = ApiError)
    )
)]
#[put("/tasks")]
pub async fn update_task(
    state: web::Data<HttpState>,
    session: SessionContext,
    task: web::Json<Task>,
) -> ApiResult<HttpResponse> {
    let authenticated = require_session(&state, &session).await?;
    let task = task.into_inner();
    check_user_matches(task.user_id(), &authenticated)?;

    match state.tasks.update(&task).await {
        Ok(true) => Ok(HttpResponse::Ok().json(MutationResponse::ok("Task updated successfully"))),
        Ok(false) => Ok(HttpResponse::Ok().json(MutationResponse::failed("Task not found"))),
        Err(repo_error) => {
            error!(%repo_error, task_id = %task.id(), "task update failed");
            Ok(HttpResponse::Ok().json(MutationResponse::failed("Error updating task")))
        }
    }
}

/// Delete one task or all of the authenticated user's tasks.
#[utoipa::path(
    delete,
    path = "/api/tasks",
    tags = ["tasks"],
    params(("userId" = String, Query, description = "Owner of the tasks to delete")),
    request_body = DeleteRequest,
    responses(
        (status = 200, description = "Write outcome", body = MutationResponse),
        (status = 401, description = "No valid session", body = ApiError),
        (status = 403, description = "Scope does not match session", body = ApiError)
    )
)]
#[delete("/tasks")]
pub async fn delete_tasks(
    state: web::Data<HttpState>,
    session: SessionContext,
    scope: web::Query<UserScope>,
    request: web::Json<DeleteRequest>,
) -> ApiResult<HttpResponse> {
    let authenticated = require_session(&state, &session).await?;
    let Some(user_id) = scope.into_inner().user_id else {
        return Ok(HttpResponse::Ok().json(MutationResponse::failed("User id required")));
    };
    check_user_matches(&user_id, &authenticated)?;
    let request = request.into_inner();

    let outcome = match request.option {
        DeleteOption::Delete => {
            let Some(task) = request.task else {
                return Ok(HttpResponse::Ok().json(MutationResponse::failed("No task provided")));
            };
            match state.tasks.delete(task.id(), &user_id).await {
                Ok(true) => MutationResponse::ok("Task deleted successfully"),
                Ok(false) => MutationResponse::failed("Task not found"),
                Err(repo_error) => {
                    error!(%repo_error, task_id = %task.id(), "task delete failed");
                    MutationResponse::failed("Error deleting task")
                }
            }
        }
        DeleteOption::DeleteAll => match state.tasks.delete_all_for_user(&user_id).await {
            Ok(removed) => {
                debug!(removed, user_id = %user_id, "cleared tasks");
                MutationResponse::ok("All tasks deleted successfully")
            }
            Err(repo_error) => {
                error!(%repo_error, "task clear failed");
                MutationResponse::failed("Error deleting tasks")
            }
        },
    };
    Ok(HttpResponse::Ok().json(outcome))
}
