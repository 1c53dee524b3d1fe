//! HTTP adapter for the backend REST API.
//!
//! [`ServerApi`] is the seam the stores talk through; [`HttpServerApi`] is
//! the reqwest implementation. The client keeps a cookie jar so the session
//! cookie set by signin rides along on every later call.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Task, User};

/// Failures raised by the HTTP adapter.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never completed or the body failed to decode.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    /// The endpoint URL could not be built from the base address.
    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),
    /// The server answered with an error status and message.
    #[error("server rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Envelope for `GET /api/tasks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskListResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Task>>,
    pub success: bool,
    pub message: String,
}

/// Envelope for task writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationResponse {
    pub success: bool,
    pub message: String,
}

/// Envelope for signup and signin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
}

/// Envelope for `GET /api/logout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Envelope for `GET /api/validate-user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateUserResponse {
    pub is_authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// Deletion mode for `DELETE /api/tasks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeleteOption {
    Delete,
    DeleteAll,
}

/// Body of `DELETE /api/tasks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub option: DeleteOption,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<Task>,
}

/// Credentials body for signup and signin.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Error envelope the backend sends on rejected requests.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// The backend operations the stores depend on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServerApi: Send + Sync {
    /// `GET /api/tasks?userId=..`.
    async fn fetch_tasks(&self, user_id: &str) -> Result<TaskListResponse, ApiError>;
    /// `POST /api/tasks`.
    async fn create_task(&self, task: &Task) -> Result<MutationResponse, ApiError>;
    /// `PUT /api/tasks`.
    async fn update_task(&self, task: &Task) -> Result<MutationResponse, ApiError>;
    /// `DELETE /api/tasks?userId=..` with `option: delete`.
    async fn delete_task(&self, user_id: &str, task: &Task) -> Result<MutationResponse, ApiError>;
    /// `DELETE /api/tasks?userId=..` with `option: deleteAll`.
    async fn delete_all_tasks(&self, user_id: &str) -> Result<MutationResponse, ApiError>;
    /// `POST /api/signup`.
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError>;
    /// `POST /api/signin`; on success the session cookie is captured.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError>;
    /// `GET /api/validate-user`.
    async fn validate_user(&self) -> Result<ValidateUserResponse, ApiError>;
    /// `GET /api/logout`.
    async fn logout(&self) -> Result<LogoutResponse, ApiError>;
}

/// Reqwest-backed [`ServerApi`] with a cookie jar for the session.
pub struct HttpServerApi {
    client: Client,
    base: Url,
}

impl HttpServerApi {
    /// Build an adapter targeting `base` (e.g. `http://localhost:8080/`).
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url) -> Result<Self, reqwest::Error> {
        let client = Client::builder().cookie_store(true).build()?;
        Ok(Self { client, base })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path)?)
    }
}

/// Decode a success body, or surface the server's error envelope.
async fn check<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    let message = response
        .json::<ErrorBody>()
        .await
        .map(|body| body.message)
        .unwrap_or_else(|_| "unknown server error".to_owned());
    debug!(status = status.as_u16(), message, "request rejected");
    Err(ApiError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl ServerApi for HttpServerApi {
    async fn fetch_tasks(&self, user_id: &str) -> Result<TaskListResponse, ApiError> {
        let response = self
            .client
            .get(self.endpoint("api/tasks")?)
            .query(&[("userId", user_id)])
            .send()
            .await?;
        check(response).await
    }

    async fn create_task(&self, task: &Task) -> Result<MutationResponse, ApiError> {
        let response = self
            .client
            .post(self.endpoint("api/tasks")?)
            .json(task)
            .send()
            .await?;
        check(response).await
    }

    async fn update_task(&self, task: &Task) -> Result<MutationResponse, ApiError> {
        let response = self
            .client
            .put(self.endpoint("api/tasks")?)
            .json(task)
            .send()
            .await?;
        check(response).await
    }

    async fn delete_task(&self, user_id: &str, task: &Task) -> Result<MutationResponse, ApiError> {
        let response = self
            .client
            .delete(self.endpoint("api/tasks")?)
            .query(&[("userId", user_id)])
            .json(&DeleteRequest {
                option: DeleteOption::Delete,
                task: Some(task.clone()),
            })
            .send()
            .await?;
        check(response).await
    }

    async fn delete_all_tasks(&self, user_id: &str) -> Result<MutationResponse, ApiError> {
        let response = self
            .client
            .delete(self.endpoint("api/tasks")?)
            .query(&[("userId", user_id)])
            .json(&DeleteRequest {
                option: DeleteOption::DeleteAll,
                task: None,
            })
            .send()
            .await?;
        check(response).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let response = self
            .client
            .post(self.endpoint("api/signup")?)
            .json(&CredentialsRequest { email, password })
            .send()
            .await?;
        check(response).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let response = self
            .client
            .post(self.endpoint("api/signin")?)
            .json(&CredentialsRequest { email, password })
            .send()
            .await?;
        check(response).await
    }

    async fn validate_user(&self) -> Result<ValidateUserResponse, ApiError> {
        // The 401 body carries the same envelope, so decode regardless of
        // status.
        let response = self
            .client
            .get(self.endpoint("api/validate-user")?)
            .send()
            .await?;
        Ok(response.json().await?)
    }

    async fn logout(&self) -> Result<LogoutResponse, ApiError> {
        let response = self.client.get(self.endpoint("api/logout")?).send().await?;
        Ok(response.json().await?)
    }
}
