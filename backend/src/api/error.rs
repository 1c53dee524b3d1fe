//! HTTP error payloads and mapping from domain errors.
//!
//! Keeps the domain free of transport concerns by translating
//! [`domain::Error`](crate::domain::Error) into Actix responses here.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;
use utoipa::ToSchema;

use crate::domain::{Error as DomainError, ErrorCode};
use crate::middleware::trace::{TRACE_ID_HEADER, TraceId};

/// Standard error envelope returned by HTTP handlers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    #[schema(example = "invalid_request")]
    code: ErrorCode,
    #[schema(example = "Something went wrong")]
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl ApiError {
    /// Construct an API error from a domain failure, capturing any ambient
    /// trace identifier.
    pub fn from_domain(error: DomainError) -> Self {
        Self {
            code: error.code(),
            message: error.message().to_owned(),
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: error.details().cloned(),
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Trace identifier propagated into the response header.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    fn to_status_code(&self) -> StatusCode {
        match self.code {
            ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::WriteFailed | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(value: DomainError) -> Self {
        ApiError::from_domain(value)
    }
}

impl From<actix_web::Error> for ApiError {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to API error");
        ApiError {
            code: ErrorCode::InternalError,
            message: "Internal server error".to_string(),
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.to_status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = &self.trace_id {
            builder.insert_header((TRACE_ID_HEADER, id.clone()));
        }
        // Internal failures must never leak backend detail to clients.
        if matches!(self.code, ErrorCode::WriteFailed | ErrorCode::InternalError) {
            let mut redacted = self.clone();
            redacted.message = "Internal server error".to_string();
            redacted.details = None;
            return builder.json(redacted);
        }
        builder.json(self)
    }
}

/// Convenience alias for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(DomainError::invalid_request("bad"), StatusCode::BAD_REQUEST)]
    #[case(DomainError::unauthorized("who"), StatusCode::UNAUTHORIZED)]
    #[case(DomainError::forbidden("no"), StatusCode::FORBIDDEN)]
    #[case(DomainError::not_found("gone"), StatusCode::NOT_FOUND)]
    #[case(DomainError::write_failed("disk"), StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(DomainError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn status_codes_follow_the_error_code(
        #[case] error: DomainError,
        #[case] expected: StatusCode,
    ) {
        assert_eq!(ApiError::from_domain(error).status_code(), expected);
    }

    #[test]
    fn internal_errors_are_redacted() {
        let api = ApiError::from_domain(
            DomainError::internal("connection string leaked").with_details(json!({"dsn": "x"})),
        );
        let response = api.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = actix_web::body::to_bytes(response.into_body());
        let body = futures_util::future::FutureExt::now_or_never(body)
            .expect("body is ready")
            .expect("body bytes");
        let value: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(value["message"], "Internal server error");
        assert!(value.get("details").is_none());
    }

    #[test]
    fn client_errors_keep_their_details() {
        let api = ApiError::from_domain(
            DomainError::invalid_request("email is already registered")
                .with_details(json!({"field": "email"})),
        );
        let response = api.error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = actix_web::body::to_bytes(response.into_body());
        let body = futures_util::future::FutureExt::now_or_never(body)
            .expect("body is ready")
            .expect("body bytes");
        let value: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(value["details"]["field"], "email");
    }
}
