//! OpenAPI documentation configuration.
//!
//! Defines [`ApiDoc`], the generated OpenAPI specification for the REST
//! API: all task and auth endpoints, the health probes, their envelope
//! schemas, and the session cookie security scheme. Swagger UI serves the
//! document in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::ApiError;
use crate::api::auth::{
    AuthResponse, CredentialsRequest, LogoutResponse, PublicUser, ValidateUserResponse,
};
use crate::api::tasks::{DeleteOption, DeleteRequest, MutationResponse, TaskListResponse};
use crate::domain::{ErrorCode, Priority, Status, Task};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/signin.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Taskside backend API",
        description = "HTTP interface for session-authenticated task management."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::api::tasks::list_tasks,
        crate::api::tasks::create_task,
        crate::api::tasks::update_task,
        crate::api::tasks::delete_tasks,
        crate::api::auth::sign_up,
        crate::api::auth::sign_in,
        crate::api::auth::logout,
        crate::api::auth::validate_user,
        crate::api::health::ready,
        crate::api::health::live,
    ),
    components(schemas(
        Task,
        Priority,
        Status,
        TaskListResponse,
        MutationResponse,
        DeleteRequest,
        DeleteOption,
        CredentialsRequest,
        AuthResponse,
        LogoutResponse,
        PublicUser,
        ValidateUserResponse,
        ApiError,
        ErrorCode,
    )),
    tags(
        (name = "tasks", description = "Task management"),
        (name = "auth", description = "Accounts and sessions"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_includes_every_endpoint() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/tasks",
            "/api/signup",
            "/api/signin",
            "/api/logout",
            "/api/validate-user",
            "/health/ready",
            "/health/live",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing path {path}");
        }
    }

    #[test]
    fn document_registers_the_envelope_schemas() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components present");
        for schema in ["Task", "TaskListResponse", "MutationResponse", "ApiError"] {
            assert!(
                components.schemas.contains_key(schema),
                "missing schema {schema}"
            );
        }
    }
}
