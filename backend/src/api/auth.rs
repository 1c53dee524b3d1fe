//! Account and session endpoints: signup, signin, logout, validate-user.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use crate::api::error::{ApiError, ApiResult};
use crate::api::session::SessionContext;
use crate::api::state::HttpState;
use crate::domain::{Credentials, Error};

/// Credentials submitted to signup and signin.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "correct horse")]
    pub password: String,
}

impl CredentialsRequest {
    fn into_credentials(self) -> Result<Credentials, Error> {
        Credentials::try_from_parts(&self.email, &self.password).map_err(|validation| {
            Error::invalid_request(validation.to_string())
                .with_details(json!({ "field": validation.field() }))
        })
    }
}

/// Outcome envelope for signup and signin.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
}

/// Outcome envelope for logout.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogoutResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Public projection of an authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicUser {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
}

/// Session check envelope for `GET /api/validate-user`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidateUserResponse {
    pub is_authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicUser>,
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/signup",
    tags = ["auth"],
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid or duplicate credentials", body = ApiError)
    )
)]
#[post("/signup")]
pub async fn sign_up(
    state: web::Data<HttpState>,
    request: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = request.into_inner().into_credentials()?;
    let user = state.auth.sign_up(&credentials).await?;
    info!(user_id = %user.id(), "account created");
    Ok(HttpResponse::Ok().json(AuthResponse {
        success: true,
        message: "Account created successfully".to_string(),
    }))
}

/// Verify credentials and open a session.
#[utoipa::path(
    post,
    path = "/api/signin",
    tags = ["auth"],
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Session opened", body = AuthResponse),
        (status = 400, description = "Malformed credentials", body = ApiError),
        (status = 401, description = "Unknown email or wrong password", body = ApiError)
    )
)]
#[post("/signin")]
pub async fn sign_in(
    state: web::Data<HttpState>,
    session: SessionContext,
    request: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = request.into_inner().into_credentials()?;
    let user = state.auth.verify(&credentials).await?;
    let opened = state.authority.open_session(*user.id()).await?;
    session.persist_token(opened.id())?;
    info!(user_id = %user.id(), "session opened");
    Ok(HttpResponse::Ok().json(AuthResponse {
        success: true,
        message: "Login successful".to_string(),
    }))
}

/// Invalidate the caller's session.
///
/// Unlike the task endpoints this reports the unauthenticated case in the
/// envelope as well as the status line, so clients reading only the body
/// still see the failure.
#[utoipa::path(
    get,
    path = "/api/logout",
    tags = ["auth"],
    responses(
        (status = 200, description = "Session closed", body = LogoutResponse),
        (status = 401, description = "No valid session to close", body = LogoutResponse)
    )
)]
#[get("/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let token = session.token()?;
    match state.authority.invalidate(token.as_ref()).await {
        Ok(()) => {
            session.purge();
            Ok(HttpResponse::Ok().json(LogoutResponse {
                success: true,
                error: None,
            }))
        }
        Err(error) if error.code() == crate::domain::ErrorCode::Unauthorized => {
            session.purge();
            Ok(HttpResponse::Unauthorized().json(LogoutResponse {
                success: false,
                error: Some("Not authorised".to_string()),
            }))
        }
        Err(error) => Err(ApiError::from(error)),
    }
}

/// Report whether the caller holds a valid session.
#[utoipa::path(
    get,
    path = "/api/validate-user",
    tags = ["auth"],
    responses(
        (status = 200, description = "Session is valid", body = ValidateUserResponse),
        (status = 401, description = "No valid session", body = ValidateUserResponse)
    )
)]
#[get("/validate-user")]
pub async fn validate_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let token = session.token()?;
    match state.authority.validate(token.as_ref()).await? {
        Some(authenticated) => Ok(HttpResponse::Ok().json(ValidateUserResponse {
            is_authenticated: true,
            user: Some(PublicUser {
                id: authenticated.user().id().to_string(),
                email: authenticated.user().email().to_string(),
            }),
        })),
        None => Ok(HttpResponse::Unauthorized().json(ValidateUserResponse {
            is_authenticated: false,
            user: None,
        })),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};
    use mockable::DefaultClock;

    use super::*;
    use crate::api::test_utils::test_session_middleware;
    use crate::domain::ports::{
        MemorySessionRepository, MemoryTaskRepository, MemoryUserRepository,
    };
    use crate::domain::{AuthService, SessionAuthority};

    fn state() -> web::Data<HttpState> {
        let users = Arc::new(MemoryUserRepository::default());
        let authority = Arc::new(SessionAuthority::new(
            Arc::new(MemorySessionRepository::default()),
            users.clone(),
            Arc::new(DefaultClock),
        ));
        let auth = Arc::new(AuthService::new(users));
        web::Data::new(HttpState::new(
            authority,
            auth,
            Arc::new(MemoryTaskRepository::default()),
        ))
    }

    async fn app(
        state: web::Data<HttpState>,
    ) -> impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    > {
        test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .app_data(state)
                .service(
                    web::scope("/api")
                        .service(sign_up)
                        .service(sign_in)
                        .service(logout)
                        .service(validate_user),
                ),
        )
        .await
    }

    fn creds(email: &str, password: &str) -> CredentialsRequest {
        CredentialsRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[actix_web::test]
    async fn signup_signin_validate_logout_flow() {
        let app = app(state()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/signup")
                .set_json(creds("ada@example.com", "correct horse"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/signin")
                .set_json(creds("ada@example.com", "correct horse"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie")
            .into_owned();

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/validate-user")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: ValidateUserResponse = test::read_body_json(res).await;
        assert!(body.is_authenticated);
        assert_eq!(body.user.expect("user present").email, "ada@example.com");

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/logout")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);

        // The session row is gone even if a client replays the old cookie.
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/validate-user")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn signin_rejects_wrong_password() {
        let state = state();
        let app = app(state).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/signup")
                .set_json(creds("ada@example.com", "correct horse"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/signin")
                .set_json(creds("ada@example.com", "wrong horse"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn duplicate_signup_is_rejected() {
        let app = app(state()).await;

        for expected in [StatusCode::OK, StatusCode::BAD_REQUEST] {
            let res = test::call_service(
                &app,
                test::TestRequest::post()
                    .uri("/api/signup")
                    .set_json(creds("ada@example.com", "correct horse"))
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), expected);
        }
    }

    #[actix_web::test]
    async fn short_password_is_a_bad_request() {
        let app = app(state()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/signup")
                .set_json(creds("ada@example.com", "tiny"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn logout_without_a_session_is_unauthorised() {
        let app = app(state()).await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/api/logout").to_request())
                .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: LogoutResponse = test::read_body_json(res).await;
        assert!(!body.success);
        assert!(body.error.is_some());
    }
}
